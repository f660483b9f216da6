use colored::*;
use std::fmt::Write;

use crate::editor::Draft;
use crate::models::{Stats, Store, TestCase};

const DESCRIPTION_WIDTH: usize = 60;
const ACTION_WIDTH: usize = 80;
const RESULT_WIDTH: usize = 60;
const FOLDER_WIDTH: usize = 30;
const MISSING_VERSION: &str = "N/A";

/// Recorta `text` a `max` caracteres añadiendo "..." si sobra
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

pub fn stats_line(stats: &Stats) -> String {
    format!(
        "Casos: {}  |  Pasos: {}  |  Media de pasos: {}",
        stats.total_tests.to_string().bold(),
        stats.total_steps.to_string().bold(),
        stats.avg_steps.to_string().bold()
    )
}

/// Una fila de la tabla; `index` empieza en cero
pub fn row(index: usize, case: &TestCase) -> String {
    let mut out = String::new();
    let version = case.fix_version().unwrap_or(MISSING_VERSION);

    // Escribir en un String no falla
    let _ = writeln!(out, "{} {}", format!("{}.", index + 1).bold(), case.fields.summary.bold());
    let _ = writeln!(
        out,
        "   {}",
        truncate(&case.fields.description, DESCRIPTION_WIDTH).dimmed()
    );
    let _ = writeln!(
        out,
        "   Proyecto: {}  Versión: {}  Carpeta: {}",
        case.fields.project.key,
        version,
        truncate(&case.xray_test_repository_folder, FOLDER_WIDTH)
    );

    for (step_index, step) in case.steps.iter().enumerate() {
        let _ = writeln!(
            out,
            "   {} {}",
            format!("{}.", step_index + 1).blue(),
            truncate(&step.action, ACTION_WIDTH)
        );
        let _ = writeln!(out, "      → {}", truncate(&step.result, RESULT_WIDTH));
    }

    out
}

/// Tabla de la vista filtrada o el aviso de lista vacía
pub fn table(store: &Store) -> String {
    if store.filtered_len() == 0 {
        return format!("{}\n", "No hay casos de prueba para mostrar.".yellow());
    }

    store
        .filtered()
        .enumerate()
        .map(|(index, entry)| row(index, &entry.case))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pantalla completa: estadísticas, filtro activo y tabla
pub fn screen(store: &Store) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", stats_line(&store.stats()));
    if !store.search_term().is_empty() {
        let _ = writeln!(
            out,
            "{}",
            format!(
                "Filtro: \"{}\" ({} de {})",
                store.search_term(),
                store.filtered_len(),
                store.len()
            )
            .blue()
        );
    }
    if store.is_dirty() {
        let _ = writeln!(out, "{}", "Hay cambios sin guardar.".yellow());
    }
    let _ = writeln!(out);
    out.push_str(&table(store));
    out
}

/// Caso completo, sin recortes
pub fn detail(case: &TestCase) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", case.fields.summary.bold());
    let _ = writeln!(out, "Descripción: {}", case.fields.description);
    let _ = writeln!(out, "Proyecto: {}", case.fields.project.key);
    let _ = writeln!(
        out,
        "Versión: {}",
        case.fix_version().unwrap_or(MISSING_VERSION)
    );
    let _ = writeln!(out, "Carpeta: {}", case.xray_test_repository_folder);
    if let Some(testtype) = case.test_type() {
        let _ = writeln!(out, "Tipo: {}", testtype);
    }
    let _ = writeln!(out, "Pasos:");
    for (index, step) in case.steps.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", index + 1, step.action);
        let _ = writeln!(out, "     → {}", step.result);
    }
    out
}

/// Estado del formulario de edición
pub fn draft(draft: &Draft) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Resumen: {}", draft.summary);
    let _ = writeln!(out, "Descripción: {}", draft.description);
    let _ = writeln!(out, "Versión: {}", draft.version);
    let _ = writeln!(out, "Carpeta: {}", draft.folder);
    for (label, step) in draft.step_labels().iter().zip(&draft.steps) {
        let _ = writeln!(out, "{}: {}", label.blue(), step.action);
        let _ = writeln!(out, "   → {}", step.result);
    }
    out
}
