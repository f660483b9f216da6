use colored::*;
use inquire::{Confirm, InquireError, Select, Text};
use tracing::info;

use crate::commands::{import_to_xray, load_initial};
use crate::config::Config;
use crate::editor::{EditTarget, Editor, EditorError, SaveKind};
use crate::error::AppError;
use crate::models::Store;
use crate::render;
use crate::utils::backend::{BackendError, HttpBackend, SyncGateway};

const SEARCH: &str = "Buscar";
const DETAIL: &str = "Ver detalle";
const EDIT: &str = "Modificar caso de prueba";
const ADD: &str = "Añadir caso de prueba";
const DELETE: &str = "Eliminar caso de prueba";
const SAVE_ALL: &str = "Guardar cambios";
const IMPORT: &str = "Importar a Xray";
const EXIT: &str = "Salir";

const FIELD_SUMMARY: &str = "Resumen";
const FIELD_DESCRIPTION: &str = "Descripción";
const FIELD_VERSION: &str = "Versión";
const FIELD_FOLDER: &str = "Carpeta";
const STEP_ADD: &str = "Añadir paso";
const STEP_EDIT: &str = "Modificar paso";
const STEP_REMOVE: &str = "Eliminar paso";
const FORM_SAVE: &str = "Guardar";
const FORM_CANCEL: &str = "Cancelar";

/// Sesión interactiva de edición.
///
/// Cada acción modifica el almacén y después se vuelve a dibujar la
/// pantalla completa.
pub fn run_session(config: &Config) -> Result<(), AppError> {
    let backend = HttpBackend::new(config)?;
    let mut store = Store::new();
    let mut editor = Editor::new();

    load_initial(&mut store, config, &backend)?;

    loop {
        println!("\n{}", render::screen(&store));

        let options = vec![SEARCH, DETAIL, EDIT, ADD, DELETE, SAVE_ALL, IMPORT, EXIT];
        let selection = Select::new("¿Qué deseas hacer?", options).prompt();

        match selection {
            Ok(SEARCH) => search(&mut store),
            Ok(DETAIL) => {
                if let Some(index) = select_case(&store, "Selecciona un caso de prueba:") {
                    let id = store.filtered_id(index)?;
                    if let Some(case) = store.get(id) {
                        println!("\n{}", render::detail(case));
                    }
                }
            }
            Ok(EDIT) => {
                if let Some(index) =
                    select_case(&store, "Selecciona un caso de prueba para modificar:")
                {
                    editor.open_for_edit(&store, index)?;
                    edit_form(&mut editor, &mut store, &backend)?;
                }
            }
            Ok(ADD) => {
                editor.open_for_new(&store)?;
                edit_form(&mut editor, &mut store, &backend)?;
            }
            Ok(DELETE) => delete(&editor, &mut store)?,
            Ok(SAVE_ALL) => save_all(&mut store, &backend)?,
            Ok(IMPORT) => import_to_xray(&backend)?,
            _ => {
                if confirm_exit(&store) {
                    println!("¡Hasta pronto!");
                    break;
                }
            }
        }
    }

    Ok(())
}

fn search(store: &mut Store) {
    let current = store.search_term().to_string();
    if let Ok(term) = Text::new("Texto a buscar (vacío para ver todos):")
        .with_initial_value(&current)
        .prompt()
    {
        store.filter(&term);
    }
}

/// Devuelve la posición en la vista filtrada del caso elegido
fn select_case(store: &Store, message: &str) -> Option<usize> {
    if store.filtered_len() == 0 {
        println!("{}", "No hay casos de prueba disponibles.".yellow());
        return None;
    }

    let options = store
        .filtered()
        .enumerate()
        .map(|(i, entry)| format!("{}: {}", i + 1, entry.case.fields.summary))
        .collect::<Vec<_>>();

    Select::new(message, options)
        .raw_prompt()
        .ok()
        .map(|choice| choice.index)
}

/// Pide un texto partiendo del valor actual; si se cancela lo conserva
fn prompt_text(message: &str, current: &str) -> String {
    Text::new(message)
        .with_initial_value(current)
        .prompt()
        .unwrap_or_else(|_| current.to_string())
}

fn select_step(editor: &Editor, message: &str) -> Option<usize> {
    let labels = editor.draft()?.step_labels();
    if labels.is_empty() {
        println!("{}", "El caso no tiene pasos.".yellow());
        return None;
    }
    Select::new(message, labels)
        .raw_prompt()
        .ok()
        .map(|choice| choice.index)
}

fn prompt_step(editor: &mut Editor, index: usize) -> Result<(), EditorError> {
    let draft = editor.draft_mut()?;
    let label = format!("Paso {}", index + 1);
    let step = &mut draft.steps[index];
    step.action = prompt_text(&format!("{} - Acción:", label), &step.action);
    step.result = prompt_text(&format!("{} - Resultado esperado:", label), &step.result);
    Ok(())
}

/// Formulario de edición; termina al guardar con éxito o al cancelar
fn edit_form(
    editor: &mut Editor,
    store: &mut Store,
    gateway: &dyn SyncGateway,
) -> Result<(), AppError> {
    while let Some(draft) = editor.draft() {
        let title = match editor.target() {
            Some(EditTarget::New) => "Añadir caso de prueba",
            _ => "Modificar caso de prueba",
        };
        println!("\n{}\n{}", title.bold(), render::draft(draft));

        let options = vec![
            FIELD_SUMMARY,
            FIELD_DESCRIPTION,
            FIELD_VERSION,
            FIELD_FOLDER,
            STEP_ADD,
            STEP_EDIT,
            STEP_REMOVE,
            FORM_SAVE,
            FORM_CANCEL,
        ];
        let selection = Select::new("¿Qué deseas cambiar?", options).prompt();

        match selection {
            Ok(FIELD_SUMMARY) => {
                let draft = editor.draft_mut()?;
                draft.summary = prompt_text("Resumen:", &draft.summary);
            }
            Ok(FIELD_DESCRIPTION) => {
                let draft = editor.draft_mut()?;
                draft.description = prompt_text("Descripción:", &draft.description);
            }
            Ok(FIELD_VERSION) => {
                let draft = editor.draft_mut()?;
                draft.version = prompt_text("Versión:", &draft.version);
            }
            Ok(FIELD_FOLDER) => {
                let draft = editor.draft_mut()?;
                draft.folder = prompt_text("Carpeta del repositorio Xray:", &draft.folder);
            }
            Ok(STEP_ADD) => {
                let index = editor.add_step()?;
                prompt_step(editor, index)?;
            }
            Ok(STEP_EDIT) => {
                if let Some(index) = select_step(editor, "Selecciona el paso a modificar:") {
                    prompt_step(editor, index)?;
                }
            }
            Ok(STEP_REMOVE) => {
                if let Some(index) = select_step(editor, "Selecciona el paso a eliminar:") {
                    editor.remove_step(index)?;
                }
            }
            Ok(FORM_SAVE) => match editor.save(store, gateway) {
                Ok(outcome) => {
                    let notice = match outcome.kind {
                        SaveKind::Updated => "✅ Caso de prueba modificado con éxito.",
                        SaveKind::Created => "✅ Nuevo caso de prueba creado con éxito.",
                    };
                    println!("{}", notice.green());
                    info!("{}", outcome.message);
                }
                Err(EditorError::SummaryRequired) => {
                    println!("{}", EditorError::SummaryRequired.to_string().red());
                }
                Err(EditorError::Sync(e)) => report_sync_error(e)?,
                Err(e) => return Err(e.into()),
            },
            _ => {
                editor.close();
                println!("{}", "Edición cancelada.".yellow());
            }
        }
    }

    Ok(())
}

fn delete(editor: &Editor, store: &mut Store) -> Result<(), AppError> {
    let Some(index) = select_case(store, "Selecciona un caso de prueba para eliminar:") else {
        return Ok(());
    };

    let removed = editor.delete(store, index, |case| {
        Confirm::new(&format!(
            "¿Seguro que deseas eliminar \"{}\"?",
            case.fields.summary
        ))
        .with_default(false)
        .prompt()
        .unwrap_or(false)
    })?;

    match removed {
        Some(_) => {
            println!("{}", "✅ Caso de prueba eliminado.".green());
            println!(
                "{}",
                "Usa 'Guardar cambios' para enviar la eliminación al servidor.".blue()
            );
        }
        None => println!("{}", "Operación cancelada.".yellow()),
    }

    Ok(())
}

fn save_all(store: &mut Store, gateway: &dyn SyncGateway) -> Result<(), AppError> {
    match gateway.save_all(&store.to_payload()) {
        Ok(message) => {
            store.mark_synced();
            println!("{}", format!("✅ {}", message).green());
            Ok(())
        }
        Err(e) => report_sync_error(e),
    }
}

/// Muestra el error al usuario; sólo una sesión caducada corta la sesión
fn report_sync_error(e: BackendError) -> Result<(), AppError> {
    match e {
        BackendError::Unauthenticated { .. } => Err(e.into()),
        other => {
            println!("{}", format!("❌ Error: {}", other).red());
            Ok(())
        }
    }
}

fn confirm_exit(store: &Store) -> bool {
    if !store.is_dirty() {
        return true;
    }

    exit_confirmed(
        Confirm::new("Hay cambios sin guardar. ¿Salir de todos modos?")
            .with_default(false)
            .prompt(),
    )
}

/// Cancelar la pregunta equivale a quedarse
fn exit_confirmed(answer: Result<bool, InquireError>) -> bool {
    answer.unwrap_or(false)
}
