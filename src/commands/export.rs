use std::path::PathBuf;

use colored::*;

use crate::commands::load_initial;
use crate::config::Config;
use crate::error::AppError;
use crate::models::Store;
use crate::utils::backend::HttpBackend;
use crate::utils::file_operations::{default_export_path, save_to_json};

/// Exporta los casos de prueba a un archivo JSON
pub fn export_test_cases(config: &Config, output: Option<PathBuf>) -> Result<(), AppError> {
    let backend = HttpBackend::new(config)?;
    let mut store = Store::new();
    load_initial(&mut store, config, &backend)?;

    if store.is_empty() {
        println!("{}", "No hay casos de prueba para exportar.".yellow());
        return Ok(());
    }

    let path = output.unwrap_or_else(default_export_path);
    save_to_json(&path, &store.to_payload())?;

    println!(
        "{}",
        format!(
            "{} casos de prueba exportados a {}",
            store.len(),
            path.display()
        )
        .green()
    );
    Ok(())
}
