use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use serde_json::Value;
use tracing::info;

use crate::models::TestCase;

/// Lee un conjunto de casos de prueba desde un archivo JSON local
pub fn read_test_data(file_path: &Path) -> io::Result<Value> {
    // Verificar si el archivo existe
    if !file_path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("El archivo {} no existe", file_path.display()),
        ));
    }

    let reader = BufReader::new(File::open(file_path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Guarda los casos en JSON con sangría de dos espacios
pub fn save_to_json(file_path: &Path, test_cases: &[TestCase]) -> io::Result<()> {
    if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(file_path)?;
    serde_json::to_writer_pretty(&mut file, test_cases)?;
    writeln!(file)?;

    info!(count = test_cases.len(), "Casos exportados a {}", file_path.display());
    Ok(())
}

/// Nombre de exportación con fecha y hora, p. ej. `output_tc-20240101_120000.json`
pub fn default_export_path() -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("output_tc-{}.json", timestamp))
}
