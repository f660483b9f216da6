use colored::*;
use tracing::error;

use crate::error::AppError;
use crate::utils::backend::{BackendError, HttpBackend, ImportOutcome};

/// Lanza la importación de los casos guardados a Xray
pub fn import_to_xray(backend: &HttpBackend) -> Result<(), AppError> {
    println!("{}", "Importando casos de prueba a Xray...".blue());

    match backend.import_xray() {
        Ok(ImportOutcome::Redirected(url)) => {
            println!("{}", format!("Importación completada. Continúa en {}", url).green());
        }
        // El servidor devuelve la página a mostrar, normalmente con el error
        Ok(ImportOutcome::Page(body)) => println!("{}", body),
        Err(e @ BackendError::Unauthenticated { .. }) => return Err(e.into()),
        Err(e) => {
            error!("Error durante la importación a Xray: {}", e);
            println!("{}", "Error durante la importación a Xray.".red());
        }
    }

    Ok(())
}
