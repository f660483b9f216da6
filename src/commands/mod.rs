pub mod export;
pub mod import;
pub mod list;
pub mod session;

pub use export::*;
pub use import::*;
pub use list::*;
pub use session::*;

use tracing::{debug, error};

use crate::config::Config;
use crate::error::AppError;
use crate::models::Store;
use crate::utils::backend::{BackendError, HttpBackend};
use crate::utils::file_operations::read_test_data;

/// Carga inicial del almacén desde el archivo local o el backend.
///
/// Los datos ausentes o malformados sólo se registran y la vista queda
/// vacía; una sesión caducada sí interrumpe el comando.
pub fn load_initial(store: &mut Store, config: &Config, backend: &HttpBackend) -> Result<(), AppError> {
    let data = match &config.data_file {
        Some(path) => match read_test_data(path) {
            Ok(data) => data,
            Err(e) => {
                error!("Error al leer {}: {}", path.display(), e);
                return Ok(());
            }
        },
        None => match backend.fetch_test_cases() {
            Ok(data) => data,
            Err(e @ BackendError::Unauthenticated { .. }) => return Err(e.into()),
            Err(e) => {
                error!("Error al cargar los casos de prueba: {}", e);
                return Ok(());
            }
        },
    };

    if let Err(e) = store.load(data) {
        debug!("Carga abortada: {}", e);
    }
    Ok(())
}
