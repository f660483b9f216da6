use std::io;

use thiserror::Error;

use crate::editor::EditorError;
use crate::models::StoreError;
use crate::utils::backend::BackendError;

/// Errores que terminan un comando
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Error de archivo: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("Error en la entrada interactiva: {0}")]
    Prompt(#[from] inquire::InquireError),
}
