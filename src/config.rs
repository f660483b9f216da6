use std::path::PathBuf;
use std::time::Duration;

/// URL del backend si no se indica otra
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
/// Variable de entorno con la URL del backend
pub const BASE_URL_ENV: &str = "XRAY_TC_BASE_URL";
/// Variable de entorno con el token de la sesión actual
pub const SESSION_TOKEN_ENV: &str = "XRAY_TC_AUTH_TOKEN";

/// Configuración resuelta a partir de la línea de comandos y el entorno
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub base_url: String,
    /// Token persistido en disco, tiene prioridad sobre los demás
    pub token_file: Option<PathBuf>,
    pub session_token: Option<String>,
    /// Cabecera `Cookie` a enviar, p. ej. `session_token=abc; theme=dark`
    pub cookie: Option<String>,
    /// Archivo JSON local que sustituye a la descarga inicial
    pub data_file: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl Config {
    pub fn new(base_url: Option<String>) -> Self {
        // Orden: argumento, variable de entorno, valor por defecto
        let base_url = base_url
            .or_else(|| std::env::var(BASE_URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Config {
            base_url: base_url.trim_end_matches('/').to_string(),
            session_token: std::env::var(SESSION_TOKEN_ENV)
                .ok()
                .filter(|token| !token.trim().is_empty()),
            ..Default::default()
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}
