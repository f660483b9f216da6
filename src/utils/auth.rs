use std::fs;
use std::path::Path;

use reqwest::header::{
    HeaderMap, HeaderValue, InvalidHeaderValue, AUTHORIZATION, CONTENT_TYPE, COOKIE,
};
use tracing::debug;

use crate::config::Config;

/// Nombres de cookie que pueden llevar el token
const TOKEN_COOKIES: [&str; 2] = ["auth_token", "session_token"];

/// Credenciales con las que se firman las peticiones al backend
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    token: Option<String>,
    cookie: Option<String>,
}

impl AuthContext {
    pub fn from_config(config: &Config) -> Self {
        AuthContext {
            token: resolve_auth_token(
                config.token_file.as_deref(),
                config.session_token.as_deref(),
                config.cookie.as_deref(),
            ),
            cookie: config.cookie.clone(),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.as_deref().map_or(false, |token| !token.is_empty())
    }

    /// Cabeceras JSON más el token `Bearer` y las cookies si existen
    pub fn headers(&self) -> Result<HeaderMap, InvalidHeaderValue> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        if let Some(cookie) = &self.cookie {
            headers.insert(COOKIE, HeaderValue::from_str(cookie)?);
        }

        Ok(headers)
    }
}

/// Resuelve el token: archivo persistido, token de sesión y por último cookie
pub fn resolve_auth_token(
    token_file: Option<&Path>,
    session_token: Option<&str>,
    cookie: Option<&str>,
) -> Option<String> {
    let non_empty = |token: &str| {
        let token = token.trim();
        (!token.is_empty()).then(|| token.to_string())
    };

    if let Some(path) = token_file {
        match fs::read_to_string(path) {
            Ok(content) => {
                if let Some(token) = non_empty(content.as_str()) {
                    debug!("Token leído de {}", path.display());
                    return Some(token);
                }
            }
            Err(e) => debug!("No se pudo leer {}: {}", path.display(), e),
        }
    }

    if let Some(token) = session_token.and_then(non_empty) {
        return Some(token);
    }

    cookie.and_then(token_from_cookie)
}

/// Extrae el primer `auth_token` o `session_token` de una cabecera Cookie
pub fn token_from_cookie(cookie: &str) -> Option<String> {
    cookie.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        TOKEN_COOKIES
            .contains(&name)
            .then(|| value.to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Ruta de login que devuelve al usuario a `path` tras autenticarse
pub fn login_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/login?redirect={}",
        base_url,
        urlencoding::encode(path)
    )
}
