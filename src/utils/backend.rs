use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::InvalidHeaderValue;
use reqwest::{Method, StatusCode, Url};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::models::TestCase;
use crate::utils::auth::{login_url, AuthContext};

/// Recurso estático con los casos generados
pub const TEST_CASES_PATH: &str = "/static/data/output_tc.json";
pub const SAVE_PATH: &str = "/save_tests";
pub const IMPORT_PATH: &str = "/import-xray";
/// Página a la que vuelve el usuario después de iniciar sesión
const RESULT_PAGE_PATH: &str = "/resultat";

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Inicia sesión para continuar: {login_url}")]
    Unauthenticated { login_url: String },
    #[error("{0}")]
    Server(String),
    #[error("Error de red ({0})")]
    Network(String),
    #[error("Error HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Respuesta JSON inválida: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Cabecera inválida: {0}")]
    Header(#[from] InvalidHeaderValue),
}

/// Persiste la lista completa de casos en el backend.
///
/// Devuelve el mensaje de confirmación del servidor. No existe
/// actualización parcial: cada llamada sobrescribe todo.
pub trait SyncGateway {
    fn save_all(&self, cases: &[TestCase]) -> Result<String, BackendError>;
}

/// Resultado de lanzar la importación a Xray
#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    /// El servidor redirigió; contiene la URL final
    Redirected(String),
    /// Página devuelta por el servidor, normalmente un informe de error
    Page(String),
}

/// Cliente HTTP bloqueante contra el backend de la aplicación
pub struct HttpBackend {
    client: Client,
    config: Config,
    auth: AuthContext,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self, BackendError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        let auth = AuthContext::from_config(config);

        debug!(
            base_url = %config.base_url,
            logged_in = auth.is_logged_in(),
            "Cliente del backend creado"
        );

        Ok(HttpBackend {
            client,
            config: config.clone(),
            auth,
        })
    }

    /// Envía la petición firmada; un 401 se traduce en `Unauthenticated`
    fn auth_fetch(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = request.headers(self.auth.headers()?).send()?;

        if response.status() == StatusCode::UNAUTHORIZED {
            let login_url = login_url(&self.config.base_url, RESULT_PAGE_PATH);
            warn!("Sesión no válida, redirigir a {}", login_url);
            return Err(BackendError::Unauthenticated { login_url });
        }

        Ok(response)
    }

    /// Llamada JSON genérica; los errores usan el campo `error` del servidor
    pub fn api_call(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, BackendError> {
        let mut request = self.client.request(method, self.config.url(path));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = self.auth_fetch(request)?;
        let status = response.status();
        let text = response.text()?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("error").and_then(Value::as_str).map(String::from))
                .unwrap_or_else(|| format!("HTTP {}", status));
            error!("Error en {}: {}", path, message);
            return Err(BackendError::Server(message));
        }

        Ok(serde_json::from_str(&text)?)
    }

    /// Descarga el conjunto de casos tal cual, sin validarlo
    pub fn fetch_test_cases(&self) -> Result<Value, BackendError> {
        self.api_call(Method::GET, TEST_CASES_PATH, None)
    }

    pub fn import_xray(&self) -> Result<ImportOutcome, BackendError> {
        let url = self.config.url(IMPORT_PATH);
        let response = self.auth_fetch(self.client.post(&url))?;

        if was_redirected(&url, response.url()) {
            let target = response.url().to_string();
            info!("Importación redirigida a {}", target);
            return Ok(ImportOutcome::Redirected(target));
        }

        Ok(ImportOutcome::Page(response.text()?))
    }
}

/// Compara URLs ya normalizadas (mayúsculas del host, puerto por defecto)
fn was_redirected(requested: &str, landed: &Url) -> bool {
    match Url::parse(requested) {
        Ok(requested) => &requested != landed,
        Err(_) => requested != landed.as_str(),
    }
}

impl SyncGateway for HttpBackend {
    fn save_all(&self, cases: &[TestCase]) -> Result<String, BackendError> {
        let request = self.client.post(self.config.url(SAVE_PATH)).json(cases);

        let response = match self.auth_fetch(request) {
            Ok(response) => response,
            Err(e @ BackendError::Unauthenticated { .. }) => return Err(e),
            Err(e) => {
                error!("Error de red: {}", e);
                return Err(BackendError::Network(e.to_string()));
            }
        };

        let reply: Value = match response.json() {
            Ok(reply) => reply,
            Err(e) => {
                error!("Error de red: {}", e);
                return Err(BackendError::Network(e.to_string()));
            }
        };

        if let Some(message) = reply.get("message").and_then(Value::as_str) {
            info!(count = cases.len(), "Casos de prueba guardados");
            return Ok(message.to_string());
        }
        if let Some(message) = reply.get("error").and_then(Value::as_str) {
            return Err(BackendError::Server(message.to_string()));
        }

        Err(BackendError::Network(format!("respuesta inesperada: {}", reply)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> Config {
        Config {
            base_url: server.uri(),
            session_token: Some("secret".to_string()),
            ..Default::default()
        }
    }

    /// El cliente bloqueante no puede crearse ni destruirse dentro del runtime
    async fn with_backend<T, F>(config: Config, call: F) -> T
    where
        T: Send + 'static,
        F: FnOnce(&HttpBackend) -> T + Send + 'static,
    {
        tokio::task::spawn_blocking(move || {
            let backend = HttpBackend::new(&config).unwrap();
            call(&backend)
        })
        .await
        .unwrap()
    }

    #[test]
    fn normalized_urls_are_not_a_redirect() {
        let landed = Url::parse("http://host/import-xray").unwrap();
        assert!(!was_redirected("http://Host:80/import-xray", &landed));
        assert!(!was_redirected("http://host/import-xray", &landed));
        assert!(was_redirected("http://host/resultat", &landed));
    }

    fn sample_cases() -> Vec<TestCase> {
        vec![TestCase::new_manual("Login", "", "1.0", "/Auth", vec![])]
    }

    #[tokio::test]
    async fn save_all_posts_the_full_list_with_credentials() {
        let server = MockServer::start().await;
        let cases = sample_cases();
        Mock::given(method("POST"))
            .and(path(SAVE_PATH))
            .and(header("authorization", "Bearer secret"))
            .and(header("content-type", "application/json"))
            .and(body_json(&cases))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "message": "Guardado" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = with_backend(config_for(&server), move |backend| backend.save_all(&cases)).await;
        assert_eq!(result.unwrap(), "Guardado");
    }

    #[tokio::test]
    async fn save_all_surfaces_the_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SAVE_PATH))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "error": "Debe ser una lista" })),
            )
            .mount(&server)
            .await;

        let result = with_backend(config_for(&server), |backend| {
            backend.save_all(&sample_cases())
        })
        .await;

        match result {
            Err(BackendError::Server(message)) => assert_eq!(message, "Debe ser una lista"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn save_all_treats_unknown_replies_as_network_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SAVE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let result = with_backend(config_for(&server), |backend| {
            backend.save_all(&sample_cases())
        })
        .await;
        assert!(matches!(result, Err(BackendError::Network(_))));
    }

    #[tokio::test]
    async fn unauthorized_responses_point_to_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SAVE_PATH))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let uri = server.uri();
        let result = with_backend(config_for(&server), |backend| {
            backend.save_all(&sample_cases())
        })
        .await;

        match result {
            Err(BackendError::Unauthenticated { login_url }) => {
                assert_eq!(login_url, format!("{}/login?redirect=%2Fresultat", uri))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn fetch_returns_the_raw_document() {
        let server = MockServer::start().await;
        let document = json!([{ "fields": { "summary": "Login" } }]);
        Mock::given(method("GET"))
            .and(path(TEST_CASES_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(&document))
            .mount(&server)
            .await;

        let fetched = with_backend(config_for(&server), |backend| backend.fetch_test_cases())
            .await
            .unwrap();
        assert_eq!(fetched, document);
    }

    #[tokio::test]
    async fn api_call_uses_the_error_field_on_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(TEST_CASES_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "Sin datos" })))
            .mount(&server)
            .await;

        let result = with_backend(config_for(&server), |backend| backend.fetch_test_cases()).await;
        assert!(matches!(result, Err(BackendError::Server(m)) if m == "Sin datos"));
    }

    #[tokio::test]
    async fn import_follows_redirects() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(IMPORT_PATH))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/dashboard"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/dashboard"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let uri = server.uri();
        let outcome = with_backend(config_for(&server), |backend| backend.import_xray())
            .await
            .unwrap();
        assert_eq!(outcome, ImportOutcome::Redirected(format!("{}/dashboard", uri)));
    }

    #[tokio::test]
    async fn import_returns_the_page_when_not_redirected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(IMPORT_PATH))
            .respond_with(
                ResponseTemplate::new(500).set_body_string(r#"{"error": "Xray no disponible"}"#),
            )
            .mount(&server)
            .await;

        let outcome = with_backend(config_for(&server), |backend| backend.import_xray())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            ImportOutcome::Page(r#"{"error": "Xray no disponible"}"#.to_string())
        );
    }
}
