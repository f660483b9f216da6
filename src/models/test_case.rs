use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// Tipo de prueba asignado a los casos creados desde el editor
pub const DEFAULT_TEST_TYPE: &str = "Manual";
/// Clave de proyecto Jira asignada a los casos creados desde el editor
pub const DEFAULT_PROJECT_KEY: &str = "CDT";

/// Identificador estable de un caso de prueba dentro de una sesión.
///
/// Se genera al cargar o al crear el caso y nunca viaja al backend: la
/// posición en la lista puede cambiar, el identificador no.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TestCaseId(Uuid);

impl TestCaseId {
    pub fn new() -> Self {
        TestCaseId(Uuid::new_v4())
    }
}

impl Default for TestCaseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TestCaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Basta con el primer segmento para identificarlo en los logs
        let full = self.0.to_string();
        write!(f, "{}", full.split('-').next().unwrap_or("TC"))
    }
}

/// Un `null` cuenta como valor ausente
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Distingue una clave ausente (`None`) de una clave a `null` (`Some(None)`)
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Step {
    #[serde(default, deserialize_with = "null_as_default")]
    pub action: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub result: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Step {
    pub fn new(action: &str, result: &str) -> Self {
        Step {
            action: action.to_string(),
            result: result.to_string(),
            ..Default::default()
        }
    }

    /// Un paso sin acción ni resultado no se guarda
    pub fn is_blank(&self) -> bool {
        self.action.trim().is_empty() && self.result.trim().is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Project {
    #[serde(default, deserialize_with = "null_as_default")]
    pub key: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct FixVersion {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Fields {
    #[serde(default, deserialize_with = "null_as_default")]
    pub project: Project,
    #[serde(rename = "fixVersions", default, deserialize_with = "null_as_default")]
    pub fix_versions: Vec<FixVersion>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    /// Campos de Jira que el editor no toca pero debe conservar
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Caso de prueba manual tal como lo intercambia el backend
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct TestCase {
    /// `Some(None)` conserva un `"testtype": null` recibido
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub testtype: Option<Option<String>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Fields,
    #[serde(default, deserialize_with = "null_as_default")]
    pub steps: Vec<Step>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub xray_test_repository_folder: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TestCase {
    /// Crea un caso manual con el tipo y el proyecto por defecto
    pub fn new_manual(
        summary: &str,
        description: &str,
        version: &str,
        folder: &str,
        steps: Vec<Step>,
    ) -> Self {
        TestCase {
            testtype: Some(Some(DEFAULT_TEST_TYPE.to_string())),
            fields: Fields {
                project: Project {
                    key: DEFAULT_PROJECT_KEY.to_string(),
                    extra: Map::new(),
                },
                fix_versions: vec![FixVersion {
                    name: version.to_string(),
                    extra: Map::new(),
                }],
                summary: summary.to_string(),
                description: description.to_string(),
                extra: Map::new(),
            },
            steps,
            xray_test_repository_folder: folder.to_string(),
            extra: Map::new(),
        }
    }

    pub fn test_type(&self) -> Option<&str> {
        self.testtype.as_ref()?.as_deref()
    }

    /// Nombre de la primera versión, la única que se usa
    pub fn fix_version(&self) -> Option<&str> {
        self.fields.fix_versions.first().map(|v| v.name.as_str())
    }

    /// Reemplaza la versión conservando un único elemento
    pub fn set_fix_version(&mut self, name: &str) {
        self.fields.fix_versions = vec![FixVersion {
            name: name.to_string(),
            extra: Map::new(),
        }];
    }

    /// Busca `needle` (ya en minúsculas) en resumen, descripción, carpeta y pasos
    pub fn matches(&self, needle: &str) -> bool {
        let contains = |text: &str| text.to_lowercase().contains(needle);

        contains(&self.fields.summary)
            || contains(&self.fields.description)
            || contains(&self.xray_test_repository_folder)
            || self
                .steps
                .iter()
                .any(|step| contains(&step.action) || contains(&step.result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let raw = json!({
            "testtype": "Manual",
            "fields": {
                "summary": "Login",
                "description": "",
                "project": { "key": "CDT", "id": "1001" },
                "fixVersions": [{ "name": "1.2" }],
                "labels": ["smoke"]
            },
            "steps": [],
            "xray_test_repository_folder": "/auth",
            "update": { "issuelinks": [] }
        });

        let case: TestCase = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(case.fields.extra["labels"], json!(["smoke"]));
        assert_eq!(case.fields.project.extra["id"], json!("1001"));
        assert_eq!(serde_json::to_value(&case).unwrap(), raw);
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let case: TestCase = serde_json::from_value(json!({ "fields": { "summary": "x" } })).unwrap();
        assert_eq!(case.fields.description, "");
        assert!(case.steps.is_empty());
        assert_eq!(case.fix_version(), None);
        assert_eq!(case.testtype, None);
    }

    #[test]
    fn null_text_values_load_as_empty() {
        let case: TestCase = serde_json::from_value(json!({
            "fields": { "summary": "x", "description": null, "fixVersions": null },
            "steps": [{ "action": "Abrir", "data": null, "result": null }],
            "xray_test_repository_folder": null
        }))
        .unwrap();

        assert_eq!(case.fields.description, "");
        assert_eq!(case.fix_version(), None);
        assert_eq!(case.steps, vec![Step::new("Abrir", "")]);
        assert_eq!(case.xray_test_repository_folder, "");
    }

    #[test]
    fn step_extras_and_null_testtype_are_kept() {
        let raw = json!({
            "testtype": null,
            "fields": {
                "summary": "Login",
                "description": "",
                "project": { "key": "CDT" },
                "fixVersions": []
            },
            "steps": [{ "action": "x", "data": "", "result": "y", "id": "s-1" }],
            "xray_test_repository_folder": ""
        });

        let case: TestCase = serde_json::from_value(raw.clone()).unwrap();

        assert_eq!(case.testtype, Some(None));
        assert_eq!(case.test_type(), None);
        assert_eq!(case.steps[0].extra["id"], json!("s-1"));
        assert_eq!(serde_json::to_value(&case).unwrap(), raw);
    }

    #[test]
    fn matching_is_case_insensitive_across_fields() {
        let mut case = TestCase::new_manual("Login", "Valid user", "1.0", "/Auth/Web", vec![]);
        case.steps.push(Step::new("Open page", "Dashboard SHOWN"));

        assert!(case.matches("login"));
        assert!(case.matches("valid"));
        assert!(case.matches("auth/web"));
        assert!(case.matches("open"));
        assert!(case.matches("dashboard shown"));
        assert!(!case.matches("logout"));
    }

    #[test]
    fn blank_steps_are_detected_after_trimming() {
        assert!(Step::new("  ", "\t").is_blank());
        assert!(!Step::new("", "result").is_blank());
        assert!(!Step::new("action", " ").is_blank());
    }

    #[test]
    fn new_manual_uses_default_type_and_project() {
        let case = TestCase::new_manual("s", "d", "2.0", "/f", vec![]);
        assert_eq!(case.test_type(), Some(DEFAULT_TEST_TYPE));
        assert_eq!(case.fields.project.key, DEFAULT_PROJECT_KEY);
        assert_eq!(case.fix_version(), Some("2.0"));
    }
}
