use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info};

use super::test_case::{TestCase, TestCaseId};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Error de parseo JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("El JSON no es una lista de casos de prueba")]
    NotAnArray,
    #[error("Índice fuera de rango: {0}")]
    IndexOutOfRange(usize),
}

/// Caso de prueba junto con su identificador de sesión
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: TestCaseId,
    pub case: TestCase,
}

impl Entry {
    fn new(case: TestCase) -> Self {
        Entry {
            id: TestCaseId::new(),
            case,
        }
    }
}

/// Estadísticas agregadas de la lista completa
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub total_tests: usize,
    pub total_steps: usize,
    pub avg_steps: f64,
}

/// Lista autoritativa de casos y la vista filtrada que se muestra.
///
/// La vista filtrada sólo guarda identificadores, de modo que cualquier
/// edición se aplica siempre sobre la entrada autoritativa.
#[derive(Debug, Default)]
pub struct Store {
    entries: Vec<Entry>,
    filtered: Vec<TestCaseId>,
    search_term: String,
    dirty: bool,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reemplaza el contenido con los casos de `data`.
    ///
    /// Si `data` es una cadena se intenta parsear una sola vez. Cualquier
    /// valor que no sea una lista deja el almacén tal como estaba.
    pub fn load(&mut self, data: Value) -> Result<usize, StoreError> {
        let data = match data {
            Value::String(raw) => serde_json::from_str(&raw).map_err(|e| {
                error!("Error de parseo JSON: {}", e);
                StoreError::Json(e)
            })?,
            other => other,
        };

        let items = match data {
            Value::Array(items) => items,
            other => {
                error!("El JSON no es una lista: {}", other);
                return Err(StoreError::NotAnArray);
            }
        };

        let cases = items
            .into_iter()
            .map(serde_json::from_value::<TestCase>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| {
                error!("Caso de prueba inválido: {}", e);
                StoreError::Json(e)
            })?;

        self.entries = cases.into_iter().map(Entry::new).collect();
        self.search_term.clear();
        self.dirty = false;
        self.refilter();

        info!(count = self.entries.len(), "Casos de prueba cargados");
        Ok(self.entries.len())
    }

    /// Recalcula la vista filtrada desde cero
    pub fn filter(&mut self, term: &str) {
        self.search_term = term.to_string();
        self.refilter();
        debug!(term, matches = self.filtered.len(), "Filtro aplicado");
    }

    fn refilter(&mut self) {
        let needle = self.search_term.to_lowercase();
        self.filtered = self
            .entries
            .iter()
            .filter(|entry| needle.is_empty() || entry.case.matches(&needle))
            .map(|entry| entry.id)
            .collect();
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Posición en la lista autoritativa del caso con ese identificador
    pub fn find_authoritative_index(&self, id: TestCaseId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    pub fn get(&self, id: TestCaseId) -> Option<&TestCase> {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| &entry.case)
    }

    pub fn all(&self) -> &[Entry] {
        &self.entries
    }

    pub fn filtered(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.filtered.iter().filter_map(move |id| {
            self.find_authoritative_index(*id)
                .map(|index| &self.entries[index])
        })
    }

    pub fn filtered_len(&self) -> usize {
        self.filtered.len()
    }

    pub fn filtered_id(&self, index: usize) -> Result<TestCaseId, StoreError> {
        self.filtered
            .get(index)
            .copied()
            .ok_or(StoreError::IndexOutOfRange(index))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Añade un caso al final y vuelve a mostrar la lista completa
    pub fn insert(&mut self, case: TestCase) -> TestCaseId {
        let entry = Entry::new(case);
        let id = entry.id;
        self.entries.push(entry);
        self.search_term.clear();
        self.refilter();
        self.dirty = true;
        id
    }

    /// Modifica en sitio el caso autoritativo; `false` si ya no existe
    pub fn update<F>(&mut self, id: TestCaseId, edit: F) -> bool
    where
        F: FnOnce(&mut TestCase),
    {
        match self.entries.iter_mut().find(|entry| entry.id == id) {
            Some(entry) => {
                edit(&mut entry.case);
                self.dirty = true;
                true
            }
            None => false,
        }
    }

    /// Quita de ambas listas el caso mostrado en la posición `index`
    pub fn remove_filtered(&mut self, index: usize) -> Result<TestCase, StoreError> {
        let id = self.filtered_id(index)?;
        let original_index = self
            .find_authoritative_index(id)
            .ok_or(StoreError::IndexOutOfRange(index))?;

        let removed = self.entries.remove(original_index);
        self.filtered.remove(index);
        self.dirty = true;

        debug!(id = %id, original_index, "Caso de prueba eliminado");
        Ok(removed.case)
    }

    /// Lista completa tal como se envía al backend
    pub fn to_payload(&self) -> Vec<TestCase> {
        self.entries.iter().map(|entry| entry.case.clone()).collect()
    }

    pub fn stats(&self) -> Stats {
        let total_tests = self.entries.len();
        let total_steps: usize = self.entries.iter().map(|entry| entry.case.steps.len()).sum();
        let avg_steps = if total_tests > 0 {
            (total_steps as f64 / total_tests as f64 * 10.0).round() / 10.0
        } else {
            0.0
        };

        Stats {
            total_tests,
            total_steps,
            avg_steps,
        }
    }

    /// Hay cambios locales que el backend todavía no conoce
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_synced(&mut self) {
        self.dirty = false;
    }
}
