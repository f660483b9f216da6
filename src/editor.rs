//! Edición de casos de prueba: formulario en curso y guardado en el backend.
//!
//! El editor sólo conoce el formulario. Los cambios pasan a la lista
//! autoritativa al guardar y, a continuación, se envía la lista completa a
//! través de un [`SyncGateway`]. Si el envío falla el cambio local se
//! mantiene y el editor sigue abierto para reintentar.

use thiserror::Error;
use tracing::{info, warn};

use crate::models::{Step, Store, StoreError, TestCase, TestCaseId};
use crate::utils::backend::{BackendError, SyncGateway};

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("¡El resumen es obligatorio!")]
    SummaryRequired,
    #[error("Ya hay un caso de prueba en edición")]
    AlreadyOpen,
    #[error("No hay ningún caso de prueba en edición")]
    NotOpen,
    #[error("No existe el paso {}", .0 + 1)]
    StepOutOfRange(usize),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Sync(#[from] BackendError),
}

/// Qué caso se guarda al confirmar el formulario
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EditTarget {
    Existing(TestCaseId),
    New,
}

/// Valores del formulario de edición
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    pub summary: String,
    pub description: String,
    pub version: String,
    pub folder: String,
    pub steps: Vec<Step>,
}

impl Draft {
    fn from_case(case: &TestCase) -> Self {
        Draft {
            summary: case.fields.summary.clone(),
            description: case.fields.description.clone(),
            version: case.fix_version().unwrap_or_default().to_string(),
            folder: case.xray_test_repository_folder.clone(),
            steps: case.steps.clone(),
        }
    }

    /// Etiquetas numeradas de 1 a N sin huecos
    pub fn step_labels(&self) -> Vec<String> {
        (1..=self.steps.len()).map(|n| format!("Paso {}", n)).collect()
    }

    /// Pasos a guardar: se descartan los vacíos y `data` siempre va vacío;
    /// las claves desconocidas de cada paso se conservan
    fn collected_steps(&self) -> Vec<Step> {
        self.steps
            .iter()
            .filter(|step| !step.is_blank())
            .map(|step| Step {
                data: String::new(),
                ..step.clone()
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SaveKind {
    Updated,
    Created,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub kind: SaveKind,
    /// Mensaje devuelto por el servidor
    pub message: String,
}

#[derive(Debug, Default)]
enum EditorState {
    #[default]
    Closed,
    Editing { target: EditTarget, draft: Draft },
}

#[derive(Debug, Default)]
pub struct Editor {
    state: EditorState,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, EditorState::Editing { .. })
    }

    pub fn target(&self) -> Option<EditTarget> {
        match &self.state {
            EditorState::Editing { target, .. } => Some(*target),
            EditorState::Closed => None,
        }
    }

    pub fn draft(&self) -> Option<&Draft> {
        match &self.state {
            EditorState::Editing { draft, .. } => Some(draft),
            EditorState::Closed => None,
        }
    }

    pub fn draft_mut(&mut self) -> Result<&mut Draft, EditorError> {
        match &mut self.state {
            EditorState::Editing { draft, .. } => Ok(draft),
            EditorState::Closed => Err(EditorError::NotOpen),
        }
    }

    fn open(&mut self, target: EditTarget, draft: Draft) -> Result<(), EditorError> {
        if self.is_open() {
            return Err(EditorError::AlreadyOpen);
        }
        self.state = EditorState::Editing { target, draft };
        Ok(())
    }

    /// Abre el formulario con el caso mostrado en la posición `index`
    pub fn open_for_edit(&mut self, store: &Store, index: usize) -> Result<(), EditorError> {
        let id = store.filtered_id(index)?;
        let case = store.get(id).ok_or(StoreError::IndexOutOfRange(index))?;
        let draft = Draft::from_case(case);
        self.open(EditTarget::Existing(id), draft)
    }

    /// Abre un formulario vacío; carpeta y versión se copian del primer caso
    pub fn open_for_new(&mut self, store: &Store) -> Result<(), EditorError> {
        let draft = match store.all().first() {
            Some(first) => Draft {
                version: first.case.fix_version().unwrap_or_default().to_string(),
                folder: first.case.xray_test_repository_folder.clone(),
                ..Default::default()
            },
            None => Draft::default(),
        };
        self.open(EditTarget::New, draft)
    }

    /// Añade un paso vacío y devuelve su posición
    pub fn add_step(&mut self) -> Result<usize, EditorError> {
        let draft = self.draft_mut()?;
        draft.steps.push(Step::default());
        Ok(draft.steps.len() - 1)
    }

    pub fn remove_step(&mut self, index: usize) -> Result<Step, EditorError> {
        let draft = self.draft_mut()?;
        if index >= draft.steps.len() {
            return Err(EditorError::StepOutOfRange(index));
        }
        Ok(draft.steps.remove(index))
    }

    /// Descarta el formulario sin tocar la lista
    pub fn close(&mut self) {
        self.state = EditorState::Closed;
    }

    /// Aplica el formulario a la lista y la envía completa al backend
    pub fn save(
        &mut self,
        store: &mut Store,
        gateway: &dyn SyncGateway,
    ) -> Result<SaveOutcome, EditorError> {
        let (target, draft) = match &self.state {
            EditorState::Editing { target, draft } => (*target, draft),
            EditorState::Closed => return Err(EditorError::NotOpen),
        };

        if draft.summary.trim().is_empty() {
            warn!("Guardado rechazado: resumen vacío");
            return Err(EditorError::SummaryRequired);
        }

        let steps = draft.collected_steps();
        let (kind, saved) = match target {
            EditTarget::Existing(id) => {
                let applied = store.update(id, |case| {
                    case.fields.summary = draft.summary.clone();
                    case.fields.description = draft.description.clone();
                    case.set_fix_version(&draft.version);
                    case.steps = steps;
                    case.xray_test_repository_folder = draft.folder.clone();
                });
                if !applied {
                    warn!(id = %id, "El caso en edición ya no existe");
                }
                (SaveKind::Updated, target)
            }
            EditTarget::New => {
                let case = TestCase::new_manual(
                    &draft.summary,
                    &draft.description,
                    &draft.version,
                    &draft.folder,
                    steps,
                );
                let id = store.insert(case);
                info!(id = %id, "Nuevo caso de prueba creado");
                (SaveKind::Created, EditTarget::Existing(id))
            }
        };

        // Un reintento tras un fallo actualiza el caso ya insertado
        if let EditorState::Editing { target, .. } = &mut self.state {
            *target = saved;
        }

        let message = gateway.save_all(&store.to_payload())?;
        store.mark_synced();
        self.close();

        Ok(SaveOutcome { kind, message })
    }

    /// Elimina el caso mostrado en `index` si `confirm` lo aprueba.
    ///
    /// Sólo cambia la lista local; el backend se entera en el próximo
    /// guardado.
    pub fn delete<F>(
        &self,
        store: &mut Store,
        index: usize,
        confirm: F,
    ) -> Result<Option<TestCase>, EditorError>
    where
        F: FnOnce(&TestCase) -> bool,
    {
        let id = store.filtered_id(index)?;
        let case = store.get(id).ok_or(StoreError::IndexOutOfRange(index))?;
        if !confirm(case) {
            return Ok(None);
        }
        Ok(Some(store.remove_filtered(index)?))
    }
}
