use std::path::{Path, PathBuf};

use crate::calc::{compute_grades, GradeReport};
use crate::db::SqliteBackend;
use crate::model::{Assignment, Class};
use crate::store::{CollectionStore, EntityKind, StoreError};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Sidecar state. `grades` is the published report, rebuilt after every
/// change to classes or assignments.
#[derive(Default)]
pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub store: Option<CollectionStore>,
    pub grades: GradeReport,
}

impl AppState {
    pub fn open_workspace(&mut self, path: &Path) -> anyhow::Result<()> {
        let backend = SqliteBackend::open(path)?;
        self.store = Some(CollectionStore::new(Box::new(backend)));
        self.workspace = Some(path.to_path_buf());
        self.refresh_grades();
        info!(
            workspace = %path.display(),
            overall_gpa = %self.grades.overall_gpa,
            "workspace opened"
        );
        Ok(())
    }

    pub fn store_mut(&mut self) -> Result<&mut CollectionStore, StoreError> {
        self.store.as_mut().ok_or(StoreError::NoWorkspace)
    }

    pub fn typed_collections(&mut self) -> (Vec<Class>, Vec<Assignment>) {
        let Some(store) = self.store.as_mut() else {
            return (Vec::new(), Vec::new());
        };
        let classes = store
            .records(EntityKind::Classes)
            .iter()
            .map(Class::from_record)
            .collect();
        let assignments = store
            .records(EntityKind::Assignments)
            .iter()
            .map(Assignment::from_record)
            .collect();
        (classes, assignments)
    }

    pub fn refresh_grades(&mut self) {
        let (classes, assignments) = self.typed_collections();
        self.grades = compute_grades(&classes, &assignments);
    }
}
