//! Project endpoints.

use std::sync::Arc;

use fieldnotes_proto::project::{ProjectRecord, ProjectValues};

use super::{ApiError, ErrorCode, PROJECT_LATENCY, SimulatedTransport, Transport};
use crate::storage::Storage;
use crate::store::ProjectStore;

/// Simulated project API.
pub struct ProjectsApi<S, T = SimulatedTransport> {
    store: Arc<ProjectStore<S>>,
    transport: T,
}

impl<S: Storage> ProjectsApi<S> {
    /// Creates the API with the default project latency.
    pub const fn simulated(store: Arc<ProjectStore<S>>) -> Self {
        Self::new(store, SimulatedTransport::new(PROJECT_LATENCY))
    }
}

impl<S: Storage, T: Transport> ProjectsApi<S, T> {
    /// Creates the API over `store` using `transport`.
    pub const fn new(store: Arc<ProjectStore<S>>, transport: T) -> Self {
        Self { store, transport }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &Arc<ProjectStore<S>> {
        &self.store
    }

    /// Every project.
    ///
    /// # Errors
    ///
    /// Only transport failures.
    pub async fn list_projects(&self) -> Result<Vec<ProjectRecord>, ApiError> {
        let store = &self.store;
        self.transport.execute(|| Ok(store.load())).await
    }

    /// A single project.
    ///
    /// # Errors
    ///
    /// `PROJECT_NOT_FOUND` (404) if no project has `id`.
    pub async fn get_project(&self, id: &str) -> Result<ProjectRecord, ApiError> {
        let store = &self.store;
        self.transport
            .execute(|| store.get_by_id(Some(id)).ok_or_else(not_found))
            .await
            .inspect_err(|e| log_failure("get_project", id, e))
    }

    /// Creates a project.
    ///
    /// # Errors
    ///
    /// `VALIDATION_FAILED` (422) with field details, or `STORAGE_FAILED`.
    pub async fn create_project(&self, values: ProjectValues) -> Result<ProjectRecord, ApiError> {
        let store = &self.store;
        let name = values.name.clone();
        self.transport
            .execute(|| {
                let projects = store.load();
                let (project, _) = store.create(values, &projects)?;
                Ok(project)
            })
            .await
            .inspect_err(|e| log_failure("create_project", &name, e))
    }

    /// Replaces the editable fields of project `id`.
    ///
    /// # Errors
    ///
    /// `PROJECT_NOT_FOUND` (404), `VALIDATION_FAILED` (422),
    /// `STORAGE_FAILED`, or `PROJECT_UPDATE_FAILED` (500) if the record is
    /// missing from the updated collection.
    pub async fn update_project(
        &self,
        id: &str,
        values: ProjectValues,
    ) -> Result<ProjectRecord, ApiError> {
        let store = &self.store;
        self.transport
            .execute(|| {
                let projects = store.load();
                store.get_by_id(Some(id)).ok_or_else(not_found)?;
                store
                    .update(id, values, &projects)?
                    .into_iter()
                    .find(|project| project.id == id)
                    .ok_or_else(|| {
                        ApiError::with_code(
                            ErrorCode::ProjectUpdateFailed,
                            "Unable to update project.",
                        )
                    })
            })
            .await
            .inspect_err(|e| log_failure("update_project", id, e))
    }
}

fn not_found() -> ApiError {
    ApiError::with_code(ErrorCode::ProjectNotFound, "Project not found.")
}

fn log_failure(operation: &str, record_id: &str, err: &ApiError) {
    tracing::debug!(
        operation,
        record_id,
        code = err.code.map(ErrorCode::as_str),
        error = %err,
        "project api call failed"
    );
}
