//! Task endpoints.
//!
//! Update and move re-check the status rule before calling the store and
//! verify afterwards that the record can be read back from the result.

use std::sync::Arc;

use fieldnotes_proto::status::{TaskStatus, can_transition};
use fieldnotes_proto::task::{TaskDraft, TaskRecord, TaskValues};

use super::{ApiError, ErrorCode, SimulatedTransport, TASK_LATENCY, Transport};
use crate::storage::Storage;
use crate::store::TaskStore;

/// Simulated task API.
pub struct TasksApi<S, T = SimulatedTransport> {
    store: Arc<TaskStore<S>>,
    transport: T,
}

impl<S: Storage> TasksApi<S> {
    /// Creates the API with the default task latency.
    pub const fn simulated(store: Arc<TaskStore<S>>) -> Self {
        Self::new(store, SimulatedTransport::new(TASK_LATENCY))
    }
}

impl<S: Storage, T: Transport> TasksApi<S, T> {
    /// Creates the API over `store` using `transport`.
    pub const fn new(store: Arc<TaskStore<S>>, transport: T) -> Self {
        Self { store, transport }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &Arc<TaskStore<S>> {
        &self.store
    }

    /// Tasks of `project_id`.
    ///
    /// # Errors
    ///
    /// Only transport failures.
    pub async fn list_tasks(&self, project_id: &str) -> Result<Vec<TaskRecord>, ApiError> {
        let store = &self.store;
        self.transport
            .execute(|| Ok(store.list_for_project(project_id)))
            .await
    }

    /// A single task.
    ///
    /// # Errors
    ///
    /// `TASK_NOT_FOUND` (404) if no task has `id`.
    pub async fn get_task(&self, id: &str) -> Result<TaskRecord, ApiError> {
        let store = &self.store;
        self.transport
            .execute(|| store.get_by_id(id).ok_or_else(not_found))
            .await
            .inspect_err(|e| log_failure("get_task", id, e))
    }

    /// Creates a task in `project_id`.
    ///
    /// # Errors
    ///
    /// `VALIDATION_FAILED` (422) with field details, or `STORAGE_FAILED`.
    pub async fn create_task(
        &self,
        project_id: &str,
        draft: TaskDraft,
    ) -> Result<TaskRecord, ApiError> {
        let store = &self.store;
        self.transport
            .execute(|| {
                let tasks = store.load();
                let (task, _) = store.create(project_id, draft, &tasks)?;
                Ok(task)
            })
            .await
            .inspect_err(|e| log_failure("create_task", project_id, e))
    }

    /// Replaces the editable fields of task `id`.
    ///
    /// # Errors
    ///
    /// `TASK_NOT_FOUND` (404), `TASK_STATUS_INVALID` (400),
    /// `VALIDATION_FAILED` (422), `STORAGE_FAILED`, or `TASK_UPDATE_FAILED`
    /// (500) if the record is missing from the updated collection.
    pub async fn update_task(&self, id: &str, values: TaskValues) -> Result<TaskRecord, ApiError> {
        let store = &self.store;
        self.transport
            .execute(|| {
                let tasks = store.load();
                let existing = store.get_by_id(id).ok_or_else(not_found)?;
                ensure_transition(existing.status, values.status)?;
                let next = store.update(id, values, &tasks)?;
                find(next, id).ok_or_else(|| {
                    ApiError::with_code(ErrorCode::TaskUpdateFailed, "Unable to update task.")
                })
            })
            .await
            .inspect_err(|e| log_failure("update_task", id, e))
    }

    /// Moves task `id` to `status`.
    ///
    /// # Errors
    ///
    /// `TASK_NOT_FOUND` (404), `TASK_STATUS_INVALID` (400),
    /// `STORAGE_FAILED`, or `TASK_MOVE_FAILED` (500) if the record is
    /// missing from the updated collection.
    pub async fn move_task_status(
        &self,
        id: &str,
        status: TaskStatus,
    ) -> Result<TaskRecord, ApiError> {
        let store = &self.store;
        self.transport
            .execute(|| {
                let tasks = store.load();
                let existing = store.get_by_id(id).ok_or_else(not_found)?;
                ensure_transition(existing.status, status)?;
                let next = store.move_status(id, status, &tasks)?;
                find(next, id).ok_or_else(|| {
                    ApiError::with_code(ErrorCode::TaskMoveFailed, "Unable to move task.")
                })
            })
            .await
            .inspect_err(|e| log_failure("move_task_status", id, e))
    }
}

fn not_found() -> ApiError {
    ApiError::with_code(ErrorCode::TaskNotFound, "Task not found.")
}

fn ensure_transition(from: TaskStatus, to: TaskStatus) -> Result<(), ApiError> {
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(ApiError::with_code(
            ErrorCode::TaskStatusInvalid,
            "Status change not allowed.",
        ))
    }
}

fn find(tasks: Vec<TaskRecord>, id: &str) -> Option<TaskRecord> {
    tasks.into_iter().find(|task| task.id == id)
}

fn log_failure(operation: &str, record_id: &str, err: &ApiError) {
    tracing::debug!(
        operation,
        record_id,
        code = err.code.map(ErrorCode::as_str),
        error = %err,
        "task api call failed"
    );
}
