//! Integration tests for the simulated API.
//!
//! Tests error normalization (codes, statuses, messages), the fixed
//! latency applied to every call, and plugging in another transport.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use tokio::time::Instant;

use fieldnotes::api::{
    ApiError, ErrorCode, PROJECT_LATENCY, ProjectsApi, TASK_LATENCY, TasksApi, Transport,
};
use fieldnotes::storage::{InMemoryStorage, Storage, StorageError};
use fieldnotes::store::seed::{PROJECTS_KEY, TASKS_KEY};
use fieldnotes::store::{ProjectStore, TaskStore};
use fieldnotes_proto::project::{ProjectStatus, ProjectValues};
use fieldnotes_proto::status::TaskStatus;
use fieldnotes_proto::task::{TaskDraft, TaskValues};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn tasks_api() -> (Arc<InMemoryStorage>, TasksApi<Arc<InMemoryStorage>>) {
    let storage = Arc::new(InMemoryStorage::new());
    let store = Arc::new(TaskStore::new(Arc::clone(&storage)));
    (storage, TasksApi::simulated(store))
}

fn projects_api() -> ProjectsApi<InMemoryStorage> {
    ProjectsApi::simulated(Arc::new(ProjectStore::new(InMemoryStorage::new())))
}

/// Storage that answers the next read of a key with an older value.
///
/// Later reads see the live value again, so a record can be present for
/// one read of a call and absent from another.
#[derive(Default)]
struct StaleReadStorage {
    inner: InMemoryStorage,
    stale: Mutex<Option<(String, String)>>,
}

impl StaleReadStorage {
    fn serve_once(&self, key: &str, value: String) {
        *self.stale.lock() = Some((key.to_string(), value));
    }
}

impl Storage for StaleReadStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut stale = self.stale.lock();
        if stale.as_ref().is_some_and(|(k, _)| k == key) {
            return Ok(stale.take().map(|(_, value)| value));
        }
        drop(stale);
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove_item(key)
    }
}

/// Task API whose storage holds the seed plus a task `gone`, and the raw
/// seed-only collection for replaying as a stale read.
async fn tasks_api_with_stale_read() -> (
    Arc<StaleReadStorage>,
    TasksApi<Arc<StaleReadStorage>>,
    String,
) {
    let storage = Arc::new(StaleReadStorage::default());
    let api = TasksApi::simulated(Arc::new(TaskStore::new(Arc::clone(&storage))));
    api.store().save(&api.store().load()).unwrap();
    let seed_only = storage.get_item(TASKS_KEY).unwrap().unwrap();
    let gone = api
        .create_task("alpha", TaskDraft::new("Gone", "Removed elsewhere"))
        .await
        .unwrap();
    assert_eq!(gone.id, "gone");
    (storage, api, seed_only)
}

/// Transport without delay that counts calls.
#[derive(Default)]
struct CountingTransport {
    calls: Arc<AtomicUsize>,
}

impl Transport for CountingTransport {
    async fn execute<T, F>(&self, operation: F) -> Result<T, ApiError>
    where
        T: Send,
        F: FnOnce() -> Result<T, ApiError> + Send,
    {
        self.calls.fetch_add(1, Ordering::SeqCst);
        operation()
    }
}

// ---------------------------------------------------------------------------
// Error normalization
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn missing_task_is_404() {
    let (_, api) = tasks_api();
    let err = api.get_task("missing").await.unwrap_err();
    assert_eq!(err.message, "Task not found.");
    assert_eq!(err.status, Some(404));
    assert!(err.is(ErrorCode::TaskNotFound));
}

#[tokio::test(start_paused = true)]
async fn missing_project_is_404() {
    let api = projects_api();
    let err = api.get_project("missing").await.unwrap_err();
    assert_eq!(err.message, "Project not found.");
    assert_eq!(err.status, Some(404));
    assert!(err.is(ErrorCode::ProjectNotFound));

    let values = api.get_project("alpha").await.unwrap().values();
    let err = api.update_project("missing", values).await.unwrap_err();
    assert!(err.is(ErrorCode::ProjectNotFound));
}

#[tokio::test(start_paused = true)]
async fn skipping_a_step_is_400_and_writes_nothing() {
    let (storage, api) = tasks_api();
    api.store().save(&api.store().load()).unwrap();
    let before = storage.get_item(TASKS_KEY).unwrap();
    assert!(before.is_some());

    let err = api
        .move_task_status("alpha-kickoff", TaskStatus::Done)
        .await
        .unwrap_err();

    assert_eq!(err.message, "Status change not allowed.");
    assert_eq!(err.status, Some(400));
    assert!(err.is(ErrorCode::TaskStatusInvalid));
    assert_eq!(storage.get_item(TASKS_KEY).unwrap(), before);
    assert_eq!(
        api.get_task("alpha-kickoff").await.unwrap().status,
        TaskStatus::Todo
    );
}

#[tokio::test(start_paused = true)]
async fn update_rejects_status_jump() {
    let (_, api) = tasks_api();
    let values = TaskValues {
        title: "Component review".to_string(),
        description: "Back to the start".to_string(),
        status: TaskStatus::Todo,
    };
    let err = api.update_task("nova-review", values).await.unwrap_err();
    assert!(err.is(ErrorCode::TaskStatusInvalid));
}

#[tokio::test(start_paused = true)]
async fn invalid_values_are_422_with_field_details() {
    let (_, api) = tasks_api();
    let err = api
        .create_task("alpha", TaskDraft::new("x", "ok"))
        .await
        .unwrap_err();

    assert_eq!(err.status, Some(422));
    assert!(err.is(ErrorCode::ValidationFailed));
    let details = err.details.unwrap();
    let fields: Vec<&str> = details
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["field"].as_str())
        .collect();
    assert_eq!(fields, ["title", "description"]);
}

#[tokio::test(start_paused = true)]
async fn serialized_error_omits_missing_fields() {
    let err = ApiError::new("");
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json, serde_json::json!({ "message": "" }));
    assert_eq!(err.display_message(), "Something went wrong.");

    let (_, api) = tasks_api();
    let err = api.get_task("missing").await.unwrap_err();
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["code"], "TASK_NOT_FOUND");
    assert_eq!(json["status"], 404);
}

// ---------------------------------------------------------------------------
// Read-back after write
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn move_missing_from_written_collection_is_500() {
    let (storage, api, seed_only) = tasks_api_with_stale_read().await;

    storage.serve_once(TASKS_KEY, seed_only);
    let err = api
        .move_task_status("gone", TaskStatus::Doing)
        .await
        .unwrap_err();

    assert!(err.is(ErrorCode::TaskMoveFailed));
    assert_eq!(err.status, Some(500));
    assert_eq!(err.message, "Unable to move task.");
    assert_eq!(api.get_task("gone").await.unwrap().status, TaskStatus::Todo);
}

#[tokio::test(start_paused = true)]
async fn update_missing_from_written_collection_is_500() {
    let (storage, api, seed_only) = tasks_api_with_stale_read().await;

    storage.serve_once(TASKS_KEY, seed_only);
    let values = TaskValues {
        title: "Gone for good".to_string(),
        description: "Removed elsewhere".to_string(),
        status: TaskStatus::Todo,
    };
    let err = api.update_task("gone", values).await.unwrap_err();

    assert!(err.is(ErrorCode::TaskUpdateFailed));
    assert_eq!(err.status, Some(500));
    assert_eq!(err.message, "Unable to update task.");
    assert_eq!(api.get_task("gone").await.unwrap().title, "Gone");
}

#[tokio::test(start_paused = true)]
async fn project_update_missing_from_written_collection_is_500() {
    let storage = Arc::new(StaleReadStorage::default());
    let api = ProjectsApi::simulated(Arc::new(ProjectStore::new(Arc::clone(&storage))));
    api.store().save(&api.store().load()).unwrap();
    let seed_only = storage.get_item(PROJECTS_KEY).unwrap().unwrap();
    let values = ProjectValues {
        name: "Field Study".to_string(),
        status: ProjectStatus::Planned,
        owner_email: "lead@company.com".to_string(),
        description: "Interviews with five pilot teams.".to_string(),
    };
    let project = api.create_project(values.clone()).await.unwrap();

    storage.serve_once(PROJECTS_KEY, seed_only);
    let err = api
        .update_project(
            &project.id,
            ProjectValues {
                status: ProjectStatus::Done,
                ..values
            },
        )
        .await
        .unwrap_err();

    assert!(err.is(ErrorCode::ProjectUpdateFailed));
    assert_eq!(err.status, Some(500));
    assert_eq!(err.message, "Unable to update project.");
    assert_eq!(
        api.get_project(&project.id).await.unwrap().status,
        ProjectStatus::Planned
    );
}

// ---------------------------------------------------------------------------
// Successful calls
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn list_tasks_is_scoped_to_project() {
    let (_, api) = tasks_api();
    let tasks = api.list_tasks("alpha").await.unwrap();
    let ids: Vec<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["alpha-kickoff", "alpha-risks"]);
    assert!(api.list_tasks("unknown").await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn create_then_move_along_the_lifecycle() {
    let (_, api) = tasks_api();
    let task = api
        .create_task("atlas", TaskDraft::new("Map owners", "One owner per domain"))
        .await
        .unwrap();
    assert_eq!(task.id, "map-owners");

    let doing = api
        .move_task_status(&task.id, TaskStatus::Doing)
        .await
        .unwrap();
    assert_eq!(doing.status, TaskStatus::Doing);

    let done = api
        .move_task_status(&task.id, TaskStatus::Done)
        .await
        .unwrap();
    assert_eq!(done.status, TaskStatus::Done);
    assert!(done.updated_at >= done.created_at);
}

#[tokio::test(start_paused = true)]
async fn create_project_assigns_slug_id() {
    let api = projects_api();
    let project = api
        .create_project(ProjectValues {
            name: "Field Study".to_string(),
            status: ProjectStatus::Planned,
            owner_email: "lead@company.com".to_string(),
            description: "Interviews with five pilot teams.".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(project.id, "field-study");
    assert_eq!(api.list_projects().await.unwrap().len(), 4);
}

// ---------------------------------------------------------------------------
// Latency
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn task_calls_take_task_latency() {
    let (_, api) = tasks_api();
    let start = Instant::now();
    api.list_tasks("alpha").await.unwrap();
    assert!(start.elapsed() >= TASK_LATENCY);
}

#[tokio::test(start_paused = true)]
async fn failed_calls_also_wait() {
    let (_, api) = tasks_api();
    let start = Instant::now();
    api.get_task("missing").await.unwrap_err();
    assert!(start.elapsed() >= TASK_LATENCY);
}

#[tokio::test(start_paused = true)]
async fn project_calls_take_project_latency() {
    let api = projects_api();
    let start = Instant::now();
    api.list_projects().await.unwrap();
    let elapsed = start.elapsed();
    assert!(elapsed >= PROJECT_LATENCY);
    assert!(elapsed < TASK_LATENCY);
}

#[tokio::test(start_paused = true)]
async fn custom_transport_replaces_delay() {
    let store = Arc::new(TaskStore::new(InMemoryStorage::new()));
    let transport = CountingTransport::default();
    let calls = Arc::clone(&transport.calls);
    let api = TasksApi::new(store, transport);

    let start = Instant::now();
    api.list_tasks("alpha").await.unwrap();
    let err = api.get_task("missing").await.unwrap_err();

    assert!(err.is(ErrorCode::TaskNotFound));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(start.elapsed(), std::time::Duration::ZERO);
}
