//! Integration tests for optimistic mutations end to end.
//!
//! Boards run over the simulated API with paused time, so the interval
//! between the optimistic change and the authoritative answer can be
//! observed directly.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use fieldnotes::api::{ErrorCode, PROJECT_LATENCY, ProjectsApi, TASK_LATENCY, TasksApi};
use fieldnotes::notify::{ToastCenter, ToastTone};
use fieldnotes::optimistic::{ProjectBoard, TaskBoard};
use fieldnotes::storage::{InMemoryStorage, Storage, StorageError};
use fieldnotes::store::seed::TASKS_KEY;
use fieldnotes::store::{ProjectStore, TaskStore};
use fieldnotes_proto::project::{ProjectStatus, ProjectValues};
use fieldnotes_proto::status::TaskStatus;
use fieldnotes_proto::task::{TaskDraft, TaskRecord};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Storage whose writes fail while `fail_writes` is set.
#[derive(Default)]
struct FlakyStorage {
    inner: InMemoryStorage,
    fail_writes: AtomicBool,
}

impl FlakyStorage {
    fn set_failing(&self, failing: bool) {
        self.fail_writes.store(failing, Ordering::SeqCst);
    }
}

impl Storage for FlakyStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteFailed("disk full".into()));
        }
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove_item(key)
    }
}

type Board = TaskBoard<Arc<FlakyStorage>>;

async fn make_board() -> (Arc<FlakyStorage>, Board) {
    let storage = Arc::new(FlakyStorage::default());
    let store = Arc::new(TaskStore::new(Arc::clone(&storage)));
    let board = TaskBoard::new(Arc::new(TasksApi::simulated(store)), ToastCenter::default());
    board.refresh_tasks("alpha").await.unwrap();
    (storage, board)
}

fn visible(board: &Board, id: &str) -> Option<TaskRecord> {
    board
        .visible_tasks("alpha")?
        .into_iter()
        .find(|task| task.id == id)
}

// ---------------------------------------------------------------------------
// Moves
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn move_is_visible_before_the_api_answers() {
    let (_, board) = make_board().await;

    let pending = board.begin_move("alpha", "alpha-kickoff", TaskStatus::Doing);
    assert_eq!(
        visible(&board, "alpha-kickoff").unwrap().status,
        TaskStatus::Doing
    );

    let handle = tokio::spawn(pending.settle());
    tokio::time::sleep(TASK_LATENCY / 2).await;
    assert!(!handle.is_finished());
    assert_eq!(
        visible(&board, "alpha-kickoff").unwrap().status,
        TaskStatus::Doing
    );

    let moved = handle.await.unwrap().unwrap();
    assert_eq!(moved.status, TaskStatus::Doing);
    assert_eq!(visible(&board, "alpha-kickoff").unwrap(), moved);

    let toasts = board.toasts().snapshot();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].title, "Task moved");
    assert_eq!(toasts[0].tone, ToastTone::Success);
}

#[tokio::test(start_paused = true)]
async fn failed_write_reverts_move_and_raises_error_toast() {
    let (storage, board) = make_board().await;
    let before = board.visible_tasks("alpha").unwrap();

    storage.set_failing(true);
    let pending = board.begin_move("alpha", "alpha-kickoff", TaskStatus::Doing);
    assert_eq!(
        visible(&board, "alpha-kickoff").unwrap().status,
        TaskStatus::Doing
    );

    let err = pending.settle().await.unwrap_err();
    assert!(err.is(ErrorCode::StorageFailed));
    assert_eq!(board.visible_tasks("alpha").unwrap(), before);

    let toasts = board.toasts().snapshot();
    assert_eq!(toasts.len(), 1);
    assert_eq!(toasts[0].title, "Could not move task");
    assert_eq!(toasts[0].tone, ToastTone::Error);
    assert_eq!(
        toasts[0].description.as_deref(),
        Some("write failed: disk full")
    );
}

#[tokio::test(start_paused = true)]
async fn illegal_move_rolls_back_with_api_message() {
    let (storage, board) = make_board().await;
    let before = board.visible_tasks("alpha").unwrap();

    let err = board
        .move_task("alpha", "alpha-kickoff", TaskStatus::Done)
        .await
        .unwrap_err();

    assert_eq!(err.status, Some(400));
    assert_eq!(board.visible_tasks("alpha").unwrap(), before);
    assert_eq!(
        board.toasts().snapshot()[0].description.as_deref(),
        Some("Status change not allowed.")
    );
    assert!(storage.get_item(TASKS_KEY).unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn moves_on_different_records_settle_independently() {
    let (_, board) = make_board().await;

    let kickoff = board.begin_move("alpha", "alpha-kickoff", TaskStatus::Doing);
    let risks = board.begin_move("alpha", "alpha-risks", TaskStatus::Done);

    let (kickoff, risks) = tokio::join!(kickoff.settle(), risks.settle());
    assert_eq!(kickoff.unwrap().status, TaskStatus::Doing);
    assert_eq!(risks.unwrap().status, TaskStatus::Done);

    // Let the background refreshes land.
    tokio::time::sleep(TASK_LATENCY * 2).await;
    assert_eq!(
        visible(&board, "alpha-kickoff").unwrap().status,
        TaskStatus::Doing
    );
    assert_eq!(
        visible(&board, "alpha-risks").unwrap().status,
        TaskStatus::Done
    );
    assert_eq!(board.toasts().len(), 2);
}

// ---------------------------------------------------------------------------
// Creates and updates
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn failed_create_removes_temporary_record() {
    let (storage, board) = make_board().await;
    let before = board.visible_tasks("alpha").unwrap();

    storage.set_failing(true);
    let pending = board.begin_create("alpha", TaskDraft::new("Draft agenda", "Topics"));
    let shown = board.visible_tasks("alpha").unwrap();
    assert_eq!(shown.len(), before.len() + 1);
    assert!(shown[0].id.starts_with("temp-"));

    pending.settle().await.unwrap_err();
    assert_eq!(board.visible_tasks("alpha").unwrap(), before);
    assert_eq!(board.toasts().snapshot()[0].title, "Could not create task");
}

#[tokio::test(start_paused = true)]
async fn invalid_update_keeps_previous_values() {
    let (_, board) = make_board().await;
    let original = visible(&board, "alpha-risks").unwrap();

    let mut values = original.values();
    values.title = " ".to_string();
    let err = board
        .update_task("alpha", "alpha-risks", values)
        .await
        .unwrap_err();

    assert!(err.is(ErrorCode::ValidationFailed));
    assert_eq!(visible(&board, "alpha-risks").unwrap(), original);
}

#[tokio::test(start_paused = true)]
async fn error_toast_expires_after_default_duration() {
    let (storage, board) = make_board().await;
    storage.set_failing(true);
    board
        .move_task("alpha", "alpha-kickoff", TaskStatus::Doing)
        .await
        .unwrap_err();
    assert_eq!(board.toasts().len(), 1);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(board.toasts().is_empty());
}

#[tokio::test(start_paused = true)]
async fn project_update_round_trip() {
    let store = Arc::new(ProjectStore::new(InMemoryStorage::new()));
    let board = ProjectBoard::new(Arc::new(ProjectsApi::simulated(store)), ToastCenter::default());
    board.refresh_projects().await.unwrap();

    let mut values = board.api().get_project("atlas").await.unwrap().values();
    values.status = ProjectStatus::Done;
    let pending = board.begin_update("atlas", values);

    let shown = board.visible_projects().unwrap();
    assert_eq!(
        shown.iter().find(|p| p.id == "atlas").unwrap().status,
        ProjectStatus::Done
    );

    let updated = pending.settle().await.unwrap();
    assert_eq!(updated.status, ProjectStatus::Done);
    assert_eq!(board.toasts().snapshot()[0].title, "Project updated");
}

#[tokio::test(start_paused = true)]
async fn created_project_shows_first_then_last_after_refresh() {
    let store = Arc::new(ProjectStore::new(InMemoryStorage::new()));
    let board = ProjectBoard::new(Arc::new(ProjectsApi::simulated(store)), ToastCenter::default());
    board.refresh_projects().await.unwrap();

    let pending = board.begin_create(ProjectValues {
        name: "Field Study".to_string(),
        status: ProjectStatus::Planned,
        owner_email: "lead@company.com".to_string(),
        description: "Interviews with five pilot teams.".to_string(),
    });
    assert!(board.visible_projects().unwrap()[0].id.starts_with("temp-"));

    let created = pending.settle().await.unwrap();
    assert_eq!(board.visible_projects().unwrap()[0], created);

    tokio::time::sleep(PROJECT_LATENCY * 2).await;
    let shown = board.visible_projects().unwrap();
    assert_eq!(shown.len(), 4);
    assert_eq!(shown.last(), Some(&created));
}
