//! Integration tests for the record stores.
//!
//! Covers id generation on create, atomic rejection of status transitions
//! that skip a step, and behavior when the storage backend fails.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::redundant_clone)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use fieldnotes::storage::{InMemoryStorage, Storage, StorageError};
use fieldnotes::store::seed::TASKS_KEY;
use fieldnotes::store::{ProjectStore, StoreError, TaskStore};
use fieldnotes_proto::project::{ProjectStatus, ProjectValues};
use fieldnotes_proto::status::TaskStatus;
use fieldnotes_proto::task::{TaskDraft, TaskValues};

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
            return Err(StorageError::WriteFailed("simulated failure".into()));
        }
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove_item(key)
    }
}

fn task_store() -> (Arc<InMemoryStorage>, TaskStore<Arc<InMemoryStorage>>) {
    let storage = Arc::new(InMemoryStorage::new());
    let store = TaskStore::new(Arc::clone(&storage));
    (storage, store)
}

fn project_values(name: &str) -> ProjectValues {
    ProjectValues {
        name: name.to_string(),
        status: ProjectStatus::Planned,
        owner_email: "owner@company.com".to_string(),
        description: "A description that is long enough.".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[test]
fn create_task_slugifies_title_and_prepends() {
    let (_, store) = task_store();
    let tasks = store.load();

    let (task, next) = store
        .create("alpha", TaskDraft::new("Draft agenda", "Topics and owners"), &tasks)
        .unwrap();

    assert_eq!(task.id, "draft-agenda");
    assert_eq!(task.project_id, "alpha");
    assert_eq!(task.status, TaskStatus::Todo);
    assert_eq!(next[0], task);
    assert_eq!(next.len(), tasks.len() + 1);
    assert_eq!(store.get_by_id("draft-agenda"), Some(task));
}

#[test]
fn create_task_suffixes_colliding_ids() {
    let (_, store) = task_store();
    let tasks = store.load();

    let (first, tasks) = store
        .create("alpha", TaskDraft::new("Alpha kickoff", "Second kickoff"), &tasks)
        .unwrap();
    let (second, _) = store
        .create("alpha", TaskDraft::new("Alpha: kickoff!", "Third kickoff"), &tasks)
        .unwrap();

    assert_eq!(first.id, "alpha-kickoff-2");
    assert_eq!(second.id, "alpha-kickoff-3");
}

#[test]
fn create_task_without_slug_characters_uses_fallback() {
    let (_, store) = task_store();
    let tasks = store.load();
    let (task, _) = store
        .create("nova", TaskDraft::new("!!!???", "Punctuation only"), &tasks)
        .unwrap();
    assert_eq!(task.id, "task");
}

#[test]
fn create_project_suffixes_colliding_ids() {
    let storage = Arc::new(InMemoryStorage::new());
    let store = ProjectStore::new(Arc::clone(&storage));
    let projects = store.load();

    let (project, _) = store
        .create(project_values("Project Alpha"), &projects)
        .unwrap();
    assert_eq!(project.id, "project-alpha");

    let (again, _) = store
        .create(project_values("project alpha"), &store.load())
        .unwrap();
    assert_eq!(again.id, "project-alpha-2");
}

#[test]
fn invalid_draft_is_rejected_without_write() {
    let (storage, store) = task_store();
    let tasks = store.load();

    let err = store
        .create("alpha", TaskDraft::new("x", "no"), &tasks)
        .unwrap_err();

    let StoreError::Validation(errors) = err else {
        panic!("expected validation error");
    };
    assert!(errors.get("title").is_some());
    assert!(errors.get("description").is_some());
    assert!(storage.get_item(TASKS_KEY).unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

#[test]
fn adjacent_move_is_persisted() {
    let (_, store) = task_store();
    let tasks = store.load();

    let next = store
        .move_status("alpha-kickoff", TaskStatus::Doing, &tasks)
        .unwrap();
    let moved = next.iter().find(|t| t.id == "alpha-kickoff").unwrap();
    assert_eq!(moved.status, TaskStatus::Doing);
    assert!(moved.updated_at >= moved.created_at);
    assert_eq!(
        store.get_by_id("alpha-kickoff").unwrap().status,
        TaskStatus::Doing
    );
}

#[test]
fn illegal_move_leaves_storage_byte_identical() {
    let (storage, store) = task_store();
    let tasks = store.load();
    store.save(&tasks).unwrap();
    let before = storage.get_item(TASKS_KEY).unwrap();

    let err = store
        .move_status("alpha-kickoff", TaskStatus::Done, &tasks)
        .unwrap_err();

    assert!(matches!(
        err,
        StoreError::InvalidTransition {
            from: TaskStatus::Todo,
            to: TaskStatus::Done,
        }
    ));
    assert_eq!(err.to_string(), "Invalid task status transition.");
    assert_eq!(storage.get_item(TASKS_KEY).unwrap(), before);
}

#[test]
fn illegal_update_leaves_storage_untouched() {
    let (storage, store) = task_store();
    let tasks = store.load();

    let values = TaskValues {
        title: "Component review".to_string(),
        description: "Reopened straight to todo".to_string(),
        status: TaskStatus::Todo,
    };
    let err = store.update("nova-review", values, &tasks).unwrap_err();

    assert!(matches!(err, StoreError::InvalidTransition { .. }));
    assert!(storage.get_item(TASKS_KEY).unwrap().is_none());
}

#[test]
fn same_status_update_is_allowed() {
    let (_, store) = task_store();
    let tasks = store.load();

    let values = TaskValues {
        title: "Risk register v2".to_string(),
        description: "Capture top 5 risks.".to_string(),
        status: TaskStatus::Doing,
    };
    let next = store.update("alpha-risks", values, &tasks).unwrap();
    let updated = next.iter().find(|t| t.id == "alpha-risks").unwrap();
    assert_eq!(updated.title, "Risk register v2");
    assert_eq!(updated.status, TaskStatus::Doing);
}

#[test]
fn unknown_id_is_a_no_op() {
    let (storage, store) = task_store();
    let tasks = store.load();

    let next = store
        .move_status("missing", TaskStatus::Doing, &tasks)
        .unwrap();

    assert_eq!(next, tasks);
    assert!(storage.get_item(TASKS_KEY).unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Storage failures
// ---------------------------------------------------------------------------

#[test]
fn write_failure_surfaces_as_storage_error() {
    let storage = Arc::new(FlakyStorage::default());
    let store = TaskStore::new(Arc::clone(&storage));
    let tasks = store.load();

    storage.set_failing(true);
    let err = store
        .move_status("alpha-kickoff", TaskStatus::Doing, &tasks)
        .unwrap_err();
    assert!(matches!(err, StoreError::Storage(StorageError::WriteFailed(_))));

    storage.set_failing(false);
    assert_eq!(
        store.get_by_id("alpha-kickoff").unwrap().status,
        TaskStatus::Todo
    );
}

#[test]
fn project_status_may_jump() {
    let storage = Arc::new(InMemoryStorage::new());
    let store = ProjectStore::new(Arc::clone(&storage));
    let projects = store.load();

    let mut values = store.get_by_id(Some("atlas")).unwrap().values();
    values.status = ProjectStatus::Done;
    let next = store.update("atlas", values, &projects).unwrap();

    assert_eq!(
        next.iter().find(|p| p.id == "atlas").unwrap().status,
        ProjectStatus::Done
    );
}
