//! Task store: create, edit and move tasks over a persisted collection.
//!
//! Every status change, whether through a full edit or a move, goes through
//! [`can_transition`] before anything is written.

use chrono::Utc;

use fieldnotes_proto::ids::id_for;
use fieldnotes_proto::status::{TaskStatus, can_transition};
use fieldnotes_proto::task::{TASK_ID_FALLBACK, TaskDraft, TaskRecord, TaskValues};

use super::StoreError;
use super::seed::{TASKS_KEY, default_tasks};
use crate::storage::{SeededCollection, Storage};

/// Authoritative task collection.
pub struct TaskStore<S> {
    collection: SeededCollection<S, TaskRecord>,
}

impl<S: Storage> TaskStore<S> {
    /// Creates a store with the default seed tasks.
    pub fn new(storage: S) -> Self {
        Self::with_seed(storage, default_tasks(Utc::now()))
    }

    /// Creates a store with a custom seed collection.
    pub fn with_seed(storage: S, seed: Vec<TaskRecord>) -> Self {
        Self {
            collection: SeededCollection::new(storage, TASKS_KEY, seed),
        }
    }

    /// Loads every task, merged over the seed.
    #[must_use]
    pub fn load(&self) -> Vec<TaskRecord> {
        self.collection.load()
    }

    /// Persists `tasks` as the whole collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] if the write fails.
    pub fn save(&self, tasks: &[TaskRecord]) -> Result<(), StoreError> {
        Ok(self.collection.save(tasks)?)
    }

    /// Tasks belonging to `project_id`, in collection order.
    #[must_use]
    pub fn list_for_project(&self, project_id: &str) -> Vec<TaskRecord> {
        self.load()
            .into_iter()
            .filter(|task| task.project_id == project_id)
            .collect()
    }

    /// Looks up a task by id.
    #[must_use]
    pub fn get_by_id(&self, id: &str) -> Option<TaskRecord> {
        self.load().into_iter().find(|task| task.id == id)
    }

    /// Creates a task in `project_id` and prepends it to `tasks`.
    ///
    /// The id is the slugified title, suffixed until unique within `tasks`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if the draft fails validation, or
    /// [`StoreError::Storage`] if the new collection cannot be persisted.
    pub fn create(
        &self,
        project_id: &str,
        draft: TaskDraft,
        tasks: &[TaskRecord],
    ) -> Result<(TaskRecord, Vec<TaskRecord>), StoreError> {
        draft.validate()?;

        let now = Utc::now();
        let id = id_for(&draft.title, TASK_ID_FALLBACK, tasks);
        let values = draft.into_values();
        let task = TaskRecord {
            id,
            project_id: project_id.to_string(),
            title: values.title,
            description: values.description,
            status: values.status,
            created_at: now,
            updated_at: now,
        };

        let next: Vec<TaskRecord> = std::iter::once(task.clone())
            .chain(tasks.iter().cloned())
            .collect();
        self.save(&next)?;

        tracing::debug!(task_id = %task.id, project_id, status = %task.status, "task created");
        Ok((task, next))
    }

    /// Replaces the editable fields of task `id`.
    ///
    /// An unknown id leaves the collection unchanged and writes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] for invalid values,
    /// [`StoreError::InvalidTransition`] if the status change skips a step,
    /// or [`StoreError::Storage`] if the write fails. On error nothing is
    /// persisted.
    pub fn update(
        &self,
        id: &str,
        values: TaskValues,
        tasks: &[TaskRecord],
    ) -> Result<Vec<TaskRecord>, StoreError> {
        values.validate()?;
        self.replace(id, values.status, tasks, |task, now| {
            task.with_values(values, now)
        })
    }

    /// Changes only the status of task `id`.
    ///
    /// An unknown id leaves the collection unchanged and writes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidTransition`] if the move skips a step,
    /// or [`StoreError::Storage`] if the write fails.
    pub fn move_status(
        &self,
        id: &str,
        status: TaskStatus,
        tasks: &[TaskRecord],
    ) -> Result<Vec<TaskRecord>, StoreError> {
        self.replace(id, status, tasks, |task, now| task.with_status(status, now))
    }

    fn replace<F>(
        &self,
        id: &str,
        status: TaskStatus,
        tasks: &[TaskRecord],
        apply: F,
    ) -> Result<Vec<TaskRecord>, StoreError>
    where
        F: FnOnce(&TaskRecord, chrono::DateTime<Utc>) -> TaskRecord,
    {
        let Some(index) = tasks.iter().position(|task| task.id == id) else {
            tracing::debug!(task_id = id, "task not in collection, nothing to change");
            return Ok(tasks.to_vec());
        };

        let from = tasks[index].status;
        if !can_transition(from, status) {
            tracing::info!(task_id = id, %from, to = %status, "rejected task status transition");
            return Err(StoreError::InvalidTransition { from, to: status });
        }

        let mut next = tasks.to_vec();
        next[index] = apply(&tasks[index], Utc::now());
        self.save(&next)?;

        tracing::debug!(task_id = id, %from, to = %status, "task updated");
        Ok(next)
    }
}
