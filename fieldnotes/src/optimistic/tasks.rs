//! Optimistic task board for one workspace.
//!
//! The visible task list of each project is cached under
//! [`tasks_key`]. The board never checks status rules itself: an illegal
//! move is shown optimistically, rejected by the API, and rolled back.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use futures_util::FutureExt;

use fieldnotes_proto::status::TaskStatus;
use fieldnotes_proto::task::{TaskDraft, TaskRecord, TaskValues};

use super::{MutationAttempt, Outcome, PendingMutation, QueryCache, Target, temp_id};
use crate::api::{ApiError, SimulatedTransport, TasksApi, Transport};
use crate::notify::ToastCenter;
use crate::storage::Storage;

const CREATED: Outcome = Outcome {
    success: "Task created",
    failure: "Could not create task",
};

const UPDATED: Outcome = Outcome {
    success: "Task updated",
    failure: "Could not update task",
};

const MOVED: Outcome = Outcome {
    success: "Task moved",
    failure: "Could not move task",
};

/// Cache key of a project's task list.
#[must_use]
pub fn tasks_key(project_id: &str) -> String {
    format!("tasks:{project_id}")
}

/// Task lists as the user sees them, with optimistic mutations.
pub struct TaskBoard<S, T = SimulatedTransport> {
    api: Arc<TasksApi<S, T>>,
    cache: Arc<QueryCache<TaskRecord>>,
    toasts: ToastCenter,
    temp_seq: Arc<AtomicU64>,
}

impl<S, T> Clone for TaskBoard<S, T> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            cache: Arc::clone(&self.cache),
            toasts: self.toasts.clone(),
            temp_seq: Arc::clone(&self.temp_seq),
        }
    }
}

impl<S, T> TaskBoard<S, T>
where
    S: Storage + 'static,
    T: Transport + 'static,
{
    /// Creates a board with an empty cache.
    pub fn new(api: Arc<TasksApi<S, T>>, toasts: ToastCenter) -> Self {
        Self {
            api,
            cache: Arc::new(QueryCache::new()),
            toasts,
            temp_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The API the board dispatches to.
    #[must_use]
    pub const fn api(&self) -> &Arc<TasksApi<S, T>> {
        &self.api
    }

    /// The cache of visible task lists.
    #[must_use]
    pub const fn cache(&self) -> &Arc<QueryCache<TaskRecord>> {
        &self.cache
    }

    /// Toasts raised by settled mutations.
    #[must_use]
    pub const fn toasts(&self) -> &ToastCenter {
        &self.toasts
    }

    /// The visible tasks of `project_id`, if loaded.
    #[must_use]
    pub fn visible_tasks(&self, project_id: &str) -> Option<Vec<TaskRecord>> {
        self.cache.get(&tasks_key(project_id))
    }

    /// Loads the tasks of `project_id` from the API into the cache.
    ///
    /// Returns `false` if a mutation cancelled the refresh in flight.
    ///
    /// # Errors
    ///
    /// Returns the API error; the cache is left unchanged.
    pub async fn refresh_tasks(&self, project_id: &str) -> Result<bool, ApiError> {
        self.cache
            .refresh(&tasks_key(project_id), self.api.list_tasks(project_id))
            .await
    }

    /// Shows a new task at the top of the list under a temporary id.
    pub fn begin_create(&self, project_id: &str, draft: TaskDraft) -> PendingMutation<TaskRecord> {
        let temp = temp_id(self.temp_seq.fetch_add(1, Ordering::Relaxed));
        let attempt = MutationAttempt::begin(
            &self.cache,
            tasks_key(project_id),
            Target::Tentative(temp.clone()),
        );

        let now = Utc::now();
        attempt.apply(
            &self.cache,
            TaskRecord {
                id: temp,
                project_id: project_id.to_string(),
                title: draft.title.clone(),
                description: draft.description.clone(),
                status: draft.resolved_status(),
                created_at: now,
                updated_at: now,
            },
        );

        let api = Arc::clone(&self.api);
        let project = project_id.to_string();
        let dispatch = async move { api.create_task(&project, draft).await }.boxed();
        self.pending(attempt, project_id, CREATED, dispatch)
    }

    /// Shows new values for task `id` in place.
    pub fn begin_update(
        &self,
        project_id: &str,
        id: &str,
        values: TaskValues,
    ) -> PendingMutation<TaskRecord> {
        let attempt = self.begin_existing(project_id, id);
        if let Some(current) = self.visible(project_id, id) {
            attempt.apply(&self.cache, current.with_values(values.clone(), Utc::now()));
        }

        let api = Arc::clone(&self.api);
        let task_id = id.to_string();
        let dispatch = async move { api.update_task(&task_id, values).await }.boxed();
        self.pending(attempt, project_id, UPDATED, dispatch)
    }

    /// Shows task `id` in `status` immediately.
    pub fn begin_move(
        &self,
        project_id: &str,
        id: &str,
        status: TaskStatus,
    ) -> PendingMutation<TaskRecord> {
        let attempt = self.begin_existing(project_id, id);
        if let Some(current) = self.visible(project_id, id) {
            attempt.apply(&self.cache, current.with_status(status, Utc::now()));
        }

        let api = Arc::clone(&self.api);
        let task_id = id.to_string();
        let dispatch = async move { api.move_task_status(&task_id, status).await }.boxed();
        self.pending(attempt, project_id, MOVED, dispatch)
    }

    /// Creates a task optimistically and waits for the outcome.
    ///
    /// # Errors
    ///
    /// Returns the API error after rolling back.
    pub async fn create_task(
        &self,
        project_id: &str,
        draft: TaskDraft,
    ) -> Result<TaskRecord, ApiError> {
        self.begin_create(project_id, draft).settle().await
    }

    /// Edits a task optimistically and waits for the outcome.
    ///
    /// # Errors
    ///
    /// Returns the API error after rolling back.
    pub async fn update_task(
        &self,
        project_id: &str,
        id: &str,
        values: TaskValues,
    ) -> Result<TaskRecord, ApiError> {
        self.begin_update(project_id, id, values).settle().await
    }

    /// Moves a task optimistically and waits for the outcome.
    ///
    /// # Errors
    ///
    /// Returns the API error after rolling back.
    pub async fn move_task(
        &self,
        project_id: &str,
        id: &str,
        status: TaskStatus,
    ) -> Result<TaskRecord, ApiError> {
        self.begin_move(project_id, id, status).settle().await
    }

    fn begin_existing(&self, project_id: &str, id: &str) -> MutationAttempt<TaskRecord> {
        MutationAttempt::begin(
            &self.cache,
            tasks_key(project_id),
            Target::Existing(id.to_string()),
        )
    }

    fn visible(&self, project_id: &str, id: &str) -> Option<TaskRecord> {
        self.visible_tasks(project_id)?
            .into_iter()
            .find(|task| task.id == id)
    }

    fn pending(
        &self,
        attempt: MutationAttempt<TaskRecord>,
        project_id: &str,
        outcome: Outcome,
        dispatch: futures_util::future::BoxFuture<'static, Result<TaskRecord, ApiError>>,
    ) -> PendingMutation<TaskRecord> {
        let api = Arc::clone(&self.api);
        let project = project_id.to_string();
        let refresh = async move { api.list_tasks(&project).await }.boxed();
        PendingMutation::new(
            attempt,
            Arc::clone(&self.cache),
            self.toasts.clone(),
            outcome,
            dispatch,
            refresh,
        )
    }
}
