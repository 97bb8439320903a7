//! Optimistic project list.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;

use fieldnotes_proto::project::{ProjectRecord, ProjectValues};

use super::{MutationAttempt, Outcome, PendingMutation, QueryCache, Target, temp_id};
use crate::api::{ApiError, ProjectsApi, SimulatedTransport, Transport};
use crate::notify::ToastCenter;
use crate::storage::Storage;

/// Cache key of the project list.
pub const PROJECTS_KEY: &str = "projects";

const CREATED: Outcome = Outcome {
    success: "Project created",
    failure: "Could not create project",
};

const UPDATED: Outcome = Outcome {
    success: "Project updated",
    failure: "Could not update project",
};

/// The project list as the user sees it, with optimistic mutations.
pub struct ProjectBoard<S, T = SimulatedTransport> {
    api: Arc<ProjectsApi<S, T>>,
    cache: Arc<QueryCache<ProjectRecord>>,
    toasts: ToastCenter,
    temp_seq: Arc<AtomicU64>,
}

impl<S, T> Clone for ProjectBoard<S, T> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            cache: Arc::clone(&self.cache),
            toasts: self.toasts.clone(),
            temp_seq: Arc::clone(&self.temp_seq),
        }
    }
}

impl<S, T> ProjectBoard<S, T>
where
    S: Storage + 'static,
    T: Transport + 'static,
{
    /// Creates a board with an empty cache.
    pub fn new(api: Arc<ProjectsApi<S, T>>, toasts: ToastCenter) -> Self {
        Self {
            api,
            cache: Arc::new(QueryCache::new()),
            toasts,
            temp_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The API the board dispatches to.
    #[must_use]
    pub const fn api(&self) -> &Arc<ProjectsApi<S, T>> {
        &self.api
    }

    /// Toasts raised by settled mutations.
    #[must_use]
    pub const fn toasts(&self) -> &ToastCenter {
        &self.toasts
    }

    /// The visible projects, if loaded.
    #[must_use]
    pub fn visible_projects(&self) -> Option<Vec<ProjectRecord>> {
        self.cache.get(PROJECTS_KEY)
    }

    /// Loads the project list from the API into the cache.
    ///
    /// # Errors
    ///
    /// Returns the API error; the cache is left unchanged.
    pub async fn refresh_projects(&self) -> Result<bool, ApiError> {
        self.cache
            .refresh(PROJECTS_KEY, self.api.list_projects())
            .await
    }

    /// Shows a new project at the top of the list under a temporary id.
    pub fn begin_create(&self, values: ProjectValues) -> PendingMutation<ProjectRecord> {
        let temp = temp_id(self.temp_seq.fetch_add(1, Ordering::Relaxed));
        let attempt =
            MutationAttempt::begin(&self.cache, PROJECTS_KEY, Target::Tentative(temp.clone()));

        let now = Utc::now();
        attempt.apply(
            &self.cache,
            ProjectRecord {
                id: temp,
                name: values.name.clone(),
                status: values.status,
                owner_email: values.owner_email.clone(),
                description: values.description.clone(),
                created_at: now,
                updated_at: now,
            },
        );

        let api = Arc::clone(&self.api);
        let dispatch = async move { api.create_project(values).await }.boxed();
        self.pending(attempt, CREATED, dispatch)
    }

    /// Shows new values for project `id` in place.
    pub fn begin_update(&self, id: &str, values: ProjectValues) -> PendingMutation<ProjectRecord> {
        let attempt = MutationAttempt::begin(
            &self.cache,
            PROJECTS_KEY,
            Target::Existing(id.to_string()),
        );
        let current = self
            .visible_projects()
            .and_then(|projects| projects.into_iter().find(|p| p.id == id));
        if let Some(current) = current {
            attempt.apply(&self.cache, current.with_values(values.clone(), Utc::now()));
        }

        let api = Arc::clone(&self.api);
        let project_id = id.to_string();
        let dispatch = async move { api.update_project(&project_id, values).await }.boxed();
        self.pending(attempt, UPDATED, dispatch)
    }

    /// Creates a project optimistically and waits for the outcome.
    ///
    /// # Errors
    ///
    /// Returns the API error after rolling back.
    pub async fn create_project(&self, values: ProjectValues) -> Result<ProjectRecord, ApiError> {
        self.begin_create(values).settle().await
    }

    /// Edits a project optimistically and waits for the outcome.
    ///
    /// # Errors
    ///
    /// Returns the API error after rolling back.
    pub async fn update_project(
        &self,
        id: &str,
        values: ProjectValues,
    ) -> Result<ProjectRecord, ApiError> {
        self.begin_update(id, values).settle().await
    }

    fn pending(
        &self,
        attempt: MutationAttempt<ProjectRecord>,
        outcome: Outcome,
        dispatch: BoxFuture<'static, Result<ProjectRecord, ApiError>>,
    ) -> PendingMutation<ProjectRecord> {
        let api = Arc::clone(&self.api);
        let refresh = async move { api.list_projects().await }.boxed();
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
