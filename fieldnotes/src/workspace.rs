//! Wiring of storage, stores, APIs and boards from a resolved configuration.

use std::sync::Arc;

use fieldnotes_proto::auth::LoginValues;
use fieldnotes_proto::project::{ProjectRecord, ProjectStatus};
use fieldnotes_proto::query::{ListQuery, Page};
use fieldnotes_proto::status::TaskStatus;
use fieldnotes_proto::task::TaskRecord;

use crate::api::{ApiError, ProjectsApi, SimulatedTransport, TasksApi};
use crate::config::{StorageTarget, WorkspaceConfig};
use crate::notify::ToastCenter;
use crate::optimistic::{ProjectBoard, TaskBoard};
use crate::session::Session;
use crate::storage::{FileStorage, InMemoryStorage, Storage, StorageError};
use crate::store::{ProjectStore, TaskStore};

/// Storage shared by both stores.
pub type SharedStorage = Arc<dyn Storage>;

/// Everything a front end needs, built once per process.
pub struct Workspace {
    config: WorkspaceConfig,
    session: Session,
    toasts: ToastCenter,
    projects: ProjectBoard<SharedStorage>,
    tasks: TaskBoard<SharedStorage>,
}

impl Workspace {
    /// Opens the configured storage and builds the workspace on it.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the storage document's directory cannot
    /// be created.
    pub fn open(config: WorkspaceConfig) -> Result<Self, StorageError> {
        let storage: SharedStorage = match &config.storage {
            StorageTarget::InMemory => {
                tracing::info!("workspace opened in memory");
                Arc::new(InMemoryStorage::new())
            }
            StorageTarget::File(path) => {
                let storage = FileStorage::open(path)?;
                tracing::info!(path = %storage.path().display(), "workspace opened");
                Arc::new(storage)
            }
        };
        Ok(Self::with_storage(config, storage))
    }

    /// Builds the workspace on an existing storage.
    #[must_use]
    pub fn with_storage(config: WorkspaceConfig, storage: SharedStorage) -> Self {
        let toasts = ToastCenter::new(config.toast_duration);

        let project_store = Arc::new(ProjectStore::new(Arc::clone(&storage)));
        let projects_api = ProjectsApi::new(
            project_store,
            SimulatedTransport::new(config.project_latency),
        );

        let task_store = Arc::new(TaskStore::new(storage));
        let tasks_api = TasksApi::new(task_store, SimulatedTransport::new(config.task_latency));

        Self {
            projects: ProjectBoard::new(Arc::new(projects_api), toasts.clone()),
            tasks: TaskBoard::new(Arc::new(tasks_api), toasts.clone()),
            session: Session::new(),
            toasts,
            config,
        }
    }

    /// Resolved configuration.
    #[must_use]
    pub const fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Sign-in state.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Signs in with `values`.
    ///
    /// # Errors
    ///
    /// `VALIDATION_FAILED` (422) with field details if the credentials are
    /// malformed.
    pub fn sign_in(&self, values: &LoginValues) -> Result<(), ApiError> {
        Ok(self.session.login(values)?)
    }

    /// Gate for every project and task operation.
    ///
    /// # Errors
    ///
    /// `UNAUTHORIZED` (401) while signed out.
    pub fn authorize(&self) -> Result<(), ApiError> {
        Ok(self.session.require_auth()?)
    }

    /// Notifications raised by mutations.
    #[must_use]
    pub const fn toasts(&self) -> &ToastCenter {
        &self.toasts
    }

    /// Optimistic project list.
    #[must_use]
    pub const fn projects(&self) -> &ProjectBoard<SharedStorage> {
        &self.projects
    }

    /// Optimistic task lists.
    #[must_use]
    pub const fn tasks(&self) -> &TaskBoard<SharedStorage> {
        &self.tasks
    }

    /// Refreshes the project list and returns the requested page.
    ///
    /// # Errors
    ///
    /// Returns the API error if the list cannot be loaded.
    pub async fn project_page(
        &self,
        query: &ListQuery<ProjectStatus>,
    ) -> Result<Page<ProjectRecord>, ApiError> {
        self.projects.refresh_projects().await?;
        let projects = self.projects.visible_projects().unwrap_or_default();
        Ok(query.apply(&projects, self.config.page_size))
    }

    /// Refreshes the tasks of `project_id` and returns the requested page.
    ///
    /// # Errors
    ///
    /// Returns the API error if the list cannot be loaded.
    pub async fn task_page(
        &self,
        project_id: &str,
        query: &ListQuery<TaskStatus>,
    ) -> Result<Page<TaskRecord>, ApiError> {
        self.tasks.refresh_tasks(project_id).await?;
        let tasks = self.tasks.visible_tasks(project_id).unwrap_or_default();
        Ok(query.apply(&tasks, self.config.page_size))
    }
}
