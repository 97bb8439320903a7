//! Project store. Project status changes are unrestricted.

use chrono::Utc;

use fieldnotes_proto::ids::id_for;
use fieldnotes_proto::project::{PROJECT_ID_FALLBACK, ProjectRecord, ProjectValues};

use super::StoreError;
use super::seed::{PROJECTS_KEY, default_projects};
use crate::storage::{SeededCollection, Storage};

/// Authoritative project collection.
pub struct ProjectStore<S> {
    collection: SeededCollection<S, ProjectRecord>,
}

impl<S: Storage> ProjectStore<S> {
    /// Creates a store with the default seed projects.
    pub fn new(storage: S) -> Self {
        Self::with_seed(storage, default_projects(Utc::now()))
    }

    /// Creates a store with a custom seed collection.
    pub fn with_seed(storage: S, seed: Vec<ProjectRecord>) -> Self {
        Self {
            collection: SeededCollection::new(storage, PROJECTS_KEY, seed),
        }
    }

    /// Loads every project, merged over the seed.
    #[must_use]
    pub fn load(&self) -> Vec<ProjectRecord> {
        self.collection.load()
    }

    /// Persists `projects` as the whole collection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] if the write fails.
    pub fn save(&self, projects: &[ProjectRecord]) -> Result<(), StoreError> {
        Ok(self.collection.save(projects)?)
    }

    /// Looks up a project; `None` ids never match.
    #[must_use]
    pub fn get_by_id(&self, id: Option<&str>) -> Option<ProjectRecord> {
        let id = id.filter(|id| !id.is_empty())?;
        self.load().into_iter().find(|project| project.id == id)
    }

    /// Creates a project and prepends it to `projects`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] if the values fail validation, or
    /// [`StoreError::Storage`] if the new collection cannot be persisted.
    pub fn create(
        &self,
        values: ProjectValues,
        projects: &[ProjectRecord],
    ) -> Result<(ProjectRecord, Vec<ProjectRecord>), StoreError> {
        values.validate()?;

        let now = Utc::now();
        let project = ProjectRecord {
            id: id_for(&values.name, PROJECT_ID_FALLBACK, projects),
            name: values.name,
            status: values.status,
            owner_email: values.owner_email,
            description: values.description,
            created_at: now,
            updated_at: now,
        };

        let next: Vec<ProjectRecord> = std::iter::once(project.clone())
            .chain(projects.iter().cloned())
            .collect();
        self.save(&next)?;

        tracing::debug!(project_id = %project.id, status = %project.status, "project created");
        Ok((project, next))
    }

    /// Replaces the editable fields of project `id`.
    ///
    /// An unknown id leaves the collection unchanged and writes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Validation`] for invalid values or
    /// [`StoreError::Storage`] if the write fails.
    pub fn update(
        &self,
        id: &str,
        values: ProjectValues,
        projects: &[ProjectRecord],
    ) -> Result<Vec<ProjectRecord>, StoreError> {
        values.validate()?;

        let Some(index) = projects.iter().position(|project| project.id == id) else {
            tracing::debug!(project_id = id, "project not in collection, nothing to change");
            return Ok(projects.to_vec());
        };

        let mut next = projects.to_vec();
        next[index] = projects[index].with_values(values, Utc::now());
        self.save(&next)?;

        tracing::debug!(project_id = id, status = %next[index].status, "project updated");
        Ok(next)
    }
}
