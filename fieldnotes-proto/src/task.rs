//! Task records and the values used to create or edit them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::Record;
use crate::status::TaskStatus;
use crate::validation::{FieldErrors, char_len};

/// Minimum title length in characters.
pub const MIN_TASK_TITLE_LENGTH: usize = 2;

/// Minimum description length in characters.
pub const MIN_TASK_DESCRIPTION_LENGTH: usize = 4;

/// Maximum description length in characters.
pub const MAX_TASK_DESCRIPTION_LENGTH: usize = 200;

/// Fallback id base when a title slugifies to nothing.
pub const TASK_ID_FALLBACK: &str = "task";

/// Editable fields of a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskValues {
    /// Task title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Requested status.
    pub status: TaskStatus,
}

impl TaskValues {
    /// Checks title and description bounds.
    ///
    /// # Errors
    ///
    /// Returns every field that is out of bounds.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        validate_fields(&self.title, &self.description)
    }
}

/// Values for a new task; the status defaults to [`TaskStatus::Todo`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaskDraft {
    /// Task title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Initial status, if the caller picked one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
}

impl TaskDraft {
    /// Creates a draft with no explicit status.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            status: None,
        }
    }

    /// Sets the initial status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// The status a task created from this draft starts in.
    #[must_use]
    pub fn resolved_status(&self) -> TaskStatus {
        self.status.unwrap_or_default()
    }

    /// Resolves the draft into complete [`TaskValues`].
    #[must_use]
    pub fn into_values(self) -> TaskValues {
        let status = self.resolved_status();
        TaskValues {
            title: self.title,
            description: self.description,
            status,
        }
    }

    /// Checks title and description bounds.
    ///
    /// # Errors
    ///
    /// Returns every field that is out of bounds.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        validate_fields(&self.title, &self.description)
    }
}

impl From<TaskValues> for TaskDraft {
    fn from(values: TaskValues) -> Self {
        Self {
            title: values.title,
            description: values.description,
            status: Some(values.status),
        }
    }
}

fn validate_fields(title: &str, description: &str) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::default();
    errors.check(
        char_len(title) >= MIN_TASK_TITLE_LENGTH,
        "title",
        "Task title is required",
    );
    let len = char_len(description);
    errors.check(
        len >= MIN_TASK_DESCRIPTION_LENGTH,
        "description",
        "Description must be at least 4 characters",
    );
    errors.check(
        len <= MAX_TASK_DESCRIPTION_LENGTH,
        "description",
        "Description must be at most 200 characters",
    );
    errors.into_result()
}

/// A persisted task.
///
/// `id` never changes after creation and `updated_at >= created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    /// Unique slug id.
    pub id: String,
    /// Owning project id.
    pub project_id: String,
    /// Task title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Current status.
    pub status: TaskStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    /// The editable fields of this record.
    #[must_use]
    pub fn values(&self) -> TaskValues {
        TaskValues {
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
        }
    }

    /// Returns a copy with `values` applied and `updated_at` bumped.
    ///
    /// `updated_at` never moves before `created_at`.
    #[must_use]
    pub fn with_values(&self, values: TaskValues, now: DateTime<Utc>) -> Self {
        Self {
            title: values.title,
            description: values.description,
            status: values.status,
            updated_at: now.max(self.created_at),
            ..self.clone()
        }
    }

    /// Returns a copy with only `status` and `updated_at` changed.
    #[must_use]
    pub fn with_status(&self, status: TaskStatus, now: DateTime<Utc>) -> Self {
        Self {
            status,
            updated_at: now.max(self.created_at),
            ..self.clone()
        }
    }
}

impl Record for TaskRecord {
    fn id(&self) -> &str {
        &self.id
    }
}
