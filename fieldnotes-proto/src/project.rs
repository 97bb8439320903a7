//! Project records and the values used to create or edit them.
//!
//! Unlike tasks, project status has no transition rule: any status may be
//! set from any other.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::Record;
use crate::validation::{FieldErrors, char_len, is_email};

/// Minimum project name length in characters.
pub const MIN_PROJECT_NAME_LENGTH: usize = 2;

/// Minimum description length in characters.
pub const MIN_PROJECT_DESCRIPTION_LENGTH: usize = 10;

/// Maximum description length in characters.
pub const MAX_PROJECT_DESCRIPTION_LENGTH: usize = 240;

/// Fallback id base when a name slugifies to nothing.
pub const PROJECT_ID_FALLBACK: &str = "project";

/// Lifecycle label of a project. Unordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProjectStatus {
    /// Not started.
    #[default]
    Planned,
    /// Work under way.
    #[serde(rename = "In progress")]
    InProgress,
    /// Awaiting review.
    #[serde(rename = "In review")]
    InReview,
    /// Finished.
    Done,
}

impl ProjectStatus {
    /// Every status, in display order.
    pub const ALL: [Self; 4] = [Self::Planned, Self::InProgress, Self::InReview, Self::Done];

    /// Display and wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "Planned",
            Self::InProgress => "In progress",
            Self::InReview => "In review",
            Self::Done => "Done",
        }
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown project status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown project status: {0}")]
pub struct UnknownProjectStatus(pub String);

impl std::str::FromStr for ProjectStatus {
    type Err = UnknownProjectStatus;

    /// Accepts the display name case-insensitively, with `-`/`_` standing in
    /// for spaces (`in-progress`, `IN_REVIEW`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['-', '_'], " ");
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| UnknownProjectStatus(s.to_string()))
    }
}

/// Editable fields of a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectValues {
    /// Display name.
    pub name: String,
    /// Current status.
    #[serde(default)]
    pub status: ProjectStatus,
    /// Contact address of the owner.
    pub owner_email: String,
    /// Summary of the project.
    pub description: String,
}

impl ProjectValues {
    /// Checks name, owner email and description.
    ///
    /// # Errors
    ///
    /// Returns every field that failed.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        errors.check(
            char_len(&self.name) >= MIN_PROJECT_NAME_LENGTH,
            "name",
            "Project name is required",
        );
        if self.owner_email.trim().is_empty() {
            errors.check(false, "ownerEmail", "Owner email is required");
        } else {
            errors.check(
                is_email(&self.owner_email),
                "ownerEmail",
                "Enter a valid email address",
            );
        }
        let len = char_len(&self.description);
        errors.check(
            len >= MIN_PROJECT_DESCRIPTION_LENGTH,
            "description",
            "Description must be at least 10 characters",
        );
        errors.check(
            len <= MAX_PROJECT_DESCRIPTION_LENGTH,
            "description",
            "Description must be at most 240 characters",
        );
        errors.into_result()
    }
}

/// A persisted project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRecord {
    /// Unique slug id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Current status.
    pub status: ProjectStatus,
    /// Contact address of the owner.
    pub owner_email: String,
    /// Summary of the project.
    pub description: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl ProjectRecord {
    /// The editable fields of this record.
    #[must_use]
    pub fn values(&self) -> ProjectValues {
        ProjectValues {
            name: self.name.clone(),
            status: self.status,
            owner_email: self.owner_email.clone(),
            description: self.description.clone(),
        }
    }

    /// Returns a copy with `values` applied and `updated_at` bumped.
    #[must_use]
    pub fn with_values(&self, values: ProjectValues, now: DateTime<Utc>) -> Self {
        Self {
            name: values.name,
            status: values.status,
            owner_email: values.owner_email,
            description: values.description,
            updated_at: now.max(self.created_at),
            ..self.clone()
        }
    }
}

impl Record for ProjectRecord {
    fn id(&self) -> &str {
        &self.id
    }
}
