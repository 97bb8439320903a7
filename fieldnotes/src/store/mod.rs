//! Record stores for projects and tasks.
//!
//! Each store owns a [`SeededCollection`](crate::storage::SeededCollection)
//! and works copy-on-write: an operation receives the current collection,
//! computes a new one, persists it whole and returns it. A failed operation
//! persists nothing.
//!
//! Nothing serializes two callers: concurrent read-modify-write cycles on
//! the same storage can lose a write (last writer wins per collection).

pub mod projects;
pub mod seed;
pub mod tasks;

pub use projects::ProjectStore;
pub use tasks::TaskStore;

use fieldnotes_proto::status::TaskStatus;
use fieldnotes_proto::validation::FieldErrors;

use crate::storage::StorageError;

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The submitted values failed validation.
    #[error("invalid values: {0}")]
    Validation(#[from] FieldErrors),

    /// The status change skips a step in the task lifecycle.
    #[error("Invalid task status transition.")]
    InvalidTransition {
        /// Current status.
        from: TaskStatus,
        /// Rejected target status.
        to: TaskStatus,
    },

    /// The collection could not be persisted.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}
