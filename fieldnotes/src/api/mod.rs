//! Simulated remote API over the record stores.
//!
//! Every call runs its store operation through a [`Transport`], which adds
//! latency in the default [`SimulatedTransport`]. Failures leave this layer
//! only as [`ApiError`]: store errors are normalized exactly once, here.

pub mod projects;
pub mod tasks;
pub mod transport;

use std::fmt;
use std::time::Duration;

use serde::Serialize;

pub use projects::ProjectsApi;
pub use tasks::TasksApi;
pub use transport::{SimulatedTransport, Transport};

use fieldnotes_proto::validation::FieldErrors;

use crate::session::SessionError;
use crate::store::StoreError;

/// Default latency of project calls.
pub const PROJECT_LATENCY: Duration = Duration::from_millis(300);

/// Default latency of task calls.
pub const TASK_LATENCY: Duration = Duration::from_millis(700);

/// Message shown when an error carries no message of its own.
pub const FALLBACK_ERROR_MESSAGE: &str = "Something went wrong.";

/// Machine-readable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No project with the requested id.
    ProjectNotFound,
    /// A project update could not be read back.
    ProjectUpdateFailed,
    /// No task with the requested id.
    TaskNotFound,
    /// The requested status skips a step.
    TaskStatusInvalid,
    /// A task update could not be read back.
    TaskUpdateFailed,
    /// A task move could not be read back.
    TaskMoveFailed,
    /// Submitted values failed validation.
    ValidationFailed,
    /// Persisting the collection failed.
    StorageFailed,
    /// The call needs a signed-in session.
    Unauthorized,
}

impl ErrorCode {
    /// Wire name of the code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ProjectNotFound => "PROJECT_NOT_FOUND",
            Self::ProjectUpdateFailed => "PROJECT_UPDATE_FAILED",
            Self::TaskNotFound => "TASK_NOT_FOUND",
            Self::TaskStatusInvalid => "TASK_STATUS_INVALID",
            Self::TaskUpdateFailed => "TASK_UPDATE_FAILED",
            Self::TaskMoveFailed => "TASK_MOVE_FAILED",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::StorageFailed => "STORAGE_FAILED",
            Self::Unauthorized => "UNAUTHORIZED",
        }
    }

    /// HTTP-style status paired with the code.
    #[must_use]
    pub const fn status(self) -> u16 {
        match self {
            Self::ProjectNotFound | Self::TaskNotFound => 404,
            Self::TaskStatusInvalid => 400,
            Self::Unauthorized => 401,
            Self::ValidationFailed => 422,
            Self::ProjectUpdateFailed
            | Self::TaskUpdateFailed
            | Self::TaskMoveFailed
            | Self::StorageFailed => 500,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized error returned by every API call.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    /// User-facing message.
    pub message: String,
    /// HTTP-style status, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Machine-readable code, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    /// Extra structured context (field errors for validation failures).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// An error with only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
            code: None,
            details: None,
        }
    }

    /// An error with a code and the status that goes with it.
    pub fn with_code(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: Some(code.status()),
            code: Some(code),
            ..Self::new(message)
        }
    }

    /// Attaches structured details.
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    /// The message, or `fallback` when it is blank.
    #[must_use]
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        if self.message.trim().is_empty() {
            fallback
        } else {
            &self.message
        }
    }

    /// The message, or [`FALLBACK_ERROR_MESSAGE`] when it is blank.
    #[must_use]
    pub fn display_message(&self) -> &str {
        self.message_or(FALLBACK_ERROR_MESSAGE)
    }

    /// Whether the error carries `code`.
    #[must_use]
    pub fn is(&self, code: ErrorCode) -> bool {
        self.code == Some(code)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(errors) => validation_failed(&errors),
            StoreError::InvalidTransition { .. } => {
                Self::with_code(ErrorCode::TaskStatusInvalid, "Status change not allowed.")
            }
            StoreError::Storage(e) => Self::with_code(ErrorCode::StorageFailed, e.to_string()),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Invalid(errors) => validation_failed(&errors),
            SessionError::SignedOut => Self::with_code(ErrorCode::Unauthorized, "Sign in to continue."),
        }
    }
}

fn validation_failed(errors: &FieldErrors) -> ApiError {
    let err = ApiError::with_code(ErrorCode::ValidationFailed, errors.to_string());
    match serde_json::to_value(errors) {
        Ok(details) => err.with_details(details),
        Err(_) => err,
    }
}

impl From<String> for ApiError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for ApiError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}
