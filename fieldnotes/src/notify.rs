//! User-visible notifications.
//!
//! Toasts are queued in a [`ToastCenter`] shared by clone. A toast with a
//! non-zero duration is removed by a timer on the tokio runtime; a zero
//! duration keeps it until [`ToastCenter::dismiss`] is called. Outside a
//! runtime no timer is scheduled.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

/// Default display time of a toast.
pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(4000);

/// Unique toast identifier (`UUIDv7`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ToastId(Uuid);

impl ToastId {
    fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Visual tone of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastTone {
    /// Informational.
    #[default]
    Neutral,
    /// An operation succeeded.
    Success,
    /// An operation failed.
    Error,
}

/// A queued toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Toast {
    /// Identifier used to dismiss the toast.
    pub id: ToastId,
    /// Headline.
    pub title: String,
    /// Optional body text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Visual tone.
    pub tone: ToastTone,
}

/// What to show in a new toast.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ToastOptions {
    title: String,
    description: Option<String>,
    tone: ToastTone,
    duration: Option<Duration>,
}

impl ToastOptions {
    /// A neutral toast with `title`.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the body text.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the tone.
    #[must_use]
    pub const fn tone(mut self, tone: ToastTone) -> Self {
        self.tone = tone;
        self
    }

    /// Overrides the display time; zero keeps the toast until dismissed.
    #[must_use]
    pub const fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// Shared toast queue.
#[derive(Debug, Clone)]
pub struct ToastCenter {
    toasts: Arc<Mutex<Vec<Toast>>>,
    default_duration: Duration,
}

impl Default for ToastCenter {
    fn default() -> Self {
        Self::new(DEFAULT_TOAST_DURATION)
    }
}

impl ToastCenter {
    /// Creates an empty queue whose toasts last `default_duration`.
    #[must_use]
    pub fn new(default_duration: Duration) -> Self {
        Self {
            toasts: Arc::new(Mutex::new(Vec::new())),
            default_duration,
        }
    }

    /// Queues a toast and schedules its removal.
    pub fn push(&self, options: ToastOptions) -> ToastId {
        let id = ToastId::new();
        let duration = options.duration.unwrap_or(self.default_duration);
        tracing::debug!(toast_id = %id, tone = ?options.tone, title = %options.title, "toast queued");

        self.toasts.lock().push(Toast {
            id,
            title: options.title,
            description: options.description,
            tone: options.tone,
        });

        if !duration.is_zero()
            && let Ok(handle) = tokio::runtime::Handle::try_current()
        {
            let center = self.clone();
            handle.spawn(async move {
                tokio::time::sleep(duration).await;
                center.dismiss(id);
            });
        }
        id
    }

    /// Queues a success toast.
    pub fn success(&self, title: impl Into<String>) -> ToastId {
        self.push(ToastOptions::new(title).tone(ToastTone::Success))
    }

    /// Queues an error toast with a description.
    pub fn error(&self, title: impl Into<String>, description: impl Into<String>) -> ToastId {
        self.push(
            ToastOptions::new(title)
                .description(description)
                .tone(ToastTone::Error),
        )
    }

    /// Removes a toast. Returns `false` if it was already gone.
    pub fn dismiss(&self, id: ToastId) -> bool {
        let mut toasts = self.toasts.lock();
        let before = toasts.len();
        toasts.retain(|toast| toast.id != id);
        toasts.len() != before
    }

    /// Current toasts, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Toast> {
        self.toasts.lock().clone()
    }

    /// Number of queued toasts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.toasts.lock().len()
    }

    /// Whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.toasts.lock().is_empty()
    }
}
