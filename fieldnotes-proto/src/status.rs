//! Task status and the rules governing status transitions.
//!
//! Statuses form a fixed linear order `todo -> doing -> done`. A task may
//! stay where it is or move exactly one step in either direction; skipping
//! a step (`todo -> done`) is never allowed. There is no terminal status.

use serde::{Deserialize, Serialize};

/// Status of a task, ordered by position in [`TaskStatus::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// Not started yet.
    Todo,
    /// Actively being worked on.
    Doing,
    /// Finished (may be reopened to `doing`).
    Done,
}

impl TaskStatus {
    /// Every status in transition order.
    pub const ALL: [Self; 3] = [Self::Todo, Self::Doing, Self::Done];

    /// Position of this status in [`TaskStatus::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Todo => 0,
            Self::Doing => 1,
            Self::Done => 2,
        }
    }

    /// Status at the given position, if any.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Wire name used in persisted records and query parameters.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Done => "done",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Todo => "Todo",
            Self::Doing => "Doing",
            Self::Done => "Done",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::ALL[0]
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown task status: {0}")]
pub struct UnknownStatus(pub String);

impl std::str::FromStr for TaskStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// Returns the statuses one position before and after `status`, in order,
/// omitting neighbours that fall outside the range.
#[must_use]
pub fn adjacent_statuses(status: TaskStatus) -> Vec<TaskStatus> {
    let index = status.index();
    let previous = index.checked_sub(1).and_then(TaskStatus::from_index);
    let next = TaskStatus::from_index(index + 1);
    previous.into_iter().chain(next).collect()
}

/// Returns `status` followed by its adjacent statuses.
#[must_use]
pub fn allowed_statuses(status: TaskStatus) -> Vec<TaskStatus> {
    std::iter::once(status)
        .chain(adjacent_statuses(status))
        .collect()
}

/// Whether a task may move from `from` to `to`.
///
/// True iff the statuses are equal or adjacent.
#[must_use]
pub fn can_transition(from: TaskStatus, to: TaskStatus) -> bool {
    from == to || adjacent_statuses(from).contains(&to)
}
