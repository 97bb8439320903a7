//! Optimistic mutations over the simulated API.
//!
//! A mutation runs in two halves:
//!
//! 1. `begin_*` on a board is synchronous. It cancels any refresh of the
//!    affected collection, snapshots it, and splices in a tentative record
//!    (prepended for creates, replaced in place for edits and moves). The
//!    change is visible as soon as `begin_*` returns.
//! 2. [`PendingMutation::settle`] dispatches the API call. On success the
//!    tentative record is replaced by the authoritative one; on failure the
//!    snapshot is restored exactly and an error toast carries the message.
//!    Either way a background refresh of the collection follows.
//!
//! Mutations on different records may settle in any order. Mutations on the
//! same record are not queued: the last one to settle wins.

pub mod cache;
pub mod projects;
pub mod tasks;

use std::sync::Arc;

use futures_util::future::BoxFuture;

use fieldnotes_proto::ids::Record;

pub use cache::QueryCache;
pub use projects::ProjectBoard;
pub use tasks::TaskBoard;

use crate::api::ApiError;
use crate::notify::ToastCenter;

/// Record a mutation is aimed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A record being created, known by its temporary id.
    Tentative(String),
    /// An existing record, known by its id.
    Existing(String),
}

impl Target {
    /// Id the visible collection holds for the target.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Tentative(id) | Self::Existing(id) => id,
        }
    }
}

/// Snapshot and target of one optimistic mutation.
///
/// Lives from `begin_*` until the mutation settles; never persisted.
#[derive(Debug, Clone)]
pub struct MutationAttempt<R> {
    key: String,
    target: Target,
    snapshot: Option<Vec<R>>,
}

impl<R: Record + Clone> MutationAttempt<R> {
    /// Cancels refreshes of `key` and snapshots its visible collection.
    pub fn begin(cache: &QueryCache<R>, key: impl Into<String>, target: Target) -> Self {
        let key = key.into();
        cache.cancel_refresh(&key);
        let snapshot = cache.get(&key);
        Self {
            key,
            target,
            snapshot,
        }
    }

    /// Cache key of the affected collection.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The record being mutated.
    #[must_use]
    pub const fn target(&self) -> &Target {
        &self.target
    }

    /// The collection as it was before the mutation.
    #[must_use]
    pub fn snapshot(&self) -> Option<&[R]> {
        self.snapshot.as_deref()
    }

    /// Shows `tentative` in the visible collection.
    ///
    /// Creates are prepended; edits replace the record with the target id
    /// and are skipped if it is not visible.
    pub fn apply(&self, cache: &QueryCache<R>, tentative: R) {
        cache.update(&self.key, |records| match &self.target {
            Target::Tentative(_) => records.insert(0, tentative),
            Target::Existing(id) => {
                if let Some(slot) = records.iter_mut().find(|r| r.id() == id) {
                    *slot = tentative;
                }
            }
        });
        tracing::debug!(key = %self.key, record_id = self.target.id(), "optimistic change applied");
    }

    /// Replaces the tentative record with the authoritative one.
    ///
    /// A created record no longer visible (for instance after a refresh
    /// landed) is prepended again.
    pub fn reconcile(&self, cache: &QueryCache<R>, authoritative: R) {
        cache.update(&self.key, |records| {
            let id = self.target.id();
            if let Some(slot) = records.iter_mut().find(|r| r.id() == id) {
                *slot = authoritative;
            } else if matches!(self.target, Target::Tentative(_))
                && !records.iter().any(|r| r.id() == authoritative.id())
            {
                records.insert(0, authoritative);
            }
        });
        tracing::debug!(key = %self.key, record_id = self.target.id(), "optimistic change reconciled");
    }

    /// Restores the visible collection to the snapshot.
    pub fn rollback(&self, cache: &QueryCache<R>) {
        cache.restore(&self.key, self.snapshot.clone());
        tracing::debug!(key = %self.key, record_id = self.target.id(), "optimistic change rolled back");
    }
}

/// Toast titles for the outcome of a mutation.
#[derive(Debug, Clone, Copy)]
pub struct Outcome {
    /// Title of the success toast.
    pub success: &'static str,
    /// Title of the error toast.
    pub failure: &'static str,
}

/// An applied optimistic change whose API call has not run yet.
#[must_use = "the API call only runs when the mutation is settled"]
pub struct PendingMutation<R> {
    attempt: MutationAttempt<R>,
    cache: Arc<QueryCache<R>>,
    toasts: ToastCenter,
    outcome: Outcome,
    dispatch: BoxFuture<'static, Result<R, ApiError>>,
    refresh: BoxFuture<'static, Result<Vec<R>, ApiError>>,
}

impl<R> PendingMutation<R>
where
    R: Record + Clone + Send + Sync + 'static,
{
    pub(crate) fn new(
        attempt: MutationAttempt<R>,
        cache: Arc<QueryCache<R>>,
        toasts: ToastCenter,
        outcome: Outcome,
        dispatch: BoxFuture<'static, Result<R, ApiError>>,
        refresh: BoxFuture<'static, Result<Vec<R>, ApiError>>,
    ) -> Self {
        Self {
            attempt,
            cache,
            toasts,
            outcome,
            dispatch,
            refresh,
        }
    }

    /// The attempt behind this mutation.
    pub const fn attempt(&self) -> &MutationAttempt<R> {
        &self.attempt
    }

    /// Dispatches the API call and reconciles or rolls back.
    ///
    /// A refresh of the collection is spawned on the current runtime once
    /// the outcome is applied.
    ///
    /// # Errors
    ///
    /// Returns the normalized API error after rolling back.
    pub async fn settle(self) -> Result<R, ApiError> {
        let Self {
            attempt,
            cache,
            toasts,
            outcome,
            dispatch,
            refresh,
        } = self;

        let result = dispatch.await;
        match &result {
            Ok(record) => {
                attempt.reconcile(&cache, record.clone());
                toasts.success(outcome.success);
            }
            Err(err) => {
                attempt.rollback(&cache);
                toasts.error(outcome.failure, err.display_message());
            }
        }

        let key = attempt.key;
        tokio::spawn(async move {
            if let Err(e) = cache.refresh(&key, refresh).await {
                tracing::warn!(key = %key, error = %e, "background refresh failed");
            }
        });

        result
    }
}

/// Temporary id for a record that has not been created yet.
pub(crate) fn temp_id(sequence: u64) -> String {
    format!("temp-{}-{sequence}", chrono::Utc::now().timestamp_millis())
}
