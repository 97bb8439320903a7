//! Visible collections keyed by query, with cancellable refreshes.
//!
//! Each key carries a generation counter. A refresh remembers the
//! generation it started under and only writes its result if the counter is
//! unchanged when the fetch completes. [`QueryCache::cancel_refresh`] bumps
//! the counter, so any refresh already in flight for that key is dropped
//! instead of overwriting an optimistic value.

use std::collections::HashMap;
use std::future::Future;

use parking_lot::Mutex;

use crate::api::ApiError;

struct Entry<R> {
    data: Option<Vec<R>>,
    generation: u64,
}

impl<R> Default for Entry<R> {
    fn default() -> Self {
        Self {
            data: None,
            generation: 0,
        }
    }
}

/// Keyed cache of the collections currently shown to the user.
pub struct QueryCache<R> {
    entries: Mutex<HashMap<String, Entry<R>>>,
}

impl<R> Default for QueryCache<R> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<R: Clone> QueryCache<R> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The visible collection for `key`, if one has been loaded.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Vec<R>> {
        self.entries.lock().get(key).and_then(|entry| entry.data.clone())
    }

    /// Replaces the visible collection for `key`.
    pub fn set(&self, key: &str, data: Vec<R>) {
        self.restore(key, Some(data));
    }

    /// Sets the visible collection for `key`, `None` meaning not loaded.
    pub fn restore(&self, key: &str, data: Option<Vec<R>>) {
        self.entries.lock().entry(key.to_string()).or_default().data = data;
    }

    /// Edits the visible collection in place, starting from an empty one if
    /// nothing is loaded.
    pub fn update<F>(&self, key: &str, edit: F)
    where
        F: FnOnce(&mut Vec<R>),
    {
        let mut entries = self.entries.lock();
        let entry = entries.entry(key.to_string()).or_default();
        edit(entry.data.get_or_insert_with(Vec::new));
    }

    /// Discards any refresh of `key` currently in flight.
    pub fn cancel_refresh(&self, key: &str) {
        let mut entries = self.entries.lock();
        let entry = entries.entry(key.to_string()).or_default();
        entry.generation += 1;
        tracing::debug!(key, generation = entry.generation, "refresh cancelled");
    }

    /// Fetches the authoritative collection for `key` and shows it.
    ///
    /// Returns `Ok(false)` when the result was dropped because
    /// [`cancel_refresh`](Self::cancel_refresh) ran while it was in flight.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; the visible collection is left unchanged.
    pub async fn refresh<F>(&self, key: &str, fetch: F) -> Result<bool, ApiError>
    where
        F: Future<Output = Result<Vec<R>, ApiError>>,
    {
        let started = self.generation(key);
        let data = fetch.await?;

        let mut entries = self.entries.lock();
        let entry = entries.entry(key.to_string()).or_default();
        if entry.generation != started {
            tracing::debug!(key, "discarding stale refresh");
            return Ok(false);
        }
        entry.data = Some(data);
        Ok(true)
    }

    fn generation(&self, key: &str) -> u64 {
        self.entries.lock().get(key).map_or(0, |entry| entry.generation)
    }
}
