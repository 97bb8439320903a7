//! Typed record collections persisted under a single storage key.
//!
//! # Merge-on-load
//!
//! Loading starts from the built-in seed collection and overlays every
//! persisted record by id: persisted values win on collision, seed records
//! missing from storage are kept. Seed records therefore survive a cleared
//! or partially written store while edits to them still show.
//!
//! A missing value, malformed JSON, a non-array document, or an empty array
//! all load as the plain seed collection.

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use fieldnotes_proto::codec;
use fieldnotes_proto::ids::Record;

use super::{Storage, StorageError};

/// A record collection stored as a JSON array under `key`.
pub struct SeededCollection<S, R> {
    storage: S,
    key: String,
    seed: Vec<R>,
}

impl<S, R> SeededCollection<S, R>
where
    S: Storage,
    R: Record + Clone + Serialize + DeserializeOwned,
{
    /// Creates a collection over `storage` with the given key and seed.
    pub fn new(storage: S, key: impl Into<String>, seed: Vec<R>) -> Self {
        Self {
            storage,
            key: key.into(),
            seed,
        }
    }

    /// Loads the collection, merged over the seed.
    ///
    /// Never fails: read errors and undecodable data are logged and the
    /// seed collection is returned instead.
    #[must_use]
    pub fn load(&self) -> Vec<R> {
        let raw = match self.storage.get_item(&self.key) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "storage read failed, using seed data");
                None
            }
        };

        let Some(stored) = codec::safe_decode::<R>(raw.as_deref()) else {
            if raw.is_some() {
                tracing::warn!(key = %self.key, "stored collection is not a record array, using seed data");
            }
            return self.seed.clone();
        };

        if stored.is_empty() {
            return self.seed.clone();
        }
        merge_with_seed(&self.seed, stored)
    }

    /// Persists the full collection, replacing what was stored.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if encoding or the storage write fails.
    pub fn save(&self, records: &[R]) -> Result<(), StorageError> {
        let raw = codec::encode(records).map_err(|e| StorageError::WriteFailed(e.to_string()))?;
        self.storage.set_item(&self.key, &raw)?;
        tracing::debug!(key = %self.key, records = records.len(), "collection saved");
        Ok(())
    }

    /// Drops the persisted collection so the next load returns the seed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the storage write fails.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_item(&self.key)
    }
}

/// Overlays `stored` on `seed` by id.
///
/// Seed order is kept; a stored record replaces the seed record with the
/// same id in place, and stored records with new ids are appended in their
/// stored order.
#[must_use]
pub fn merge_with_seed<R: Record + Clone>(seed: &[R], stored: Vec<R>) -> Vec<R> {
    let mut merged: Vec<R> = seed.to_vec();
    let mut positions: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, r)| (r.id().to_string(), i))
        .collect();

    for record in stored {
        if let Some(&i) = positions.get(record.id()) {
            merged[i] = record;
        } else {
            positions.insert(record.id().to_string(), merged.len());
            merged.push(record);
        }
    }
    merged
}
