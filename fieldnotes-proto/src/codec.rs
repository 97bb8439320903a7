//! JSON encoding for persisted record collections.
//!
//! A collection is stored as a JSON array of records. There is no schema
//! version; anything that does not decode as an array of records is treated
//! as absent by [`safe_decode`].

use serde::Serialize;
use serde::de::DeserializeOwned;

/// Error type for collection encode/decode operations.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Encodes a collection as a JSON array.
///
/// # Errors
///
/// Returns `CodecError::Serialization` if a record cannot be serialized.
pub fn encode<R: Serialize>(records: &[R]) -> Result<String, CodecError> {
    Ok(serde_json::to_string(records)?)
}

/// Decodes a JSON array of records.
///
/// # Errors
///
/// Returns `CodecError::Serialization` for malformed JSON, a non-array
/// document, or any element that is not a valid record.
pub fn decode<R: DeserializeOwned>(raw: &str) -> Result<Vec<R>, CodecError> {
    Ok(serde_json::from_str(raw)?)
}

/// Decodes a stored value, mapping every failure (and a missing value)
/// to `None`.
#[must_use]
pub fn safe_decode<R: DeserializeOwned>(raw: Option<&str>) -> Option<Vec<R>> {
    decode(raw?).ok()
}
