//! Error types for regstore-core

use thiserror::Error;

use crate::contract::StoreError;

/// Everything a codec operation can fail with.
///
/// A missing document is not in here: lookups return `Ok(None)` for that.
#[derive(Debug, Error)]
pub enum MappingError {
    /// Caller handed over something that breaks the input contract
    /// (a regulation node without a label path, a layer entry without `label`).
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A stored document or search hit does not have the shape its type requires.
    #[error("malformed stored document {id}: {reason}")]
    MalformedDocument { id: String, reason: String },

    /// Backend failure, passed through untouched.
    #[error("store failure: {0}")]
    Store(#[source] StoreError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl MappingError {
    pub fn malformed_input(message: impl Into<String>) -> Self {
        MappingError::MalformedInput(message.into())
    }

    pub fn malformed_document(id: impl Into<String>, reason: impl Into<String>) -> Self {
        MappingError::MalformedDocument {
            id: id.into(),
            reason: reason.into(),
        }
    }
}

impl From<StoreError> for MappingError {
    fn from(err: StoreError) -> Self {
        MappingError::Store(err)
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, MappingError>;
