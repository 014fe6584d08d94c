//! Error types for the store layer.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while reading or writing license records.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Transport-level HTTP failure talking to the REST backend.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The REST backend answered with a non-success status.
    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The backend returned something that does not fit the record schema.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// A store lock was poisoned by a panicking holder.
    #[error("store lock poisoned")]
    Poisoned,

    /// A blocking task failed to complete.
    #[error("background task failed: {0}")]
    Task(String),

    /// Invalid store configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl StoreError {
    /// Returns the HTTP status reported by the REST backend, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Api { status, .. } => Some(*status),
            StoreError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
