//! Error types for the zenstudy library.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the persistent key-value store.
///
/// Callers inside the app treat these as best-effort failures: they are
/// logged and the in-memory state carries on.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the state database
    #[error("Failed to open state database at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query or write against the state database failed
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A value could not be encoded as JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors (creating the state directory)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
