//! Error types for storage backends

use std::path::PathBuf;

use thiserror::Error;

/// Errors a storage backend can report
///
/// These never reach callers of the learner-state accessors; [`super::Storage`]
/// degrades them to defaults. They surface only through
/// [`super::Storage::try_write`] and the backup import path.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No backend is attached to this storage
    #[error("No persistent store available")]
    Unavailable,

    /// Reading or writing the backing file failed
    #[error("I/O error on {path:?}: {source}")]
    Io {
        /// File that was being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The key cannot be used as a file name
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    /// The backend refused the write (e.g. over quota)
    #[error("Write rejected: {0}")]
    Rejected(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
