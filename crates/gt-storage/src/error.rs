// error.rs — Error types for blob storage.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a [`Storage`](crate::Storage) backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading a stored blob failed.
    #[error("failed to read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Writing or replacing a stored blob failed.
    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The backend cannot be used right now (e.g. a poisoned lock).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
