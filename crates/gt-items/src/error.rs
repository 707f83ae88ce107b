// error.rs — Error types for the item cache.

use thiserror::Error;

/// Errors raised while loading or persisting the item cache.
#[derive(Debug, Error)]
pub enum ItemCacheError {
    /// The backing storage failed.
    #[error("item cache storage error: {0}")]
    Storage(#[from] gt_storage::StorageError),

    /// The persisted cache is not valid JSON for the expected document.
    #[error("item cache is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The persisted cache was written by an incompatible version.
    #[error("unsupported item cache version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}
