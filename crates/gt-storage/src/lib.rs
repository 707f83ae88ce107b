//! # gt-storage
//!
//! Blob storage for Goal Tracker state.
//!
//! The host application owns persistence; the tracker only sees the
//! [`Storage`] trait: `load(key)` and `save(key, bytes)`. Keys are scoped to
//! an account profile with [`profile_key`] so that switching accounts never
//! mixes goal lists.
//!
//! - [`FileStorage`] — one JSON file per key, replaced atomically on save
//! - [`MemoryStorage`] — in-process map for headless runs and tests

pub mod error;
pub mod file;
pub mod memory;

pub use error::StorageError;
pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Key/blob persistence supplied by the host.
///
/// `Send + Sync` so one handle can be shared (behind an `Arc`) by the goal
/// manager and the item cache.
pub trait Storage: Send + Sync {
    /// Read the blob stored under `key`. `Ok(None)` when nothing was saved yet.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Replace the blob stored under `key`.
    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;
}

/// Build the storage key for `name` inside an optional account profile.
pub fn profile_key(profile: Option<&str>, name: &str) -> String {
    match profile {
        Some(profile) if !profile.is_empty() => format!("{}.{}", profile, name),
        _ => name.to_string(),
    }
}
