// memory.rs — MemoryStorage: an in-process Storage for headless runs.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::StorageError;
use crate::Storage;

/// [`Storage`] backed by a map. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStorage {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a blob, e.g. to simulate a corrupt snapshot.
    pub fn insert(&self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        if let Ok(mut blobs) = self.blobs.lock() {
            blobs.insert(key.into(), bytes.into());
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.blobs
            .lock()
            .map(|blobs| blobs.contains_key(key))
            .unwrap_or(false)
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let blobs = self
            .blobs
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(blobs.get(key).cloned())
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        blobs.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}
