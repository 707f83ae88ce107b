// file.rs — FileStorage: one JSON file per key under a root directory.
//
// Saves go through a sibling `.tmp` file that is flushed and synced before
// being renamed over the target, so an interrupted write leaves the
// previous snapshot intact.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::StorageError;
use crate::Storage;

/// Directory-backed [`Storage`].
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Create a storage rooted at `root`. The directory is created lazily on
    /// the first save.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding `key`.
    ///
    /// Anything outside `[A-Za-z0-9._-]` is replaced so a profile name can
    /// never escape the root directory.
    pub fn key_path(&self, key: &str) -> PathBuf {
        let sanitized: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{}.json", sanitized.trim_start_matches('.')))
    }
}

impl Storage for FileStorage {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.key_path(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::ReadFailed { path, source }),
        }
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let path = self.key_path(key);
        let write_err = |source| StorageError::WriteFailed {
            path: path.clone(),
            source,
        };

        fs::create_dir_all(&self.root).map_err(|source| StorageError::WriteFailed {
            path: self.root.clone(),
            source,
        })?;

        let temp_path = path.with_extension("json.tmp");
        {
            // The writer and file are dropped (closed) at the end of this
            // block on every path, including the early error returns.
            let file = File::create(&temp_path).map_err(write_err)?;
            let mut writer = BufWriter::new(file);
            writer.write_all(bytes).map_err(write_err)?;
            writer.flush().map_err(write_err)?;
            writer.get_ref().sync_all().map_err(write_err)?;
        }

        if let Err(source) = fs::rename(&temp_path, &path) {
            let _ = fs::remove_file(&temp_path);
            return Err(StorageError::WriteFailed { path, source });
        }

        tracing::trace!(key, path = %path.display(), bytes = bytes.len(), "saved blob");
        Ok(())
    }
}
