//! Key-value blob storage backends.
//!
//! Layout of a [`FileBlobStore`] directory:
//! ```text
//! <key>.json        - one file per key
//! <key>.json.tmp    - transient, renamed over <key>.json on write
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::store::StoreError;

/// Storage capability consumed by the session store.
pub trait BlobStore {
    /// Read the blob under `key`. `Ok(None)` means nothing has been stored yet.
    fn load_blob(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the blob under `key`. Writes are atomic: readers see the old
    /// value or the new one, never a mix.
    fn save_blob(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete the blob under `key`. Returns whether anything was removed.
    fn remove_blob(&mut self, key: &str) -> Result<bool, StoreError>;
}

/// Directory-backed blob store, one JSON file per key.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    /// Open or create a blob store rooted at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File that holds the blob for `key`.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl BlobStore for FileBlobStore {
    fn load_blob(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save_blob(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove_blob(&mut self, key: &str) -> Result<bool, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-memory blob store for tests and headless runs.
///
/// Counts successful writes and can be told to reject writes, which stands
/// in for a full disk or an exceeded quota.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: BTreeMap<String, String>,
    writes: usize,
    reject_writes: bool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `value` under `key`.
    pub fn with_blob(key: &str, value: impl Into<String>) -> Self {
        let mut store = Self::new();
        store.blobs.insert(key.to_string(), value.into());
        store
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.blobs.get(key).map(String::as_str)
    }

    pub fn set_reject_writes(&mut self, reject: bool) {
        self.reject_writes = reject;
    }
}

impl BlobStore for MemoryBlobStore {
    fn load_blob(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.blobs.get(key).cloned())
    }

    fn save_blob(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.reject_writes {
            return Err(StoreError::WriteRejected(key.to_string()));
        }
        self.blobs.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }

    fn remove_blob(&mut self, key: &str) -> Result<bool, StoreError> {
        Ok(self.blobs.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_missing_key_is_absent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileBlobStore::open(tmp.path().join("data")).unwrap();
        assert!(store.root().is_dir());
        assert_eq!(store.load_blob("gameState").unwrap(), None);
    }

    #[test]
    fn file_store_save_and_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("data");
        {
            let mut store = FileBlobStore::open(&path).unwrap();
            store.save_blob("gameState", "first").unwrap();
            store.save_blob("gameState", "second").unwrap();
        }
        let store = FileBlobStore::open(&path).unwrap();
        assert_eq!(store.load_blob("gameState").unwrap().as_deref(), Some("second"));
        assert!(!path.join("gameState.json.tmp").exists());
    }

    #[test]
    fn file_store_remove() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FileBlobStore::open(tmp.path()).unwrap();
        store.save_blob("gameState", "{}").unwrap();
        assert!(store.remove_blob("gameState").unwrap());
        assert!(!store.remove_blob("gameState").unwrap());
        assert_eq!(store.load_blob("gameState").unwrap(), None);
    }

    #[test]
    fn file_store_rejects_path_like_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileBlobStore::open(tmp.path()).unwrap();
        assert!(matches!(
            store.load_blob("../escape"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(store.load_blob(""), Err(StoreError::InvalidKey(_))));
    }

    #[test]
    fn memory_store_counts_writes() {
        let mut store = MemoryBlobStore::new();
        store.save_blob("k", "a").unwrap();
        store.save_blob("k", "b").unwrap();
        assert_eq!(store.writes(), 2);
        assert_eq!(store.get("k"), Some("b"));
    }

    #[test]
    fn memory_store_rejects_when_told() {
        let mut store = MemoryBlobStore::with_blob("k", "old");
        store.set_reject_writes(true);
        assert!(matches!(
            store.save_blob("k", "new"),
            Err(StoreError::WriteRejected(_))
        ));
        assert_eq!(store.get("k"), Some("old"));
        assert_eq!(store.writes(), 0);
    }
}
