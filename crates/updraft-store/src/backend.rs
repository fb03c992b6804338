use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use crate::error::{Result, StoreError};

/// Keyed storage of opaque blobs.
///
/// `set` replaces the whole value atomically; readers never observe a
/// partially written blob.
pub trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Removes `key`. Removing a missing key is not an error.
    fn delete(&self, key: &str) -> Result<()>;
}

impl<S: StateStore + ?Sized> StateStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> { (**self).get(key) }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> { (**self).set(key, value) }

    fn delete(&self, key: &str) -> Result<()> { (**self).delete(key) }
}

/// In-process store, mostly for tests and short-lived clients.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(key);
        Ok(())
    }
}

/// One file per key inside a directory.
///
/// File names are the hex SHA-256 of the key, so any key (typically a
/// download URL) maps to a safe name.
#[derive(Debug, Clone)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    pub fn root(&self) -> &Path { &self.root }

    pub fn path_for(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.root.join(format!("{}.resume", hex::encode(digest)))
    }

    fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + '_ {
        move |source| StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl StateStore for DirStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Self::io_error(&path)(e)),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.root).map_err(Self::io_error(&self.root))?;

        let path = self.path_for(key);
        let mut tmp = tempfile::NamedTempFile::new_in(&self.root).map_err(Self::io_error(&self.root))?;
        tmp.write_all(value).map_err(Self::io_error(tmp.path()))?;
        tmp.as_file().sync_all().map_err(Self::io_error(&path))?;
        tmp.persist(&path)
            .map_err(|e| Self::io_error(&path)(e.error))?;

        trace!(key, path = %path.display(), "stored record");
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!(key, "removed record");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Self::io_error(&path)(e)),
        }
    }
}

/// Embedded key-value store backed by sled.
#[derive(Debug, Clone)]
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = sled::open(path)?;
        Ok(Self { db })
    }

    pub fn from_db(db: sled::Db) -> Self { Self { db } }

    pub fn flush(&self) -> Result<()> {
        self.db.flush()?;
        Ok(())
    }

    fn db_key(key: &str) -> Vec<u8> { format!("resume:{key}").into_bytes() }
}

impl StateStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.db.get(Self::db_key(key))?.map(|value| value.to_vec()))
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.db.insert(Self::db_key(key), value)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.db.remove(Self::db_key(key))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn exercise(store: &dyn StateStore) {
        assert_eq!(store.get("http://x/file").unwrap(), None);

        store.set("http://x/file", b"one").unwrap();
        assert_eq!(store.get("http://x/file").unwrap(), Some(b"one".to_vec()));

        store.set("http://x/file", b"two").unwrap();
        assert_eq!(store.get("http://x/file").unwrap(), Some(b"two".to_vec()));
        assert_eq!(store.get("http://x/other").unwrap(), None);

        store.delete("http://x/file").unwrap();
        assert_eq!(store.get("http://x/file").unwrap(), None);
        store.delete("http://x/file").unwrap();
    }

    #[test]
    fn memory_store() {
        let store = MemoryStore::new();
        exercise(&store);
        assert!(store.is_empty());
    }

    #[test]
    fn dir_store() {
        let dir = tempdir().unwrap();
        let store = DirStore::new(dir.path().join("records"));
        exercise(&store);
    }

    #[test]
    fn dir_store_names_are_stable() {
        let store = DirStore::new("/var/cache/updraft");
        let a = store.path_for("https://example.com/a.zip");
        assert_eq!(a, store.path_for("https://example.com/a.zip"));
        assert_ne!(a, store.path_for("https://example.com/b.zip"));
        assert!(a.starts_with("/var/cache/updraft"));
    }

    #[test]
    fn sled_store() {
        let db = sled::Config::new().temporary(true).open().unwrap();
        let store = SledStore::from_db(db);
        exercise(&store);
    }

    #[test]
    fn shared_store() {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
        exercise(&store);
    }
}
