//! Raw byte storage backends.

use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::Duration;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use crate::CacheError;

/// A byte-oriented key-value store.
pub trait KvBackend: Send + Sync {
    /// Read the value under `key`, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError>;

    /// Remove `key`. Removing an absent key is not an error.
    fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// All keys currently stored, in no particular order.
    fn keys(&self) -> Result<Vec<String>, CacheError>;

    /// Write `value` under `key` only if the stored bytes still equal
    /// `expected` (`None`: the key must be absent). The check and the write
    /// happen as one step. Returns whether the value was written.
    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: &[u8],
    ) -> Result<bool, CacheError>;

    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get(key)?.is_some())
    }
}

impl<B: KvBackend + ?Sized> KvBackend for Arc<B> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        (**self).delete(key)
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        (**self).keys()
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: &[u8],
    ) -> Result<bool, CacheError> {
        (**self).compare_and_swap(key, expected, value)
    }

    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        (**self).exists(key)
    }
}

/// Process-local store, lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> CacheError {
    CacheError::StoreError("memory store lock poisoned".to_string())
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.keys().cloned().collect())
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: &[u8],
    ) -> Result<bool, CacheError> {
        let mut entries = self.entries.write().map_err(|_| poisoned())?;
        if entries.get(key).map(Vec::as_slice) != expected {
            return Ok(false);
        }
        entries.insert(key.to_string(), value.to_vec());
        Ok(true)
    }

    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let entries = self.entries.read().map_err(|_| poisoned())?;
        Ok(entries.contains_key(key))
    }
}

/// Directory-backed store: one file per key.
///
/// File names are the base64url encoding of the key, so any key is a valid
/// file name. Writes go to a uniquely named temporary file first and are
/// renamed into place, while holding a `<name>.lock` file for that key.
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

const FILE_EXTENSION: &str = "json";
const LOCK_EXTENSION: &str = "lock";

const LOCK_ATTEMPTS: u32 = 200;
const LOCK_RETRY_DELAY: Duration = Duration::from_millis(10);

/// Exclusive per-key lock, held while the lock file exists.
struct KeyLock {
    path: PathBuf,
}

impl KeyLock {
    fn acquire(path: PathBuf) -> Result<Self, CacheError> {
        for _ in 0..LOCK_ATTEMPTS {
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(_) => return Ok(Self { path }),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    thread::sleep(LOCK_RETRY_DELAY);
                }
                Err(e) => return Err(CacheError::io(&path, e)),
            }
        }
        Err(CacheError::StoreError(format!(
            "timed out waiting for lock {}",
            path.display()
        )))
    }
}

impl Drop for KeyLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release lock");
        }
    }
}

impl FileBackend {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            CacheError::OpenError(format!("{}: {}", root.display(), e))
        })?;
        tracing::debug!(path = %root.display(), "opened file store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name = URL_SAFE_NO_PAD.encode(key.as_bytes());
        self.root.join(format!("{name}.{FILE_EXTENSION}"))
    }

    fn lock(&self, key: &str) -> Result<KeyLock, CacheError> {
        let name = URL_SAFE_NO_PAD.encode(key.as_bytes());
        KeyLock::acquire(self.root.join(format!("{name}.{LOCK_EXTENSION}")))
    }

    fn read(path: &Path) -> Result<Option<Vec<u8>>, CacheError> {
        match fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::io(path, e)),
        }
    }

    fn write(&self, path: &Path, value: &[u8]) -> Result<(), CacheError> {
        let mut tmp =
            tempfile::NamedTempFile::new_in(&self.root).map_err(|e| CacheError::io(&self.root, e))?;
        tmp.write_all(value)
            .map_err(|e| CacheError::io(tmp.path(), e))?;
        tmp.persist(path)
            .map_err(|e| CacheError::io(path, e.error))?;
        Ok(())
    }

    fn key_for(path: &Path) -> Option<String> {
        if path.extension()?.to_str()? != FILE_EXTENSION {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        let bytes = URL_SAFE_NO_PAD.decode(stem).ok()?;
        String::from_utf8(bytes).ok()
    }
}

impl KvBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let bytes = Self::read(&self.path_for(key))?;
        if let Some(bytes) = &bytes {
            tracing::debug!(key, bytes = bytes.len(), "read entry");
        }
        Ok(bytes)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        let _lock = self.lock(key)?;
        self.write(&self.path_for(key), value)?;
        tracing::debug!(key, bytes = value.len(), "wrote entry");
        Ok(())
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: &[u8],
    ) -> Result<bool, CacheError> {
        let _lock = self.lock(key)?;
        let path = self.path_for(key);
        if Self::read(&path)?.as_deref() != expected {
            tracing::debug!(key, "compare-and-swap lost");
            return Ok(false);
        }
        self.write(&path, value)?;
        tracing::debug!(key, bytes = value.len(), "swapped entry");
        Ok(true)
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        let _lock = self.lock(key)?;
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::debug!(key, "deleted entry");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::io(&path, e)),
        }
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        let dir = fs::read_dir(&self.root).map_err(|e| CacheError::io(&self.root, e))?;
        let mut keys = Vec::new();
        for entry in dir {
            let entry = entry.map_err(|e| CacheError::io(&self.root, e))?;
            if let Some(key) = Self::key_for(&entry.path()) {
                keys.push(key);
            }
        }
        Ok(keys)
    }

    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.path_for(key).is_file())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise(backend: &dyn KvBackend) {
        assert_eq!(backend.get("cart:s1").unwrap(), None);
        assert!(!backend.exists("cart:s1").unwrap());

        backend.set("cart:s1", b"{\"a\":1}").unwrap();
        backend.set("cart:s1", b"{\"a\":2}").unwrap();
        backend.set("fav:s1", b"[]").unwrap();

        assert_eq!(backend.get("cart:s1").unwrap(), Some(b"{\"a\":2}".to_vec()));
        assert!(backend.exists("cart:s1").unwrap());

        let mut keys = backend.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["cart:s1".to_string(), "fav:s1".to_string()]);

        backend.delete("cart:s1").unwrap();
        backend.delete("cart:s1").unwrap();
        assert_eq!(backend.get("cart:s1").unwrap(), None);

        assert!(backend.compare_and_swap("cas", None, b"1").unwrap());
        assert!(!backend.compare_and_swap("cas", None, b"2").unwrap());
        assert!(!backend.compare_and_swap("cas", Some(b"0"), b"2").unwrap());
        assert!(backend.compare_and_swap("cas", Some(b"1"), b"2").unwrap());
        assert_eq!(backend.get("cas").unwrap(), Some(b"2".to_vec()));
    }

    /// Many threads race to create the same key; exactly one may win.
    fn race_to_create(backend: &dyn KvBackend) {
        let wins: usize = thread::scope(|scope| {
            let handles: Vec<_> = (0..8u8)
                .map(|i| scope.spawn(move || backend.compare_and_swap("race", None, &[i]).unwrap()))
                .collect();
            handles
                .into_iter()
                .map(|h| usize::from(h.join().unwrap()))
                .sum()
        });
        assert_eq!(wins, 1);
        assert_eq!(backend.get("race").unwrap().map(|v| v.len()), Some(1));
    }

    #[test]
    fn test_memory_backend() {
        exercise(&MemoryBackend::new());
    }

    #[test]
    fn test_file_backend() {
        let dir = tempfile::tempdir().unwrap();
        exercise(&FileBackend::open(dir.path().join("store")).unwrap());
    }

    #[test]
    fn test_memory_backend_single_winner() {
        race_to_create(&MemoryBackend::new());
    }

    #[test]
    fn test_file_backend_single_winner() {
        let dir = tempfile::tempdir().unwrap();
        race_to_create(&FileBackend::open(dir.path()).unwrap());
    }

    #[test]
    fn test_file_backend_concurrent_writers_leave_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        thread::scope(|scope| {
            for i in 0..8u8 {
                let backend = &backend;
                scope.spawn(move || {
                    for _ in 0..10 {
                        backend.set("shared", &[i; 64]).unwrap();
                    }
                });
            }
        });

        let stored = backend.get("shared").unwrap().unwrap();
        assert_eq!(stored.len(), 64);
        assert!(stored.iter().all(|b| *b == stored[0]));
        let files = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(files, 1);
    }

    #[test]
    fn test_file_backend_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        FileBackend::open(dir.path())
            .unwrap()
            .set("session:abc", b"42")
            .unwrap();

        let reopened = FileBackend::open(dir.path()).unwrap();
        assert_eq!(reopened.get("session:abc").unwrap(), Some(b"42".to_vec()));
    }

    #[test]
    fn test_file_backend_ignores_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::open(dir.path()).unwrap();
        fs::write(dir.path().join("README.txt"), "hello").unwrap();
        backend.set("k", b"v").unwrap();
        assert_eq!(backend.keys().unwrap(), vec!["k".to_string()]);
    }
}
