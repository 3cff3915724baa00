//! Typed key-value cache with automatic JSON serialization.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};

use crate::backend::{FileBackend, KvBackend, MemoryBackend};
use crate::CacheError;

/// Type-safe cache over any [`KvBackend`].
///
/// Values are stored as JSON. Cloning a `Cache` shares the backend.
#[derive(Clone)]
pub struct Cache {
    backend: Arc<dyn KvBackend>,
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache").finish_non_exhaustive()
    }
}

impl Cache {
    pub fn new(backend: impl KvBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// A cache that lives only as long as the process.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// A cache persisted under `dir`, one file per key.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let cache = Cache::open_dir(".ahime/sessions")?;
    /// cache.set("cart:sess_abc", &cart)?;
    /// ```
    pub fn open_dir(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        Ok(Self::new(FileBackend::open(dir)?))
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.backend.get(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Like [`Cache::get`], but a missing key is an error.
    pub fn require<T: DeserializeOwned>(&self, key: &str) -> Result<T, CacheError> {
        self.get(key)?
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    /// Stored bytes under `key`, without decoding them.
    pub fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.backend.get(key)
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.backend.set(key, &bytes)
    }

    /// Store `value` only if the bytes under `key` are still `expected`, as
    /// read by [`Cache::get_raw`]. Returns whether the value was stored.
    pub fn compare_and_swap<T: Serialize>(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: &T,
    ) -> Result<bool, CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.backend.compare_and_swap(key, expected, &bytes)
    }

    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.backend.delete(key)
    }

    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.backend.exists(key)
    }

    /// All keys, sorted.
    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut keys = self.backend.keys()?;
        keys.sort();
        Ok(keys)
    }

    /// Keys starting with `prefix`, sorted.
    pub fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        Ok(self
            .keys()?
            .into_iter()
            .filter(|k| k.starts_with(prefix))
            .collect())
    }
}

/// Helper to build cache keys with namespacing.
///
/// # Example
///
/// ```rust,ignore
/// let key = cache_key!("snapshot", session_id);
/// // "snapshot:sess_abc"
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Line {
        product_id: String,
        quantity: i64,
    }

    #[test]
    fn test_typed_roundtrip() {
        let cache = Cache::in_memory();
        let line = Line {
            product_id: "p1".into(),
            quantity: 2,
        };

        cache.set("line:1", &line).unwrap();
        assert_eq!(cache.get::<Line>("line:1").unwrap(), Some(line));
        assert_eq!(cache.get::<Line>("line:2").unwrap(), None);
    }

    #[test]
    fn test_require_missing() {
        let cache = Cache::in_memory();
        let err = cache.require::<Line>("nope").unwrap_err();
        assert!(matches!(err, CacheError::NotFound(k) if k == "nope"));
    }

    #[test]
    fn test_wrong_shape_is_serialize_error() {
        let cache = Cache::in_memory();
        cache.set("n", &42u32).unwrap();
        let err = cache.get::<Line>("n").unwrap_err();
        assert!(matches!(err, CacheError::SerializeError(_)));
    }

    #[test]
    fn test_clones_share_backend() {
        let cache = Cache::in_memory();
        let other = cache.clone();
        cache.set("k", &"v").unwrap();
        assert!(other.exists("k").unwrap());
        other.delete("k").unwrap();
        assert!(!cache.exists("k").unwrap());
    }

    #[test]
    fn test_keys_with_prefix() {
        let cache = Cache::in_memory();
        for key in ["session:b", "session:a", "other:x"] {
            cache.set(key, &1).unwrap();
        }
        assert_eq!(
            cache.keys_with_prefix("session:").unwrap(),
            vec!["session:a".to_string(), "session:b".to_string()]
        );
        assert_eq!(cache.keys().unwrap().len(), 3);
    }

    #[test]
    fn test_open_dir_persists() {
        let dir = tempfile::tempdir().unwrap();
        Cache::open_dir(dir.path()).unwrap().set("k", &7u8).unwrap();
        let value: Option<u8> = Cache::open_dir(dir.path()).unwrap().get("k").unwrap();
        assert_eq!(value, Some(7));
    }

    #[test]
    fn test_cache_key_macro() {
        let session = "sess_abc";
        assert_eq!(cache_key!("snapshot", session), "snapshot:sess_abc");
        assert_eq!(cache_key!("cart", session, 3), "cart:sess_abc:3");
    }
}
