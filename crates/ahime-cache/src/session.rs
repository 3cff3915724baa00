//! Versioned sessions stored in a [`Cache`].

use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{Cache, CacheError};

/// Maximum retry attempts for optimistic concurrency control.
const MAX_UPDATE_RETRIES: u32 = 3;

/// A unique session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random session ID (`sess_` + 24 base64url chars).
    pub fn generate() -> Self {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
        use rand::Rng;

        let bytes: [u8; 18] = rand::thread_rng().gen();
        Self(format!("sess_{}", URL_SAFE_NO_PAD.encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Session envelope as stored in the cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData<T> {
    pub id: SessionId,
    pub data: T,
    /// Incremented on every write, starting at 1.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
}

/// Session manager generic over the stored data type.
///
/// # Example
///
/// ```rust,ignore
/// let sessions = Session::<StorefrontSnapshot>::new(Cache::open_dir(".ahime")?);
/// let id = SessionId::generate();
/// let snapshot = sessions.get_or_create(&id)?;
/// sessions.set(&id, &snapshot)?;
/// ```
#[derive(Debug, Clone)]
pub struct Session<T> {
    cache: Cache,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> Session<T>
where
    T: Serialize + DeserializeOwned + Default + Clone,
{
    pub fn new(cache: Cache) -> Self {
        Self {
            cache,
            _phantom: PhantomData,
        }
    }

    /// Session manager over a process-local cache.
    pub fn in_memory() -> Self {
        Self::new(Cache::in_memory())
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Get session data, or create (and store) a default session.
    pub fn get_or_create(&self, id: &SessionId) -> Result<T, CacheError> {
        match self.get_versioned(id)? {
            Some(session_data) => Ok(session_data.data),
            None => {
                let data = T::default();
                self.write(id, &data, 1, None)?;
                tracing::debug!(session = %id, "created session");
                Ok(data)
            }
        }
    }

    pub fn get(&self, id: &SessionId) -> Result<Option<T>, CacheError> {
        Ok(self.get_versioned(id)?.map(|s| s.data))
    }

    /// Get the full envelope, including version and timestamps.
    pub fn get_versioned(&self, id: &SessionId) -> Result<Option<SessionData<T>>, CacheError> {
        self.cache.get::<SessionData<T>>(&session_key(id))
    }

    /// Unconditional write. Returns the new version.
    pub fn set(&self, id: &SessionId, data: &T) -> Result<u64, CacheError> {
        let current = self.get_versioned(id)?;
        let version = current.as_ref().map(|s| s.version + 1).unwrap_or(1);
        self.write(id, data, version, current.map(|s| s.created_at))?;
        Ok(version)
    }

    /// Write only if the stored version equals `expected_version`
    /// (0 meaning "no session yet"). Returns the new version.
    ///
    /// The backend swaps the value only if nothing was written since it was
    /// read here, so of two writers expecting the same version exactly one
    /// succeeds.
    pub fn compare_and_set(
        &self,
        id: &SessionId,
        expected_version: u64,
        data: &T,
    ) -> Result<u64, CacheError> {
        let key = session_key(id);
        let raw = self.cache.get_raw(&key)?;
        let current: Option<SessionData<T>> = match &raw {
            Some(bytes) => Some(serde_json::from_slice(bytes)?),
            None => None,
        };
        let found = current.as_ref().map(|s| s.version).unwrap_or(0);
        if found != expected_version {
            return Err(CacheError::ConcurrentModification(format!(
                "session {id}: expected version {expected_version}, found {found}"
            )));
        }

        let version = found + 1;
        let envelope = Self::envelope(id, data, version, current.map(|s| s.created_at));
        if !self.cache.compare_and_swap(&key, raw.as_deref(), &envelope)? {
            return Err(CacheError::ConcurrentModification(format!(
                "session {id}: written by someone else while saving version {version}"
            )));
        }
        Ok(version)
    }

    pub fn delete(&self, id: &SessionId) -> Result<(), CacheError> {
        self.cache.delete(&session_key(id))?;
        tracing::debug!(session = %id, "deleted session");
        Ok(())
    }

    pub fn exists(&self, id: &SessionId) -> Result<bool, CacheError> {
        self.cache.exists(&session_key(id))
    }

    /// Apply `f` to the current data and write it back.
    ///
    /// Retries up to `MAX_UPDATE_RETRIES` times when another writer bumps the
    /// version in between; then fails with
    /// [`CacheError::ConcurrentModification`].
    pub fn update<F>(&self, id: &SessionId, mut f: F) -> Result<T, CacheError>
    where
        F: FnMut(&mut T),
    {
        for attempt in 0..MAX_UPDATE_RETRIES {
            let (mut data, expected_version) = match self.get_versioned(id)? {
                Some(session_data) => (session_data.data, session_data.version),
                None => (T::default(), 0),
            };

            f(&mut data);

            match self.compare_and_set(id, expected_version, &data) {
                Ok(_) => return Ok(data),
                Err(CacheError::ConcurrentModification(reason)) => {
                    tracing::debug!(session = %id, attempt, %reason, "retrying session update");
                }
                Err(e) => return Err(e),
            }
        }

        Err(CacheError::ConcurrentModification(
            "max retries exceeded".to_string(),
        ))
    }

    /// Identifiers of every stored session.
    pub fn list(&self) -> Result<Vec<SessionId>, CacheError> {
        Ok(self
            .cache
            .keys_with_prefix(SESSION_PREFIX)?
            .into_iter()
            .filter_map(|k| k.strip_prefix(SESSION_PREFIX).map(SessionId::from))
            .collect())
    }

    fn write(
        &self,
        id: &SessionId,
        data: &T,
        version: u64,
        created_at: Option<DateTime<Utc>>,
    ) -> Result<(), CacheError> {
        let session_data = Self::envelope(id, data, version, created_at);
        self.cache.set(&session_key(id), &session_data)
    }

    fn envelope(
        id: &SessionId,
        data: &T,
        version: u64,
        created_at: Option<DateTime<Utc>>,
    ) -> SessionData<T> {
        let now = Utc::now();
        SessionData {
            id: id.clone(),
            data: data.clone(),
            version,
            created_at: created_at.unwrap_or(now),
            last_accessed: now,
        }
    }
}

const SESSION_PREFIX: &str = "session:";

fn session_key(id: &SessionId) -> String {
    crate::cache_key!("session", id)
}
