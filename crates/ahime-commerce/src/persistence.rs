//! Storefront persistence through `ahime-cache` sessions.

use std::path::PathBuf;

use ahime_cache::{Cache, Session, SessionId};

use crate::catalog::Catalog;
use crate::error::CommerceError;
use crate::snapshot::{RestoreReport, StorefrontSnapshot};
use crate::storefront::{Storefront, StorefrontConfig};

/// Saves and loads storefront snapshots, one per session.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    sessions: Session<StorefrontSnapshot>,
    config: StorefrontConfig,
}

impl SnapshotStore {
    pub fn new(cache: Cache) -> Self {
        Self {
            sessions: Session::new(cache),
            config: StorefrontConfig::default(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Cache::in_memory())
    }

    /// Store snapshots as files under `dir`.
    pub fn open_dir(dir: impl Into<PathBuf>) -> Result<Self, CommerceError> {
        Ok(Self::new(Cache::open_dir(dir)?))
    }

    /// Config applied to storefronts built by [`SnapshotStore::load`].
    pub fn with_config(mut self, config: StorefrontConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    /// Persist `storefront` under `session_id`. Returns the stored version.
    pub fn save(&self, session_id: &SessionId, storefront: &Storefront) -> Result<u64, CommerceError> {
        let version = self.sessions.set(session_id, &storefront.snapshot())?;
        tracing::debug!(session = %session_id, version, "saved storefront");
        Ok(version)
    }

    /// Persist `storefront` only if the stored version is still
    /// `expected_version` (0 when nothing was saved yet).
    ///
    /// Fails with a storage error when another writer saved in between.
    pub fn save_if_version(
        &self,
        session_id: &SessionId,
        expected_version: u64,
        storefront: &Storefront,
    ) -> Result<u64, CommerceError> {
        let version =
            self.sessions
                .compare_and_set(session_id, expected_version, &storefront.snapshot())?;
        tracing::debug!(session = %session_id, version, "saved storefront");
        Ok(version)
    }

    /// Version of the stored snapshot, 0 if there is none.
    pub fn version(&self, session_id: &SessionId) -> Result<u64, CommerceError> {
        Ok(self
            .sessions
            .get_versioned(session_id)?
            .map(|s| s.version)
            .unwrap_or(0))
    }

    /// Rebuild the storefront saved under `session_id`, `None` if there is
    /// none.
    pub fn load(
        &self,
        session_id: &SessionId,
        catalog: &Catalog,
    ) -> Result<Option<(Storefront, RestoreReport)>, CommerceError> {
        let Some(snapshot) = self.sessions.get(session_id)? else {
            return Ok(None);
        };
        let restored = Storefront::from_snapshot(self.config, &snapshot, catalog)?;
        Ok(Some(restored))
    }

    /// Like [`SnapshotStore::load`], falling back to an empty storefront.
    pub fn load_or_default(
        &self,
        session_id: &SessionId,
        catalog: &Catalog,
    ) -> Result<(Storefront, RestoreReport), CommerceError> {
        Ok(self
            .load(session_id, catalog)?
            .unwrap_or_else(|| (Storefront::new(self.config), RestoreReport::default())))
    }

    /// Raw snapshot, without resolving it against a catalog.
    pub fn snapshot(&self, session_id: &SessionId) -> Result<Option<StorefrontSnapshot>, CommerceError> {
        Ok(self.sessions.get(session_id)?)
    }

    pub fn exists(&self, session_id: &SessionId) -> Result<bool, CommerceError> {
        Ok(self.sessions.exists(session_id)?)
    }

    pub fn discard(&self, session_id: &SessionId) -> Result<(), CommerceError> {
        Ok(self.sessions.delete(session_id)?)
    }

    /// Every session with a saved snapshot.
    pub fn sessions(&self) -> Result<Vec<SessionId>, CommerceError> {
        Ok(self.sessions.list()?)
    }
}
