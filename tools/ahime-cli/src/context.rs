//! CLI execution context.

use std::fs;
use std::path::{Path, PathBuf};

use ahime_cache::SessionId;
use ahime_commerce::catalog::Catalog;
use ahime_commerce::persistence::SnapshotStore;
use ahime_commerce::snapshot::RestoreReport;
use ahime_commerce::storefront::Storefront;
use ahime_observability::{LogLevel, StructuredLogger};
use anyhow::{anyhow, Context as _, Result};

use crate::config::CliConfig;
use crate::output::Output;

const CONFIG_NAMES: [&str; 3] = ["ahime.toml", ".ahime.toml", "ahime.json"];

/// File under the storage directory remembering the active session.
const CURRENT_SESSION_FILE: &str = "current-session";

/// Execution context for CLI commands.
pub struct Context {
    pub config: CliConfig,
    pub output: Output,
    /// Directory relative paths in the config are resolved against: the
    /// config file's directory, or the working directory without one.
    pub base_dir: PathBuf,
    /// Config file in use, if any.
    pub config_path: Option<PathBuf>,
    session_override: Option<SessionId>,
}

/// A loaded session: the visitor's storefront and the catalog it refers to.
pub struct Visit {
    pub session_id: SessionId,
    /// Stored version when loaded; saving fails if it moved since.
    pub version: u64,
    pub storefront: Storefront,
    pub catalog: Catalog,
}

impl Context {
    pub fn load(
        config_path: Option<&Path>,
        session: Option<String>,
        output: Output,
    ) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => (CliConfig::load(path)?, Some(path.to_path_buf())),
            None => match find_config(&cwd) {
                Some(path) => (CliConfig::load(&path)?, Some(path)),
                None => (CliConfig::default(), None),
            },
        };

        let base_dir = config_path
            .as_deref()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or(cwd);

        Ok(Self {
            config,
            output,
            base_dir,
            config_path,
            session_override: session.map(SessionId::from),
        })
    }

    /// Resolve a path relative to the base directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        let path = PathBuf::from(path);
        if path.is_absolute() {
            path
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn storage_dir(&self) -> PathBuf {
        self.resolve_path(&self.config.storage.dir)
    }

    pub fn catalog(&self) -> Result<Catalog> {
        let path = self.resolve_path(&self.config.catalog.path);
        let json = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
        let catalog = Catalog::from_json(&json)
            .with_context(|| format!("Invalid catalog: {}", path.display()))?;
        self.output
            .debug(&format!("Loaded {} products from {}", catalog.len(), path.display()));
        Ok(catalog)
    }

    pub fn store(&self) -> Result<SnapshotStore> {
        let dir = self.storage_dir().join(&self.config.storage.name);
        let store = SnapshotStore::open_dir(&dir)
            .with_context(|| format!("Failed to open session store: {}", dir.display()))?;
        Ok(store.with_config(self.config.storefront))
    }

    /// Session from `--session`, else the remembered one.
    pub fn current_session(&self) -> Result<Option<SessionId>> {
        if let Some(id) = &self.session_override {
            return Ok(Some(id.clone()));
        }
        let path = self.storage_dir().join(CURRENT_SESSION_FILE);
        match fs::read_to_string(&path) {
            Ok(content) => {
                let id = content.trim();
                Ok((!id.is_empty()).then(|| SessionId::from(id)))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    pub fn remember_session(&self, id: &SessionId) -> Result<()> {
        let dir = self.storage_dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(CURRENT_SESSION_FILE);
        fs::write(&path, id.as_str())
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn forget_session(&self) -> Result<()> {
        let path = self.storage_dir().join(CURRENT_SESSION_FILE);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }

    /// Session id to act on; starts a new session when there is none.
    pub fn session_or_new(&self) -> Result<SessionId> {
        if let Some(id) = self.current_session()? {
            return Ok(id);
        }
        let id = SessionId::generate();
        self.remember_session(&id)?;
        self.output.info(&format!("Started session {}", id));
        Ok(id)
    }

    /// Session id to inspect; errors when there is none.
    pub fn require_session(&self) -> Result<SessionId> {
        self.current_session()?
            .ok_or_else(|| anyhow!("No active session. Run `ahime session new` first."))
    }

    /// Load (or start) the current visit.
    pub fn open_visit(&self) -> Result<Visit> {
        let catalog = self.catalog()?;
        let session_id = self.session_or_new()?;
        let store = self.store()?;
        let version = store.version(&session_id)?;
        let (storefront, report) = store
            .load_or_default(&session_id, &catalog)
            .with_context(|| format!("Failed to load session {}", session_id))?;
        self.report_restore(&report);

        let storefront = storefront.with_logger(self.logger(&session_id));
        Ok(Visit {
            session_id,
            version,
            storefront,
            catalog,
        })
    }

    pub fn save_visit(&self, visit: &Visit) -> Result<()> {
        let version = self
            .store()?
            .save_if_version(&visit.session_id, visit.version, &visit.storefront)
            .with_context(|| format!("Failed to save session {}", visit.session_id))?;
        self.output
            .debug(&format!("Saved session {} (version {})", visit.session_id, version));
        Ok(())
    }

    /// Session-scoped logger honoring the `[logging]` section.
    pub fn logger(&self, session_id: &SessionId) -> StructuredLogger {
        let level = if self.output.is_verbose() {
            LogLevel::Debug
        } else {
            self.config.logging.level
        };
        StructuredLogger::new(session_id.as_str())
            .with_min_level(level)
            .with_format(self.config.logging.format)
    }

    pub fn report_restore(&self, report: &RestoreReport) {
        for id in &report.missing {
            self.output
                .warn(&format!("{} is no longer in the catalog and was dropped", id));
        }
        for id in &report.skipped {
            self.output
                .warn(&format!("{} could not be put back in the cart", id));
        }
    }
}

/// Find a config file in `start` or its parents.
fn find_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        for name in &CONFIG_NAMES {
            let candidate = current.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }

        if !current.pop() {
            return None;
        }
    }
}
