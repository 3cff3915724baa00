//! CLI configuration (`ahime.toml`).

use std::path::Path;

use ahime_commerce::storefront::StorefrontConfig;
use ahime_observability::{LogFormat, LogLevel};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Cart and stock policy.
    #[serde(default)]
    pub storefront: StorefrontConfig,

    /// Where products come from.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Where sessions are kept.
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CliConfig {
    /// Load config from a file; `.json` files are JSON, anything else TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if is_json(path) {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = if is_json(path) {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("json")
}

/// Catalog source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Path to the catalog JSON document.
    #[serde(default = "default_catalog_path")]
    pub path: String,
}

fn default_catalog_path() -> String {
    "catalog.json".to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

/// Session storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory for stored data.
    #[serde(default = "default_storage_dir")]
    pub dir: String,

    /// Store name; snapshots live under `<dir>/<name>`.
    #[serde(default = "default_store_name")]
    pub name: String,
}

fn default_storage_dir() -> String {
    ".ahime".to_string()
}

fn default_store_name() -> String {
    "sessions".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
            name: default_store_name(),
        }
    }
}

/// Logging settings; `RUST_LOG` still overrides `level`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    #[serde(default = "default_log_format")]
    pub format: LogFormat,
}

fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_format() -> LogFormat {
    LogFormat::Human
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Contents of a freshly generated `ahime.toml`.
pub fn generate_default_config() -> String {
    r#"# Ahimè storefront configuration

[storefront]
currency = "XOF"
enforce_stock = true

[catalog]
path = "catalog.json"

[storage]
dir = ".ahime"
name = "sessions"

[logging]
level = "warn"
format = "human"
"#
    .to_string()
}
