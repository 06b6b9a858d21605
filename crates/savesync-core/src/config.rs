//! Configuration module for Savesync.
//!
//! Provides typed configuration structs that map to the YAML configuration
//! file, with loading, validation, defaults, and environment-variable
//! overrides for credentials so they can stay out of the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::domain::modes::{ActionMode, CrawlMode, Direction};

/// Top-level configuration for Savesync.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub consoles: Vec<ConsoleEntry>,
    pub run: RunConfig,
    pub transfer: TransferConfig,
    pub scan: ScanConfig,
    pub logging: LoggingConfig,
}

/// Catalog API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the savefile catalog API.
    pub base_url: String,
    /// Account email for token login.
    pub email: String,
    /// Account password for token login.
    pub password: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

/// One console to reconcile: a catalog name and its local save directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleEntry {
    /// Console name as registered (or to be registered) in the catalog.
    pub name: String,
    /// Local directory holding this console's savefiles.
    pub path: PathBuf,
}

/// Default reconciliation policies, overridable per run from the CLI.
///
/// Modes use the single-letter codes `u`/`f`/`n`/`a`/`l`; direction is
/// `upload` or `download`. Stored as strings so the file mirrors the CLI
/// flags; parsed through the typed accessors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Crawl mode code (`-c/--crawl`).
    pub crawl: String,
    /// Action mode code (`-d/--download`).
    pub action: String,
    /// Authoritative side for matched-pair overwrites.
    pub direction: String,
}

/// Executor parallelism settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Maximum concurrent per-file transfers within one console.
    pub max_concurrent: usize,
    /// Maximum consoles reconciled concurrently.
    pub max_concurrent_consoles: usize,
}

/// Local inventory scan settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Compute a SHA-256 digest for every scanned file. Costs a full read
    /// per file; off by default.
    pub hash_contents: bool,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/savesync/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("savesync")
            .join("config.yaml")
    }

    /// Apply environment-variable overrides for connection credentials.
    ///
    /// Recognized: `SAVESYNC_API_URL`, `SAVESYNC_EMAIL`, `SAVESYNC_PASSWORD`.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("SAVESYNC_API_URL") {
            self.api.base_url = url;
        }
        if let Ok(email) = std::env::var("SAVESYNC_EMAIL") {
            self.api.email = email;
        }
        if let Ok(password) = std::env::var("SAVESYNC_PASSWORD") {
            self.api.password = password;
        }
    }

    /// Validate that the configuration is complete enough to run.
    ///
    /// Missing credentials, an empty console list, or malformed mode codes
    /// abort the run here, before any I/O happens.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.api.base_url.is_empty() {
            return Err(DomainError::InvalidConfig(
                "api.base_url is not set".to_string(),
            ));
        }
        if self.api.email.is_empty() || self.api.password.is_empty() {
            return Err(DomainError::InvalidConfig(
                "api.email and api.password must be set (config file or \
                 SAVESYNC_EMAIL / SAVESYNC_PASSWORD)"
                    .to_string(),
            ));
        }
        if self.consoles.is_empty() {
            return Err(DomainError::InvalidConfig(
                "no consoles configured".to_string(),
            ));
        }
        for entry in &self.consoles {
            if entry.name.is_empty() {
                return Err(DomainError::InvalidConfig(
                    "console entry with empty name".to_string(),
                ));
            }
            if entry.path.as_os_str().is_empty() {
                return Err(DomainError::InvalidConfig(format!(
                    "console '{}' has an empty path",
                    entry.name
                )));
            }
        }

        // Parse the policy strings so a typo fails the run up front.
        self.run.crawl_mode()?;
        self.run.action_mode()?;
        self.run.direction()?;

        Ok(())
    }
}

impl RunConfig {
    /// The configured crawl mode.
    pub fn crawl_mode(&self) -> Result<CrawlMode, DomainError> {
        CrawlMode::from_code(&self.crawl)
    }

    /// The configured action mode.
    pub fn action_mode(&self) -> Result<ActionMode, DomainError> {
        ActionMode::from_code(&self.action)
    }

    /// The configured run direction.
    pub fn direction(&self) -> Result<Direction, DomainError> {
        self.direction.parse()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            email: String::new(),
            password: String::new(),
            timeout_secs: 10,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            crawl: "a".to_string(),
            action: "a".to_string(),
            direction: "upload".to_string(),
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 4,
            max_concurrent_consoles: 2,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}
