//! Scan configuration.
//!
//! [`Config`] holds everything the engine reads during a scan; it is built
//! once per invocation and read-only afterwards. Defaults can come from an
//! optional TOML file, with command-line flags taking precedence.
//!
//! # Configuration Location
//!
//! - Linux: `~/.config/depscout/config.toml`
//! - macOS: `~/Library/Application Support/depscout/config.toml`
//! - Windows: `%APPDATA%\depscout\config.toml`
//!
//! # Example Configuration
//!
//! ```toml
//! ecosystems = ["go", "npm"]
//! exclude = ["node_modules", ".git", "vendor"]
//! workers = 4
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::model::Ecosystem;

/// Default bound on concurrent per-file pipelines. Balances throughput
/// against the advisory feed's rate limit.
pub const DEFAULT_WORKERS: usize = 8;

/// Everything the engine needs for one scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ecosystems to detect and scan.
    pub ecosystems: Vec<Ecosystem>,

    /// Path-component names excluded from traversal. A matching directory
    /// is pruned with its whole subtree.
    pub exclude: Vec<String>,

    /// Optional bearer token for authenticated advisory requests.
    /// Raises the feed's rate limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// When true, files are processed one at a time instead of over the
    /// worker pool. Fully deterministic ordering, much slower.
    pub sequential: bool,

    /// Bound on concurrent per-file pipelines in concurrent mode.
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ecosystems: Ecosystem::all().to_vec(),
            exclude: Vec::new(),
            token: None,
            sequential: false,
            workers: DEFAULT_WORKERS,
        }
    }
}

impl Config {
    /// Loads configuration from the config file, or defaults when the file
    /// doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or
    /// parsed.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Returns the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("depscout")
            .join("config.toml")
    }
}
