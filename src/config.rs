//! Watch configuration
//!
//! Settings for periodic snapshot passes, loadable from a TOML file. Every
//! key is optional:
//!
//! ```toml
//! session_dir = "/home/observer/.local/share/kstars/analyze"
//! extension = "analyze"
//! output = "/var/lib/skysnap/snapshot.json"
//! interval_secs = 15
//! summary = true
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for snapshot passes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Directory searched for the newest session log
    pub session_dir: Option<PathBuf>,

    /// Session log file extension, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Where the JSON snapshot envelope is written after each pass
    pub output: Option<PathBuf>,

    /// Seconds between passes in watch mode
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    /// Log a one-line summary per category after each pass
    #[serde(default = "default_summary")]
    pub summary: bool,
}

fn default_extension() -> String {
    "analyze".to_string()
}

fn default_interval() -> u64 {
    15
}

fn default_summary() -> bool {
    true
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            session_dir: None,
            extension: default_extension(),
            output: None,
            interval_secs: default_interval(),
            summary: default_summary(),
        }
    }
}

impl WatchConfig {
    /// Load from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: WatchConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval_secs == 0 {
            anyhow::bail!("interval_secs must be >= 1");
        }
        if self.extension.is_empty() || self.extension.starts_with('.') {
            anyhow::bail!(
                "extension must be non-empty and given without a leading dot (got {:?})",
                self.extension
            );
        }
        Ok(())
    }

    /// Poll interval as Duration
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}
