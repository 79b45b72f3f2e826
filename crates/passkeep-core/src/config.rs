//! Configuration management for passkeep
//!
//! Read from `~/.config/passkeep/config.json`. Every field has a default,
//! so a missing file or a partial file both work.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// passkeep configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Refresh interval for the watch dashboard (seconds)
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: f64,

    /// TOTP time step (seconds), applied to every entry
    #[serde(default = "default_totp_interval")]
    pub totp_interval: u64,

    /// Number of digits in generated TOTP codes
    #[serde(default = "default_totp_digits")]
    pub totp_digits: u32,

    /// Length of generated passwords
    #[serde(default = "default_password_length")]
    pub password_length: usize,

    /// Store file override (defaults to the data directory)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
}

fn default_refresh_interval() -> f64 {
    1.0
}

fn default_totp_interval() -> u64 {
    30
}

fn default_totp_digits() -> u32 {
    6
}

fn default_password_length() -> usize {
    12
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_interval: default_refresh_interval(),
            totp_interval: default_totp_interval(),
            totp_digits: default_totp_digits(),
            password_length: default_password_length(),
            store_path: None,
        }
    }
}

impl Config {
    /// Load config from file
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            let config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config from {}", path.display()))?;
            tracing::debug!(path = %path.display(), "loaded config");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
