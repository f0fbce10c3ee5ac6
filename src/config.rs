//! Configuration management for sqlprobe.
//!
//! Handles loading configuration from a TOML file, with probe-wide settings
//! and named query requests.

use crate::connection::DEFAULT_CONNECT_TIMEOUT;
use crate::error::{ProbeError, Result};
use crate::request::RequestFields;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Log level used when neither the config nor `RUST_LOG` names one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Main configuration structure for sqlprobe.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Probe-wide settings.
    #[serde(default)]
    pub probe: ProbeSettings,

    /// Named query requests.
    #[serde(default)]
    pub requests: HashMap<String, RequestFields>,
}

/// Probe-wide settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeSettings {
    /// Connect timeout in seconds when the connection string sets none.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u32,

    /// Default log filter.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_connect_timeout() -> u32 {
    DEFAULT_CONNECT_TIMEOUT
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            connect_timeout: default_connect_timeout(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("db-sqlprobe")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ProbeError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            ProbeError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Gets a copy of a named request.
    pub fn get_request(&self, name: &str) -> Result<RequestFields> {
        self.requests.get(name).cloned().ok_or_else(|| {
            ProbeError::config(format!("Request '{}' not found in config file", name))
        })
    }
}
