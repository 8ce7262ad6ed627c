//! shared-gallery configuration management.
//!
//! Handles the configuration file at:
//! - Linux: ~/.config/shared-gallery/config.toml
//! - macOS: ~/Library/Application Support/shared-gallery/config.toml
//! - Windows: %APPDATA%\shared-gallery\config.toml

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GalleryError, Result};
use crate::fs_utils;
use crate::input::DEFAULT_SWIPE_THRESHOLD_PX;

/// Gallery client configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GalleryConfig {
    #[serde(default)]
    pub relay: RelayConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub input: InputConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub downloads: DownloadConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Relay connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// WebSocket URL of the relay
    #[serde(default = "default_relay_url")]
    pub url: String,
}

fn default_relay_url() -> String {
    "ws://127.0.0.1:3000/ws".to_string()
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            url: default_relay_url(),
        }
    }
}

/// Where the persisted gallery lives
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Horizontal travel in pixels before a swipe navigates
    #[serde(default = "default_swipe_threshold")]
    pub swipe_threshold_px: f64,
}

fn default_swipe_threshold() -> f64 {
    DEFAULT_SWIPE_THRESHOLD_PX
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            swipe_threshold_px: default_swipe_threshold(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Timeout for image reachability checks and downloads
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DownloadConfig {
    /// Defaults to the platform download directory
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug)
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl GalleryConfig {
    /// Default location of `config.toml`
    pub fn default_path() -> PathBuf {
        fs_utils::config_base_dir().join("config.toml")
    }

    /// Load configuration from a specific path; a missing file means defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| GalleryError::ConfigError {
            message: format!("Failed to parse {}: {}", path.display(), e),
        })
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| GalleryError::ConfigError {
            message: format!("Failed to serialize config: {}", e),
        })?;
        fs_utils::write_atomic(path, &content)?;
        Ok(())
    }

    /// Directory of the persisted gallery
    pub fn storage_dir(&self) -> PathBuf {
        self.storage
            .dir
            .clone()
            .unwrap_or_else(fs_utils::data_base_dir)
    }

    /// Directory downloads are written to
    pub fn download_dir(&self) -> PathBuf {
        self.downloads
            .dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn network_timeout(&self) -> Duration {
        Duration::from_secs(self.network.timeout_secs)
    }

    /// Get a configuration value by key path (e.g., "relay.url")
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();
        match parts.as_slice() {
            ["relay", "url"] => Some(self.relay.url.clone()),
            ["storage", "dir"] => Some(self.storage_dir().display().to_string()),
            ["input", "swipe_threshold_px"] => Some(self.input.swipe_threshold_px.to_string()),
            ["network", "timeout_secs"] => Some(self.network.timeout_secs.to_string()),
            ["downloads", "dir"] => Some(self.download_dir().display().to_string()),
            ["logging", "level"] => Some(self.logging.level.clone()),
            _ => None,
        }
    }

    /// Set a configuration value by key path
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let invalid = |what: &str| GalleryError::ConfigError {
            message: format!("Invalid value for {}: {} ({})", key, value, what),
        };
        let parts: Vec<&str> = key.split('.').collect();
        match parts.as_slice() {
            ["relay", "url"] => {
                if !value.starts_with("ws://") && !value.starts_with("wss://") {
                    return Err(invalid("expected a ws:// or wss:// URL"));
                }
                self.relay.url = value.to_string();
            }
            ["storage", "dir"] => {
                self.storage.dir = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            ["input", "swipe_threshold_px"] => {
                let px: f64 = value.parse().map_err(|_| invalid("expected a number"))?;
                if !(px > 0.0) {
                    return Err(invalid("must be positive"));
                }
                self.input.swipe_threshold_px = px;
            }
            ["network", "timeout_secs"] => {
                self.network.timeout_secs =
                    value.parse().map_err(|_| invalid("expected whole seconds"))?;
            }
            ["downloads", "dir"] => {
                self.downloads.dir = (!value.is_empty()).then(|| PathBuf::from(value));
            }
            ["logging", "level"] => {
                if !["error", "warn", "info", "debug"].contains(&value) {
                    return Err(invalid("must be one of: error, warn, info, debug"));
                }
                self.logging.level = value.to_string();
            }
            _ => {
                return Err(GalleryError::ConfigError {
                    message: format!("Unknown configuration key: {}", key),
                });
            }
        }
        Ok(())
    }

    /// Display configuration as TOML text
    pub fn display(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}
