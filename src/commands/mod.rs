//! Command modules for the shared-gallery CLI
//!
//! Each module implements a single top-level command:
//! - `client` - Interactive gallery driven by console commands
//! - `photos` - One-shot add, list, and delete
//! - `config` - Show and edit the configuration file
//!
//! All command handlers take their respective `Args` struct from `cli.rs`
//! and a shared `CommandContext` holding the resolved configuration.

pub mod client;
pub mod config;
pub mod photos;

pub use client::run_client;
pub use config::run_config;
pub use photos::{run_add, run_delete, run_list};

use std::path::PathBuf;

use crate::cli::Cli;
use crate::config::GalleryConfig;
use crate::error::{GalleryError, Result};
use crate::relay::{Inbound, RelayChannel};
use crate::store::{FileStore, PhotoStore};

/// Shared context passed to all command handlers
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Configuration file in effect
    pub config_path: PathBuf,
    /// Configuration with command-line overrides applied
    pub config: GalleryConfig,
    /// Relay to connect to; `None` when running offline
    pub relay_url: Option<String>,
    /// Show verbose output
    pub verbose: bool,
}

impl CommandContext {
    /// Load the config file and apply flags on top of it
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(GalleryConfig::default_path);
        let mut config = GalleryConfig::load_from(&config_path)?;

        if let Some(dir) = &cli.data_dir {
            config.storage.dir = Some(dir.clone());
        }
        if let Some(url) = &cli.relay_url {
            config.relay.url = url.clone();
        }
        let relay_url = (!cli.offline).then(|| config.relay.url.clone());

        Ok(Self {
            config_path,
            config,
            relay_url,
            verbose: cli.verbose,
        })
    }

    /// Log level for the tracing subscriber
    pub fn log_level(&self) -> &str {
        if self.verbose {
            "debug"
        } else {
            &self.config.logging.level
        }
    }

    pub fn photo_store(&self) -> PhotoStore<FileStore> {
        PhotoStore::new(FileStore::new(self.config.storage_dir()))
    }

    /// Connect to the relay and wait for the handshake
    ///
    /// An unreachable or unresponsive relay is not an error: the command
    /// continues offline once the network timeout has passed.
    pub async fn connect_relay(&self) -> (RelayChannel, Option<Inbound>) {
        let Some(url) = &self.relay_url else {
            return (RelayChannel::disconnected(), None);
        };
        let timeout = self.config.network_timeout();
        match tokio::time::timeout(timeout, RelayChannel::connect_now(url)).await {
            Ok(Ok((channel, inbound))) => (channel, Some(inbound)),
            Ok(Err(e)) => {
                tracing::warn!("{}; changes will not reach other clients", e);
                (RelayChannel::disconnected(), None)
            }
            Err(_) => {
                tracing::warn!(
                    "Relay {} did not answer within {}s; changes will not reach other clients",
                    url,
                    timeout.as_secs()
                );
                (RelayChannel::disconnected(), None)
            }
        }
    }
}

/// Current-thread runtime for async commands
pub(crate) fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| GalleryError::ConfigError {
            message: format!("Failed to create tokio runtime: {}", e),
        })
}
