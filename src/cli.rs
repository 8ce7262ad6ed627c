//! CLI argument definitions using clap with subcommand architecture
//!
//! `client` runs the interactive gallery; the other subcommands are one-shot
//! operations against the same persisted gallery and relay.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Photo gallery that stays in sync across connected clients
#[derive(Parser, Debug)]
#[command(name = "shared-gallery")]
#[command(about = "Local-first photo gallery mirrored between clients through a relay")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "SHARED_GALLERY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory holding the persisted gallery
    #[arg(long, global = true, env = "SHARED_GALLERY_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Relay WebSocket URL, e.g. ws://127.0.0.1:3000/ws
    #[arg(long, global = true, env = "SHARED_GALLERY_RELAY_URL")]
    pub relay_url: Option<String>,

    /// Work without a relay connection
    #[arg(long, global = true)]
    pub offline: bool,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the interactive gallery client (commands on stdin)
    #[command(visible_alias = "c")]
    Client(ClientArgs),

    /// Add one photo from a URL or an image file
    Add(AddArgs),

    /// List the photos in the gallery or in recently deleted
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Delete one photo by index
    #[command(visible_alias = "rm")]
    Delete(DeleteArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

// ============================================
// Client Subcommand
// ============================================

#[derive(Args, Debug)]
pub struct ClientArgs {
    /// Directory downloads are saved to
    #[arg(long)]
    pub download_dir: Option<PathBuf>,

    /// Swipe distance in pixels that triggers navigation
    #[arg(long)]
    pub swipe_threshold: Option<f64>,
}

// ============================================
// One-shot Subcommands
// ============================================

#[derive(Args, Debug)]
pub struct AddArgs {
    /// http(s) URL of an image, or a path to an image file
    #[arg(value_name = "URL|PATH")]
    pub source: String,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// List recently deleted photos instead of the gallery
    #[arg(long)]
    pub deleted: bool,

    /// Output format
    #[arg(short, long, default_value = "text", value_enum)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Position of the photo, starting at 0
    pub index: usize,

    /// Delete from recently deleted (permanently)
    #[arg(long)]
    pub deleted: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

// ============================================
// Config Subcommand
// ============================================

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Config operation: show, set, reset
    #[command(subcommand)]
    pub operation: ConfigOperation,
}

/// Config subcommand operations
#[derive(Subcommand, Debug)]
pub enum ConfigOperation {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., relay.url, logging.level)
        key: String,
        /// Value to set
        value: String,
    },

    /// Reset configuration to defaults
    Reset,
}
