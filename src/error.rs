//! Error types and exit codes for shared-gallery

use std::process::ExitCode;
use thiserror::Error;

use crate::gallery::ViewKind;

/// Main error type for gallery operations
///
/// Every variant ends up in front of the user through the same alert
/// surface ([`crate::view::Renderer::alert`]); none of them is fatal to a
/// running client.
#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Invalid image URL: {url} ({reason})")]
    UnreachableImage { url: String, reason: String },

    #[error("Download failed: {message}")]
    DownloadFailed { message: String },

    #[error("No photo at index {index} in {view} ({len} photos)")]
    IndexOutOfRange {
        view: ViewKind,
        index: usize,
        len: usize,
    },

    #[error("Reorder does not match the current gallery: {message}")]
    InvalidOrder { message: String },

    #[error("No photo is open")]
    NothingSelected,

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Config error: {message}")]
    ConfigError { message: String },

    #[error("Relay error: {message}")]
    Relay { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GalleryError {
    /// Convert error to an exit code for one-shot CLI commands:
    /// - 1: IO / storage failure
    /// - 2: Unreachable image or failed download
    /// - 3: Bad index or order
    /// - 4: Configuration error
    /// - 5: Relay unavailable
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Io(_) | Self::Storage { .. } => ExitCode::from(1),
            Self::UnreachableImage { .. } | Self::DownloadFailed { .. } => ExitCode::from(2),
            Self::IndexOutOfRange { .. } | Self::InvalidOrder { .. } | Self::NothingSelected => {
                ExitCode::from(3)
            }
            Self::ConfigError { .. } => ExitCode::from(4),
            Self::Relay { .. } => ExitCode::from(5),
        }
    }
}

/// Result type alias for gallery operations
pub type Result<T> = std::result::Result<T, GalleryError>;
