//! Filesystem helpers shared by the photo store and the config file
//!
//! - `atomic_rename`: replaces a file in one step (Windows requires an explicit delete)
//! - `write_atomic`: temp file + rename, so readers never see a half-written value
//! - `data_base_dir` / `config_base_dir`: platform directories for shared-gallery

use std::io;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "shared-gallery";

/// Cross-platform atomic rename that handles Windows file replacement.
///
/// On Unix, `fs::rename` atomically replaces the target if it exists.
/// On Windows, `fs::rename` fails if the target exists, so the target is
/// deleted first.
pub fn atomic_rename(src: &Path, dst: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        if dst.exists() {
            std::fs::remove_file(dst)?;
        }
    }
    std::fs::rename(src, dst)
}

/// Write `content` to `path` through a sibling temp file.
///
/// Parent directories are created as needed.
pub fn write_atomic(path: &Path, content: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("tmp");
    std::fs::write(&temp_path, content)?;
    atomic_rename(&temp_path, path)
}

/// Directory holding the persisted gallery.
///
/// - **Linux**: `$XDG_DATA_HOME/shared-gallery` or `~/.local/share/shared-gallery`
/// - **macOS**: `~/Library/Application Support/shared-gallery`
/// - **Windows**: `%APPDATA%\shared-gallery`
/// - **Fallback**: system temp directory + `shared-gallery`
pub fn data_base_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}

/// Directory holding `config.toml`.
pub fn config_base_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}
