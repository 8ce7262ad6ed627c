//! Where new photos come from
//!
//! Resolving a source is the only part of adding a photo that suspends: a
//! URL is probed over HTTP, a file is read from disk, and raw bytes are
//! encoded into a `data:` URL. Resolution borrows no gallery state, so
//! several can be in flight at once; each ends in an independent
//! [`crate::gallery::Gallery::commit_photo`].

use std::path::PathBuf;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{GalleryError, Result};

/// Something the user asked to add
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoSource {
    /// Remote image; must answer a GET with a success status
    Url(String),
    /// Image bytes already in memory (paste, dropped blob)
    Bytes { data: Vec<u8>, mime: Option<String> },
    /// Image file chosen or dropped by the user; `mime` is the type the
    /// platform reported for it, if any
    File { path: PathBuf, mime: Option<String> },
}

impl PhotoSource {
    /// Turn the source into the URL stored in the gallery
    pub async fn resolve(self, probe: &ImageProbe) -> Result<String> {
        match self {
            Self::Url(url) => {
                probe.check(&url).await?;
                Ok(url)
            }
            Self::Bytes { data, mime } => Ok(to_data_url(&data, mime.as_deref(), None)),
            Self::File { path, mime } => {
                let data = tokio::fs::read(&path).await?;
                let guessed = mime_guess::from_path(&path).first().map(|m| m.to_string());
                Ok(to_data_url(&data, mime.as_deref(), guessed.as_deref()))
            }
        }
    }

    /// Short description for logs
    pub fn describe(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::Bytes { data, .. } => format!("{} pasted bytes", data.len()),
            Self::File { path, .. } => path.display().to_string(),
        }
    }
}

/// Encode bytes as `data:<mime>;base64,<payload>`
///
/// The media type is the caller's, else sniffed from the bytes, else the
/// fallback (usually guessed from a file name), else
/// `application/octet-stream`.
pub fn to_data_url(data: &[u8], mime: Option<&str>, fallback: Option<&str>) -> String {
    let mime = mime
        .map(str::to_string)
        .or_else(|| infer::get(data).map(|kind| kind.mime_type().to_string()))
        .or_else(|| fallback.map(str::to_string))
        .unwrap_or_else(|| "application/octet-stream".to_string());
    format!("data:{};base64,{}", mime, STANDARD.encode(data))
}

/// Lightweight existence check for image URLs
#[derive(Debug, Clone)]
pub struct ImageProbe {
    client: reqwest::Client,
}

impl ImageProbe {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GalleryError::ConfigError {
                message: format!("Failed to build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Succeeds when a GET for `url` answers with a 2xx status
    ///
    /// Only the response head is awaited; the body is never read.
    pub async fn check(&self, url: &str) -> Result<()> {
        let unreachable = |reason: String| GalleryError::UnreachableImage {
            url: url.to_string(),
            reason,
        };
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| unreachable(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(unreachable(status.to_string()))
        }
    }
}
