//! Save the photo shown in the modal to disk
//!
//! Remote images are fetched again; data URLs are decoded in place. Failures
//! are reported once and never retried.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{GalleryError, Result};

/// Fetch `src` and write it to `dir/image_<index + 1>.<ext>`
pub async fn download_image(
    client: &reqwest::Client,
    src: &str,
    index: usize,
    dir: &Path,
) -> Result<PathBuf> {
    let bytes = if src.starts_with("data:") {
        decode_data_url(src)?
    } else {
        fetch(client, src).await?
    };

    let extension = infer::get(&bytes)
        .map(|kind| kind.extension())
        .unwrap_or("jpg");
    let path = dir.join(format!("image_{}.{}", index + 1, extension));

    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(&path, &bytes).await?;
    tracing::info!("Downloaded {} bytes to {}", bytes.len(), path.display());
    Ok(path)
}

async fn fetch(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    let failed = |e: reqwest::Error| GalleryError::DownloadFailed {
        message: format!("{}: {}", url, e),
    };
    let response = client
        .get(url)
        .send()
        .await
        .map_err(failed)?
        .error_for_status()
        .map_err(failed)?;
    let bytes = response.bytes().await.map_err(failed)?;
    Ok(bytes.to_vec())
}

fn decode_data_url(src: &str) -> Result<Vec<u8>> {
    let invalid = |message: &str| GalleryError::DownloadFailed {
        message: message.to_string(),
    };
    let (header, payload) = src
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or_else(|| invalid("malformed data URL"))?;
    if !header.ends_with(";base64") {
        return Err(invalid("only base64 data URLs can be saved"));
    }
    STANDARD
        .decode(payload)
        .map_err(|e| invalid(&format!("bad base64 payload: {}", e)))
}
