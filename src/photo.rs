//! Photo records
//!
//! A record is a URL (remote `http(s)` or an embedded `data:` URL) plus the
//! time it was added. Each record also carries a synthetic [`PhotoId`] so
//! that reorder and delete never have to match records by URL alone.

use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier assigned when a photo is first added
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoId(Uuid);

impl PhotoId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PhotoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single gallery entry
///
/// Records written by peers that predate ids deserialize with a fresh id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    #[serde(default)]
    pub id: PhotoId,
    pub url: String,
    /// ISO 8601 UTC timestamp, millisecond precision
    pub date: String,
}

impl Photo {
    /// Create a record for `url` stamped with the current time
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            id: PhotoId::new(),
            url: url.into(),
            date: now_timestamp(),
        }
    }

    pub fn is_data_url(&self) -> bool {
        self.url.starts_with("data:")
    }

    /// Short form of the URL for text output
    ///
    /// Data URLs are reduced to their media type and payload size.
    pub fn display_src(&self) -> String {
        display_src(&self.url)
    }
}

/// Current time as `2024-01-01T12:00:00.000Z`
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn display_src(url: &str) -> String {
    let Some(rest) = url.strip_prefix("data:") else {
        return url.to_string();
    };
    let (header, payload) = rest.split_once(',').unwrap_or((rest, ""));
    let mime = header.split(';').next().unwrap_or("");
    let mime = if mime.is_empty() { "text/plain" } else { mime };
    format!("data:{} ({} bytes)", mime, payload.len() * 3 / 4)
}
