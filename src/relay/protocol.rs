//! Relay protocol message types
//!
//! Every frame is a JSON text message over WebSocket:
//!
//! ```json
//! {"type": "added", "payload": {"id": "...", "url": "https://...", "date": "..."}}
//! {"type": "deleted", "payload": {"url": "https://...", "fromGallery": true, "id": "..."}}
//! {"type": "order-changed", "payload": [{"id": "...", "url": "...", "date": "..."}]}
//! ```
//!
//! The same three kinds flow in both directions. Delivery is fire-and-forget:
//! there are no acknowledgements and no ordering guarantee across clients.

use serde::{Deserialize, Serialize};

use crate::photo::{Photo, PhotoId};

/// A gallery mutation mirrored between clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum RelayMessage {
    /// A photo was appended to the sender's active list
    Added(Photo),
    /// A photo was removed from one of the sender's lists
    Deleted(DeletedPayload),
    /// The sender's active list was reordered; replaces the receiver's wholesale
    OrderChanged(Vec<Photo>),
}

impl RelayMessage {
    /// Wire name of the message kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Added(_) => "added",
            Self::Deleted(_) => "deleted",
            Self::OrderChanged(_) => "order-changed",
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Payload of a `deleted` message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedPayload {
    pub url: String,
    /// `true`: moved from active to deleted. `false`: purged from deleted.
    pub from_gallery: bool,
    /// Absent when sent by peers that predate photo ids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<PhotoId>,
}
