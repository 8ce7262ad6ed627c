//! shared-gallery: a local-first photo gallery kept in sync through a relay
//!
//! Each client owns its gallery state and persists it on every change.
//! Mutations are broadcast to the other connected clients through a
//! stateless relay server, which re-sends every frame to everyone but its
//! sender. Sync is best-effort: a client without a relay keeps working.
//!
//! # Layout
//!
//! - [`gallery`] - gallery state and its mutations
//! - [`store`] - key-value persistence of the two photo lists
//! - [`relay`] - wire protocol, relay server, and client channel
//! - [`source`] / [`download`] - getting images in and out
//! - [`view`] / [`input`] - rendering and interaction translation
//! - [`app`] - the controller loop tying them together
//!
//! # Example
//!
//! ```ignore
//! use shared_gallery::{Gallery, MemoryStore, PhotoStore, RelayChannel, ViewKind};
//!
//! let mut gallery = Gallery::open(PhotoStore::new(MemoryStore::new()), RelayChannel::disconnected());
//! let photo = gallery.commit_photo("https://example.com/cat.png")?;
//! gallery.delete(ViewKind::Gallery, 0)?;
//! assert_eq!(gallery.deleted()[0].id, photo.id);
//! ```

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod download;
pub mod error;
pub mod fs_utils;
pub mod gallery;
pub mod input;
pub mod photo;
pub mod relay;
pub mod source;
pub mod store;
pub mod view;

// Re-export commonly used types
pub use app::{Completion, GalleryApp};
pub use config::GalleryConfig;
pub use error::{GalleryError, Result};
pub use gallery::{Direction, Gallery, ViewKind};
pub use input::{Command, InputEvent, InputLayer};
pub use photo::{Photo, PhotoId};
pub use relay::{RelayChannel, RelayHub, RelayMessage, RelaySink};
pub use source::{ImageProbe, PhotoSource};
pub use store::{FileStore, KeyValueStore, MemoryStore, PhotoStore};
pub use view::{project, Renderer, TextRenderer, ViewModel};
