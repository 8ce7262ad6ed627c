//! Gallery State Manager
//!
//! Owns the two ordered photo sequences and the modal selection. Every
//! mutation is persisted in full before it is announced on the relay, and
//! remote mutations are applied by the same rules without being re-announced.
//!
//! There is no conflict resolution: when two clients mutate concurrently the
//! last event applied wins structurally, and nothing guarantees that clients
//! converge.

use std::collections::HashMap;
use std::fmt;

use crate::error::{GalleryError, Result};
use crate::photo::{Photo, PhotoId};
use crate::relay::{DeletedPayload, RelayMessage, RelaySink};
use crate::store::{KeyValueStore, PhotoStore};

/// Which of the two sequences a view or operation refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKind {
    /// The visible, user-orderable gallery
    Gallery,
    /// The recently-deleted bin, newest first
    Deleted,
}

impl ViewKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Gallery => "gallery",
            Self::Deleted => "recently deleted",
        }
    }

    /// Parse `gallery` / `deleted` (as typed on the console)
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "gallery" | "photos" => Some(Self::Gallery),
            "deleted" | "recently-deleted" | "trash" => Some(Self::Deleted),
            _ => None,
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Modal navigation step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    fn step(self) -> i64 {
        match self {
            Self::Previous => -1,
            Self::Next => 1,
        }
    }
}

/// Gallery state plus its persistence and relay collaborators
pub struct Gallery<S, R> {
    active: Vec<Photo>,
    deleted: Vec<Photo>,
    current_index: usize,
    view: ViewKind,
    modal_open: bool,
    store: PhotoStore<S>,
    relay: R,
}

impl<S: KeyValueStore, R: RelaySink> Gallery<S, R> {
    /// Open a gallery from whatever the store currently holds
    pub fn open(store: PhotoStore<S>, relay: R) -> Self {
        let stored = store.load();
        tracing::debug!(
            "Opened gallery: {} active, {} deleted",
            stored.active.len(),
            stored.deleted.len()
        );
        Self {
            active: stored.active,
            deleted: stored.deleted,
            current_index: 0,
            view: ViewKind::Gallery,
            modal_open: false,
            store,
            relay,
        }
    }

    pub fn active(&self) -> &[Photo] {
        &self.active
    }

    pub fn deleted(&self) -> &[Photo] {
        &self.deleted
    }

    pub fn photos(&self, view: ViewKind) -> &[Photo] {
        match view {
            ViewKind::Gallery => &self.active,
            ViewKind::Deleted => &self.deleted,
        }
    }

    pub fn view(&self) -> ViewKind {
        self.view
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_modal_open(&self) -> bool {
        self.modal_open
    }

    /// Photo shown in the modal, if the modal is open
    pub fn current_photo(&self) -> Option<&Photo> {
        if !self.modal_open {
            return None;
        }
        self.photos(self.view).get(self.current_index)
    }

    // ========================================================================
    // Local mutations
    // ========================================================================

    /// Append a photo whose URL has already been resolved
    ///
    /// This is the synchronous tail of adding a photo; see
    /// [`crate::source::PhotoSource::resolve`] for the part that suspends.
    pub fn commit_photo(&mut self, url: impl Into<String>) -> Result<Photo> {
        let photo = Photo::new(url);
        self.active.push(photo.clone());
        tracing::info!("Added photo {} ({})", photo.id, photo.display_src());
        let saved = self.persist();
        self.relay.emit(&RelayMessage::Added(photo.clone()));
        saved.map(|_| photo)
    }

    /// Replace the active list with the given ordering of its ids
    pub fn reorder(&mut self, order: &[PhotoId]) -> Result<()> {
        if order.len() != self.active.len() {
            return Err(GalleryError::InvalidOrder {
                message: format!(
                    "expected {} photos, got {}",
                    self.active.len(),
                    order.len()
                ),
            });
        }

        let mut by_id: HashMap<PhotoId, Vec<Photo>> = HashMap::new();
        for photo in &self.active {
            by_id.entry(photo.id).or_default().push(photo.clone());
        }
        let mut reordered = Vec::with_capacity(order.len());
        for id in order {
            let photo = by_id
                .get_mut(id)
                .and_then(|bucket| bucket.pop())
                .ok_or_else(|| GalleryError::InvalidOrder {
                    message: format!("unknown or repeated photo {}", id),
                })?;
            reordered.push(photo);
        }

        self.active = reordered;
        let saved = self.persist();
        self.relay
            .emit(&RelayMessage::OrderChanged(self.active.clone()));
        saved
    }

    /// Delete the photo at `index` of `view`
    ///
    /// From the gallery the photo moves to the front of the deleted bin; from
    /// the bin it is gone for good. Closes the modal.
    pub fn delete(&mut self, view: ViewKind, index: usize) -> Result<Photo> {
        let len = self.photos(view).len();
        if index >= len {
            return Err(GalleryError::IndexOutOfRange { view, index, len });
        }

        let photo = match view {
            ViewKind::Gallery => {
                let photo = self.active.remove(index);
                self.deleted.insert(0, photo.clone());
                photo
            }
            ViewKind::Deleted => self.deleted.remove(index),
        };
        tracing::info!("Deleted photo {} from {}", photo.id, view);

        self.modal_open = false;
        self.clamp_selection();
        let saved = self.persist();
        self.relay.emit(&RelayMessage::Deleted(DeletedPayload {
            url: photo.url.clone(),
            from_gallery: view == ViewKind::Gallery,
            id: Some(photo.id),
        }));
        saved.map(|_| photo)
    }

    /// Delete whatever the modal currently shows
    pub fn delete_current(&mut self) -> Result<Photo> {
        if self.current_photo().is_none() {
            return Err(GalleryError::NothingSelected);
        }
        self.delete(self.view, self.current_index)
    }

    // ========================================================================
    // Remote mutations
    // ========================================================================

    /// Mirror a peer's mutation onto local state
    ///
    /// Applied events are persisted but never re-emitted.
    pub fn apply_remote(&mut self, message: RelayMessage) -> Result<()> {
        tracing::debug!("Applying remote '{}'", message.kind());
        match message {
            RelayMessage::Added(photo) => {
                self.active.push(photo);
            }
            RelayMessage::Deleted(payload) => {
                let list = if payload.from_gallery {
                    &self.active
                } else {
                    &self.deleted
                };
                let Some(index) = find_photo(list, payload.id, &payload.url) else {
                    tracing::debug!("Remote delete of unknown photo {}", payload.url);
                    return Ok(());
                };
                if payload.from_gallery {
                    let photo = self.active.remove(index);
                    self.deleted.insert(0, photo);
                } else {
                    self.deleted.remove(index);
                }
            }
            RelayMessage::OrderChanged(photos) => {
                self.active = photos;
            }
        }
        self.clamp_selection();
        self.persist()
    }

    // ========================================================================
    // Selection and view
    // ========================================================================

    /// Step the selection, wrapping at both ends
    ///
    /// Returns `None` (and changes nothing) when the current view is empty.
    pub fn navigate(&mut self, direction: Direction) -> Option<usize> {
        let len = self.photos(self.view).len();
        if len == 0 {
            return None;
        }
        let next = (self.current_index as i64 + direction.step()).rem_euclid(len as i64);
        self.current_index = next as usize;
        Some(self.current_index)
    }

    pub fn switch_view(&mut self, view: ViewKind) {
        self.view = view;
        self.clamp_selection();
    }

    /// Open the modal on `index` of the current view
    pub fn open_modal(&mut self, index: usize) -> Result<()> {
        let len = self.photos(self.view).len();
        if index >= len {
            return Err(GalleryError::IndexOutOfRange {
                view: self.view,
                index,
                len,
            });
        }
        self.current_index = index;
        self.modal_open = true;
        Ok(())
    }

    pub fn close_modal(&mut self) {
        self.modal_open = false;
    }

    /// Keep `current_index` inside the current view after its list shrank
    fn clamp_selection(&mut self) {
        let len = self.photos(self.view).len();
        if len == 0 {
            self.current_index = 0;
            self.modal_open = false;
        } else if self.current_index >= len {
            self.current_index = len - 1;
        }
    }

    fn persist(&self) -> Result<()> {
        self.store.save(&self.active, &self.deleted).map_err(|e| {
            tracing::error!("Failed to persist gallery: {}", e);
            e
        })
    }
}

/// Locate a record by id, falling back to the first exact URL match
fn find_photo(list: &[Photo], id: Option<PhotoId>, url: &str) -> Option<usize> {
    id.and_then(|id| list.iter().position(|p| p.id == id))
        .or_else(|| list.iter().position(|p| p.url == url))
}
