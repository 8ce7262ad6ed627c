//! Input/Interaction Layer
//!
//! Translates raw interaction events into [`Command`]s for the root
//! controller. The only state kept here is the start of a touch gesture;
//! whether the modal is open (which gates keyboard and touch navigation) is
//! read from the last rendered [`ViewModel`].

pub mod console;

use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::gallery::{Direction, ViewKind};
use crate::photo::PhotoId;
use crate::source::PhotoSource;
use crate::view::ViewModel;

/// Minimum horizontal travel, in pixels, for a swipe to navigate
pub const DEFAULT_SWIPE_THRESHOLD_PX: f64 = 50.0;

static IMAGE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(jpg|jpeg|png|gif|webp)$").expect("valid image URL pattern"));

/// Whether dropped text looks like an image link
pub fn is_image_url(text: &str) -> bool {
    IMAGE_URL.is_match(text)
}

/// Raw interaction events
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// URL typed into the add field
    UrlSubmitted(String),
    /// Files picked with the file chooser
    FilesChosen(Vec<PathBuf>),
    /// Items dropped onto the drop zone
    Dropped(Vec<DropItem>),
    /// Clipboard contents pasted anywhere
    Pasted(Vec<ClipboardItem>),
    /// A grid card was clicked
    CardClicked(usize),
    /// A grid card was dragged from one slot to another
    CardDragged { from: usize, to: usize },
    SwitchView(ViewKind),
    ModalPrev,
    ModalNext,
    ModalClose,
    DeleteCurrent,
    DownloadCurrent,
    TouchStart { x: f64 },
    TouchMove { x: f64 },
    TouchEnd,
    Key(Key),
}

#[derive(Debug, Clone, PartialEq)]
pub enum DropItem {
    File { path: PathBuf, mime: Option<String> },
    Bytes { data: Vec<u8>, mime: String },
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClipboardItem {
    pub mime: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Escape,
    Other,
}

/// Gallery operations requested by the user
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add(PhotoSource),
    OpenModal(usize),
    CloseModal,
    Navigate(Direction),
    SwitchView(ViewKind),
    DeleteCurrent,
    DownloadCurrent,
    Reorder(Vec<PhotoId>),
}

pub struct InputLayer {
    swipe_threshold: f64,
    touch_start_x: Option<f64>,
}

impl Default for InputLayer {
    fn default() -> Self {
        Self::new(DEFAULT_SWIPE_THRESHOLD_PX)
    }
}

impl InputLayer {
    pub fn new(swipe_threshold: f64) -> Self {
        Self {
            swipe_threshold,
            touch_start_x: None,
        }
    }

    /// Translate one event against what is currently on screen
    pub fn translate(&mut self, event: InputEvent, screen: &ViewModel) -> Vec<Command> {
        let modal_open = screen.is_modal_open();
        match event {
            InputEvent::UrlSubmitted(url) => {
                let url = url.trim();
                if url.is_empty() {
                    Vec::new()
                } else {
                    vec![Command::Add(PhotoSource::Url(url.to_string()))]
                }
            }
            InputEvent::FilesChosen(paths) => paths
                .into_iter()
                .map(|path| Command::Add(PhotoSource::File { path, mime: None }))
                .collect(),
            InputEvent::Dropped(items) => items.into_iter().filter_map(translate_drop).collect(),
            InputEvent::Pasted(items) => items
                .into_iter()
                .filter(|item| item.mime.starts_with("image/"))
                .map(|item| {
                    Command::Add(PhotoSource::Bytes {
                        data: item.data,
                        mime: Some(item.mime),
                    })
                })
                .collect(),
            InputEvent::CardClicked(index) => vec![Command::OpenModal(index)],
            InputEvent::CardDragged { from, to } => reorder_cards(screen, from, to)
                .map(Command::Reorder)
                .into_iter()
                .collect(),
            InputEvent::SwitchView(view) => vec![Command::SwitchView(view)],
            InputEvent::ModalPrev if modal_open => vec![Command::Navigate(Direction::Previous)],
            InputEvent::ModalNext if modal_open => vec![Command::Navigate(Direction::Next)],
            InputEvent::ModalClose if modal_open => vec![Command::CloseModal],
            InputEvent::DeleteCurrent if modal_open => vec![Command::DeleteCurrent],
            InputEvent::DownloadCurrent if modal_open => vec![Command::DownloadCurrent],
            InputEvent::Key(key) if modal_open => match key {
                Key::ArrowLeft => vec![Command::Navigate(Direction::Previous)],
                Key::ArrowRight => vec![Command::Navigate(Direction::Next)],
                Key::Escape => vec![Command::CloseModal],
                Key::Other => Vec::new(),
            },
            InputEvent::TouchStart { x } if modal_open => {
                self.touch_start_x = Some(x);
                Vec::new()
            }
            InputEvent::TouchMove { x } if modal_open => self.swipe(x).into_iter().collect(),
            InputEvent::TouchEnd => {
                self.touch_start_x = None;
                Vec::new()
            }
            // Modal controls and keys do nothing while the modal is closed
            _ => Vec::new(),
        }
    }

    /// One navigation step per gesture once travel exceeds the threshold
    fn swipe(&mut self, x: f64) -> Option<Command> {
        let start = self.touch_start_x?;
        let travel = start - x;
        if travel.abs() <= self.swipe_threshold {
            return None;
        }
        self.touch_start_x = None;
        let direction = if travel > 0.0 {
            Direction::Next
        } else {
            Direction::Previous
        };
        Some(Command::Navigate(direction))
    }
}

fn translate_drop(item: DropItem) -> Option<Command> {
    match item {
        DropItem::File { path, mime } => {
            let is_image = match &mime {
                Some(mime) => mime.starts_with("image/"),
                None => mime_guess::from_path(&path)
                    .first()
                    .is_some_and(|guessed| guessed.type_() == mime_guess::mime::IMAGE),
            };
            is_image.then(|| Command::Add(PhotoSource::File { path, mime }))
        }
        DropItem::Bytes { data, mime } if mime.starts_with("image/") => {
            Some(Command::Add(PhotoSource::Bytes {
                data,
                mime: Some(mime),
            }))
        }
        DropItem::Bytes { .. } => None,
        DropItem::Text(text) => {
            let text = text.trim();
            is_image_url(text).then(|| Command::Add(PhotoSource::Url(text.to_string())))
        }
    }
}

/// Card ids after moving the card at `from` to slot `to`
///
/// Only the gallery is reorderable; the deleted bin keeps its order.
fn reorder_cards(screen: &ViewModel, from: usize, to: usize) -> Option<Vec<PhotoId>> {
    if screen.view != ViewKind::Gallery || from >= screen.grid.len() || from == to {
        return None;
    }
    let mut order = screen.card_order();
    let moved = order.remove(from);
    order.insert(to.min(order.len()), moved);
    Some(order)
}
