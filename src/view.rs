//! View Renderer
//!
//! [`project`] turns gallery state into a [`ViewModel`]; a [`Renderer`]
//! draws it. Every render redraws the whole grid, there is no diffing.

use std::io::Write;

use crate::gallery::{Gallery, ViewKind};
use crate::photo::{display_src, PhotoId};
use crate::relay::RelaySink;
use crate::store::KeyValueStore;

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub view: ViewKind,
    pub toggles: Vec<ViewToggle>,
    /// Cards of the current view only, in display order
    pub grid: Vec<Card>,
    pub modal: Option<ModalView>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewToggle {
    pub view: ViewKind,
    pub count: usize,
    pub highlighted: bool,
}

/// One photo card, bound to its index for click-to-open
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub index: usize,
    pub id: PhotoId,
    pub src: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalView {
    pub index: usize,
    pub total: usize,
    pub src: String,
    /// Prev/next are only useful with more than one photo
    pub can_navigate: bool,
}

impl ViewModel {
    pub fn is_modal_open(&self) -> bool {
        self.modal.is_some()
    }

    /// Ids of the grid cards in their rendered order
    pub fn card_order(&self) -> Vec<PhotoId> {
        self.grid.iter().map(|card| card.id).collect()
    }
}

/// Project the gallery onto a view model
pub fn project<S: KeyValueStore, R: RelaySink>(gallery: &Gallery<S, R>) -> ViewModel {
    let view = gallery.view();
    let photos = gallery.photos(view);

    let toggles = [ViewKind::Gallery, ViewKind::Deleted]
        .into_iter()
        .map(|kind| ViewToggle {
            view: kind,
            count: gallery.photos(kind).len(),
            highlighted: kind == view,
        })
        .collect();

    let grid = photos
        .iter()
        .enumerate()
        .map(|(index, photo)| Card {
            index,
            id: photo.id,
            src: photo.url.clone(),
            date: photo.date.clone(),
        })
        .collect();

    let modal = gallery.current_photo().map(|photo| ModalView {
        index: gallery.current_index(),
        total: photos.len(),
        src: photo.url.clone(),
        can_navigate: photos.len() > 1,
    });

    ViewModel {
        view,
        toggles,
        grid,
        modal,
    }
}

/// Draws view models and shows blocking alerts
pub trait Renderer {
    fn render(&mut self, model: &ViewModel);
    fn alert(&mut self, message: &str);
}

/// Plain-text renderer for terminals and logs
pub struct TextRenderer<W> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, model: &ViewModel) -> std::io::Result<()> {
        writeln!(self.out, "---")?;
        let toggles: Vec<String> = model
            .toggles
            .iter()
            .map(|t| {
                if t.highlighted {
                    format!("[{} ({})]", t.view, t.count)
                } else {
                    format!(" {} ({}) ", t.view, t.count)
                }
            })
            .collect();
        writeln!(self.out, "{}", toggles.join(" "))?;

        if model.grid.is_empty() {
            writeln!(self.out, "  (no photos)")?;
        }
        for card in &model.grid {
            writeln!(
                self.out,
                "  {:>3}  {}  {}",
                card.index,
                card.date,
                display_src(&card.src)
            )?;
        }

        if let Some(modal) = &model.modal {
            let arrows = if modal.can_navigate { "< >" } else { "   " };
            writeln!(
                self.out,
                "modal {}/{} {} {}",
                modal.index + 1,
                modal.total,
                arrows,
                display_src(&modal.src)
            )?;
        }
        self.out.flush()
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, model: &ViewModel) {
        if let Err(e) = self.draw(model) {
            tracing::warn!("Render failed: {}", e);
        }
    }

    fn alert(&mut self, message: &str) {
        if writeln!(self.out, "! {}", message).and_then(|_| self.out.flush()).is_err() {
            tracing::warn!("Alert not shown: {}", message);
        }
    }
}

/// Renderer that keeps every frame and alert, for inspection
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub frames: Vec<ViewModel>,
    pub alerts: Vec<String>,
}

impl RecordingRenderer {
    pub fn last_frame(&self) -> Option<&ViewModel> {
        self.frames.last()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, model: &ViewModel) {
        self.frames.push(model.clone());
    }

    fn alert(&mut self, message: &str) {
        self.alerts.push(message.to_string());
    }
}
