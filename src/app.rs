//! Root controller
//!
//! [`GalleryApp`] wires the input layer, the gallery, and a renderer
//! together. It runs on one task: user input, inbound relay messages, and
//! completed background work (URL probes, file reads, downloads) are handled
//! strictly one at a time, and each is followed by a full re-render.
//!
//! Background work lives in a [`JoinSet`] and is never cancelled. Two adds
//! started back to back may complete in either order; each commits on its
//! own when it finishes.

use std::path::PathBuf;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::download::download_image;
use crate::error::{GalleryError, Result};
use crate::gallery::Gallery;
use crate::input::{Command, InputEvent, InputLayer};
use crate::relay::{Inbound, RelayMessage, RelaySink};
use crate::source::{ImageProbe, PhotoSource};
use crate::store::KeyValueStore;
use crate::view::{project, Renderer, ViewModel};

/// Result of a background operation, handed back to the controller
#[derive(Debug)]
pub enum Completion {
    /// A photo source finished resolving to a storable URL
    Resolved { source: String, result: Result<String> },
    /// A download finished writing (or failed to write) a file
    Downloaded(Result<PathBuf>),
}

pub struct GalleryApp<S, R, V> {
    gallery: Gallery<S, R>,
    input: InputLayer,
    renderer: V,
    probe: ImageProbe,
    download_dir: PathBuf,
    pending: JoinSet<Completion>,
}

impl<S, R, V> GalleryApp<S, R, V>
where
    S: KeyValueStore,
    R: RelaySink,
    V: Renderer,
{
    pub fn new(
        gallery: Gallery<S, R>,
        input: InputLayer,
        renderer: V,
        probe: ImageProbe,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            gallery,
            input,
            renderer,
            probe,
            download_dir: download_dir.into(),
            pending: JoinSet::new(),
        }
    }

    pub fn gallery(&self) -> &Gallery<S, R> {
        &self.gallery
    }

    pub fn renderer(&self) -> &V {
        &self.renderer
    }

    /// Number of adds and downloads still in flight
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn view_model(&self) -> ViewModel {
        project(&self.gallery)
    }

    /// Draw the initial frame
    pub fn start(&mut self) {
        self.render();
    }

    /// Handle one raw interaction event
    pub fn handle_input(&mut self, event: InputEvent) {
        let screen = self.view_model();
        for command in self.input.translate(event, &screen) {
            self.execute(command);
        }
        self.render();
    }

    /// Handle one message relayed from a peer
    ///
    /// The change stays applied in memory even when saving it fails.
    pub fn handle_remote(&mut self, message: RelayMessage) {
        if let Err(e) = self.gallery.apply_remote(message) {
            self.report(e);
        }
        self.render();
    }

    /// Handle a finished background operation
    pub fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Resolved { source, result } => match result {
                Ok(url) => {
                    if let Err(e) = self.gallery.commit_photo(url) {
                        self.report(e);
                    }
                }
                Err(e) => {
                    tracing::debug!("Could not add {}", source);
                    self.report(e);
                }
            },
            Completion::Downloaded(Ok(path)) => {
                tracing::info!("Saved {}", path.display());
            }
            Completion::Downloaded(Err(e)) => self.report(e),
        }
        self.render();
    }

    /// Wait for every pending operation and handle its completion
    pub async fn settle(&mut self) {
        while let Some(completion) = self.next_completion().await {
            self.handle_completion(completion);
        }
    }

    /// Event loop: runs until `inputs` closes, then settles pending work
    ///
    /// A closed relay inbound only means the client is offline; the loop
    /// keeps serving local input.
    pub async fn run(&mut self, mut inputs: mpsc::Receiver<InputEvent>, mut remote: Inbound) {
        self.start();
        let mut relay_open = true;
        loop {
            tokio::select! {
                event = inputs.recv() => match event {
                    Some(event) => self.handle_input(event),
                    None => break,
                },

                message = remote.recv(), if relay_open => match message {
                    Some(message) => self.handle_remote(message),
                    None => {
                        tracing::debug!("Relay inbound closed");
                        relay_open = false;
                    }
                },

                Some(joined) = self.pending.join_next(), if !self.pending.is_empty() => {
                    match joined {
                        Ok(completion) => self.handle_completion(completion),
                        Err(e) => tracing::error!("Background task failed: {}", e),
                    }
                }
            }
        }
        self.settle().await;
    }

    fn execute(&mut self, command: Command) {
        let outcome = match command {
            Command::Add(source) => {
                self.spawn_resolve(source);
                Ok(())
            }
            Command::OpenModal(index) => self.gallery.open_modal(index),
            Command::CloseModal => {
                self.gallery.close_modal();
                Ok(())
            }
            Command::Navigate(direction) => {
                self.gallery.navigate(direction);
                Ok(())
            }
            Command::SwitchView(view) => {
                self.gallery.switch_view(view);
                Ok(())
            }
            Command::DeleteCurrent => self.gallery.delete_current().map(|_| ()),
            Command::DownloadCurrent => self.spawn_download(),
            Command::Reorder(order) => self.gallery.reorder(&order),
        };
        if let Err(e) = outcome {
            self.report(e);
        }
    }

    fn spawn_resolve(&mut self, source: PhotoSource) {
        let probe = self.probe.clone();
        let description = source.describe();
        tracing::debug!("Resolving {}", description);
        self.pending.spawn(async move {
            Completion::Resolved {
                source: description,
                result: source.resolve(&probe).await,
            }
        });
    }

    fn spawn_download(&mut self) -> Result<()> {
        let photo = self
            .gallery
            .current_photo()
            .ok_or(GalleryError::NothingSelected)?;
        let src = photo.url.clone();
        let index = self.gallery.current_index();
        let client = self.probe.client().clone();
        let dir = self.download_dir.clone();
        self.pending.spawn(async move {
            Completion::Downloaded(download_image(&client, &src, index, &dir).await)
        });
        Ok(())
    }

    async fn next_completion(&mut self) -> Option<Completion> {
        loop {
            match self.pending.join_next().await? {
                Ok(completion) => return Some(completion),
                Err(e) => tracing::error!("Background task failed: {}", e),
            }
        }
    }

    fn report(&mut self, error: GalleryError) {
        tracing::warn!("{}", error);
        self.renderer.alert(&error.to_string());
    }

    fn render(&mut self) {
        let model = project(&self.gallery);
        self.renderer.render(&model);
    }
}
