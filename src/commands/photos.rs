//! One-shot photo commands: add, list, delete
//!
//! Each opens the persisted gallery, performs one mutation the same way the
//! interactive client would (including the relay broadcast), and exits.

use std::path::PathBuf;

use crate::cli::{AddArgs, DeleteArgs, ListArgs, OutputFormat};
use crate::commands::{runtime, CommandContext};
use crate::error::{GalleryError, Result};
use crate::gallery::{Gallery, ViewKind};
use crate::photo::Photo;
use crate::relay::RelaySink;
use crate::source::{ImageProbe, PhotoSource};
use crate::store::KeyValueStore;

/// Interpret a command-line argument as a photo source
pub fn parse_source(arg: &str) -> PhotoSource {
    if arg.starts_with("http://") || arg.starts_with("https://") {
        PhotoSource::Url(arg.to_string())
    } else {
        PhotoSource::File {
            path: PathBuf::from(arg),
            mime: None,
        }
    }
}

/// Run the add command
pub fn run_add(args: &AddArgs, ctx: &CommandContext) -> Result<String> {
    runtime()?.block_on(async {
        let probe = ImageProbe::new(ctx.config.network_timeout())?;
        let url = parse_source(&args.source).resolve(&probe).await?;

        let (relay, _inbound) = ctx.connect_relay().await;
        let mut gallery = Gallery::open(ctx.photo_store(), relay.clone());
        let photo = gallery.commit_photo(url);
        relay.shutdown().await;

        let photo = photo?;
        Ok(format!(
            "Added {} as #{} ({})\n",
            photo.display_src(),
            gallery.active().len() - 1,
            photo.id
        ))
    })
}

/// Run the list command
pub fn run_list(args: &ListArgs, ctx: &CommandContext) -> Result<String> {
    let stored = ctx.photo_store().load();
    let (view, photos) = if args.deleted {
        (ViewKind::Deleted, stored.deleted)
    } else {
        (ViewKind::Gallery, stored.active)
    };

    match args.format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&photos)
                .map(|json| json + "\n")
                .map_err(|e| GalleryError::Storage {
                    message: format!("JSON serialization failed: {}", e),
                })
        }
        OutputFormat::Text => Ok(format_listing(view, &photos)),
    }
}

fn format_listing(view: ViewKind, photos: &[Photo]) -> String {
    let mut output = format!("{}: {} photo(s)\n", view, photos.len());
    for (index, photo) in photos.iter().enumerate() {
        output.push_str(&format!(
            "  {:>3}  {}  {}\n",
            index,
            photo.date,
            photo.display_src()
        ));
    }
    output
}

/// Run the delete command
pub fn run_delete(args: &DeleteArgs, ctx: &CommandContext) -> Result<String> {
    let view = if args.deleted {
        ViewKind::Deleted
    } else {
        ViewKind::Gallery
    };

    runtime()?.block_on(async {
        let (relay, _inbound) = ctx.connect_relay().await;
        let mut gallery = Gallery::open(ctx.photo_store(), relay.clone());
        let result = delete_and_describe(&mut gallery, view, args.index);
        relay.shutdown().await;
        result
    })
}

fn delete_and_describe<S: KeyValueStore, R: RelaySink>(
    gallery: &mut Gallery<S, R>,
    view: ViewKind,
    index: usize,
) -> Result<String> {
    let photo = gallery.delete(view, index)?;
    let outcome = match view {
        ViewKind::Gallery => "moved to recently deleted",
        ViewKind::Deleted => "permanently deleted",
    };
    Ok(format!("{} {}\n", photo.display_src(), outcome))
}
