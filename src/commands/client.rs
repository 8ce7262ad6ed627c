//! Client command handler - Run the interactive gallery
//!
//! The client renders frames to stdout and reads console commands from
//! stdin. Everything runs on a single-threaded runtime so gallery state is
//! only ever touched from the controller loop.

use tokio::io::BufReader;
use tokio::sync::mpsc;

use crate::app::GalleryApp;
use crate::cli::ClientArgs;
use crate::commands::{runtime, CommandContext};
use crate::error::Result;
use crate::gallery::Gallery;
use crate::input::{console, InputLayer};
use crate::relay::RelayChannel;
use crate::source::ImageProbe;
use crate::view::TextRenderer;

/// Run the client command
pub fn run_client(args: &ClientArgs, ctx: &CommandContext) -> Result<String> {
    runtime()?.block_on(run_client_async(args, ctx))?;
    Ok(String::new())
}

async fn run_client_async(args: &ClientArgs, ctx: &CommandContext) -> Result<()> {
    let (relay, inbound) = match &ctx.relay_url {
        Some(url) => RelayChannel::connect(url),
        None => {
            let (_closed, inbound) = mpsc::unbounded_channel();
            (RelayChannel::disconnected(), inbound)
        }
    };

    let store = ctx.photo_store();
    tracing::info!("Gallery data in {}", store.backend().dir().display());
    let gallery = Gallery::open(store, relay.clone());

    let threshold = args
        .swipe_threshold
        .unwrap_or(ctx.config.input.swipe_threshold_px);
    let download_dir = args
        .download_dir
        .clone()
        .unwrap_or_else(|| ctx.config.download_dir());
    let probe = ImageProbe::new(ctx.config.network_timeout())?;

    let mut app = GalleryApp::new(
        gallery,
        InputLayer::new(threshold),
        TextRenderer::new(std::io::stdout()),
        probe,
        download_dir,
    );

    let (events_tx, events_rx) = mpsc::channel(32);
    let stdin = BufReader::new(tokio::io::stdin());
    tokio::spawn(console::read_commands(stdin, events_tx));

    app.run(events_rx, inbound).await;
    relay.shutdown().await;
    Ok(())
}
