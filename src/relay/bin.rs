//! Shared Gallery Relay Binary
//!
//! Serves the static front end and re-broadcasts gallery events between
//! connected clients. Holds no state of its own.
//!
//! # Usage
//!
//! ```bash
//! shared-gallery-relay --port 3000
//! shared-gallery-relay --host 0.0.0.0 --static-dir ./public
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use shared_gallery::relay::{serve, ServerOptions};

/// Shared Gallery relay server
#[derive(Parser, Debug)]
#[command(name = "shared-gallery-relay")]
#[command(about = "Stateless event relay and static file server for shared-gallery")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3000", env = "SHARED_GALLERY_PORT")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1", env = "SHARED_GALLERY_HOST")]
    host: String,

    /// Directory of static assets to serve
    #[arg(long, default_value = ".")]
    static_dir: PathBuf,

    /// Frames a slow client may fall behind before it loses them
    #[arg(long, default_value = "100")]
    channel_capacity: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("shared_gallery=info".parse()?)
                .add_directive("shared_gallery_relay=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    let listener = TcpListener::bind(&addr).await?;
    let options = ServerOptions {
        static_dir: args.static_dir,
        channel_capacity: args.channel_capacity,
    };

    tokio::select! {
        result = serve(listener, options) => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutting down relay");
            Ok(())
        }
    }
}
