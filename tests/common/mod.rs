//! Common test utilities for shared-gallery integration tests
//!
//! This module provides:
//! - `TestRelay`, a relay server on an ephemeral loopback port
//! - Raw WebSocket helpers for speaking the relay protocol directly

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tempfile::TempDir;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use shared_gallery::relay::{serve, ServerOptions, RELAY_PATH};

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Smallest valid GIF, served as a static asset
pub const DOT_GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00\x00\x00\x00\xff\xff\xff!\xf9\x04\x01\x00\x00\x00\x00,\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02D\x01\x00;";

/// How long a test waits for a frame that should arrive
pub const ARRIVAL: Duration = Duration::from_secs(5);

/// How long a test waits to be sure a frame does not arrive
pub const SILENCE: Duration = Duration::from_millis(300);

/// Relay server running on 127.0.0.1 with a temporary static directory
pub struct TestRelay {
    pub addr: SocketAddr,
    static_dir: TempDir,
    handle: JoinHandle<()>,
}

impl TestRelay {
    /// Start a relay serving `index.html` and `img/dot.gif`
    pub async fn start() -> Self {
        let static_dir = TempDir::new().expect("Failed to create temp dir");
        std::fs::write(
            static_dir.path().join("index.html"),
            "<!doctype html><title>gallery</title>",
        )
        .expect("Failed to write index.html");
        std::fs::create_dir_all(static_dir.path().join("img")).expect("Failed to create img dir");
        std::fs::write(static_dir.path().join("img/dot.gif"), DOT_GIF)
            .expect("Failed to write dot.gif");

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind relay listener");
        let addr = listener.local_addr().expect("Listener has no address");
        let options = ServerOptions {
            static_dir: static_dir.path().to_path_buf(),
            channel_capacity: 100,
        };
        let handle = tokio::spawn(async move {
            if let Err(e) = serve(listener, options).await {
                panic!("Relay stopped: {}", e);
            }
        });

        Self {
            addr,
            static_dir,
            handle,
        }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}{}", self.addr, RELAY_PATH)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn static_dir(&self) -> &Path {
        self.static_dir.path()
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Open a raw relay connection
pub async fn ws_client(url: &str) -> WsClient {
    let (ws, _) = connect_async(url).await.expect("Failed to connect to relay");
    ws
}

pub async fn send_text(ws: &mut WsClient, text: &str) {
    ws.send(Message::Text(text.to_string()))
        .await
        .expect("Failed to send frame");
}

/// Next text frame, or `None` if nothing arrives within `wait`
pub async fn recv_text(ws: &mut WsClient, wait: Duration) -> Option<String> {
    let deadline = tokio::time::Instant::now() + wait;
    loop {
        let frame = tokio::time::timeout_at(deadline, ws.next()).await.ok()??;
        match frame.expect("WebSocket error") {
            Message::Text(text) => return Some(text),
            Message::Close(_) => return None,
            _ => continue,
        }
    }
}
