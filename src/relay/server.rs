//! Relay server: static assets and the relay WebSocket on one HTTP port
//!
//! - `GET /ws` upgrades to the relay protocol
//! - anything else is served from the static directory
//!
//! The server is stateless across frames and connections. Each text frame
//! that parses as one of the three relay kinds is re-broadcast verbatim to
//! every other connected client; everything else is dropped.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;

use crate::relay::hub::{Membership, RelayHub};
use crate::relay::protocol::RelayMessage;

/// Path of the relay WebSocket endpoint
pub const RELAY_PATH: &str = "/ws";

/// Settings for one relay server instance
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Directory served for every non-relay path
    pub static_dir: PathBuf,
    /// Frames a slow client may fall behind before it starts losing them
    pub channel_capacity: usize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            static_dir: PathBuf::from("."),
            channel_capacity: 100,
        }
    }
}

#[derive(Clone)]
struct RelayState {
    hub: Arc<RelayHub>,
    static_dir: Arc<PathBuf>,
}

/// Build the router for a fresh hub
pub fn router(options: &ServerOptions) -> Router {
    router_with_hub(RelayHub::new(options.channel_capacity), options)
}

/// Build the router around an existing hub
pub fn router_with_hub(hub: Arc<RelayHub>, options: &ServerOptions) -> Router {
    let state = RelayState {
        hub,
        static_dir: Arc::new(options.static_dir.clone()),
    };
    Router::new()
        .route(RELAY_PATH, get(upgrade))
        .fallback(static_asset)
        .with_state(state)
}

/// Serve until the listener fails
pub async fn serve(listener: TcpListener, options: ServerOptions) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!("Relay listening on http://{} (ws://{}{})", addr, addr, RELAY_PATH);
    tracing::info!("Serving static assets from {}", options.static_dir.display());
    axum::serve(listener, router(&options)).await?;
    Ok(())
}

async fn upgrade(ws: WebSocketUpgrade, State(state): State<RelayState>) -> Response {
    // Subscribe before the 101 goes out so that a client may publish as
    // soon as its handshake completes without missing peers' frames.
    let membership = state.hub.join();
    ws.on_upgrade(move |socket| handle_socket(socket, membership))
}

async fn handle_socket(mut socket: WebSocket, mut membership: Membership) {
    let id = membership.id();
    loop {
        tokio::select! {
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => relay_text(&membership, &text),
                    Some(Ok(Message::Close(_))) => {
                        tracing::debug!("Client {} requested close", id);
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket error from client {}: {}", id, e);
                        break;
                    }
                    None => break,
                    _ => {}
                }
            }

            frame = membership.next_frame() => {
                let Some(text) = frame else { break };
                if socket.send(Message::Text(text.to_string())).await.is_err() {
                    break;
                }
            }
        }
    }
}

fn relay_text(membership: &Membership, text: &str) {
    match RelayMessage::from_json(text) {
        Ok(message) => {
            let peers = membership.publish(text);
            tracing::debug!(
                "Relayed '{}' from client {} to {} peers",
                message.kind(),
                membership.id(),
                peers
            );
        }
        Err(e) => {
            tracing::warn!("Dropping frame from client {}: {}", membership.id(), e);
        }
    }
}

async fn static_asset(State(state): State<RelayState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }
    let Some(path) = resolve_asset_path(&state.static_dir, uri.path()) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.to_string())], bytes).into_response()
        }
        Err(e) => {
            tracing::debug!("Static asset {} unavailable: {}", path.display(), e);
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

/// Map a request path onto the static directory, refusing to leave it
fn resolve_asset_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let relative = request_path.trim_start_matches('/');
    let mut path = root.to_path_buf();
    for component in Path::new(relative).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            _ => return None,
        }
    }
    if relative.is_empty() || relative.ends_with('/') {
        path.push("index.html");
    }
    Some(path)
}
