//! Client side of the relay
//!
//! A [`RelayChannel`] is connected once at startup. While the connection is
//! not established (or after it dropped) emitted messages are discarded,
//! never queued; the gallery keeps working locally.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use crate::error::{GalleryError, Result};
use crate::relay::protocol::RelayMessage;

/// Destination for outbound gallery events
pub trait RelaySink {
    /// Send `message` to peers. Fire-and-forget: never blocks, never fails.
    fn emit(&self, message: &RelayMessage);
}

/// Messages received from peers
pub type Inbound = mpsc::UnboundedReceiver<RelayMessage>;

#[derive(Default)]
struct Connection {
    outbound: Option<mpsc::UnboundedSender<Message>>,
    writer: Option<JoinHandle<()>>,
}

/// Persistent duplex connection to the relay server
#[derive(Clone, Default)]
pub struct RelayChannel {
    connection: Arc<Mutex<Connection>>,
}

impl RelayChannel {
    /// A channel that never connects; every emit is dropped
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Start connecting in the background and return immediately
    ///
    /// Events emitted before the handshake completes are dropped.
    pub fn connect(url: &str) -> (Self, Inbound) {
        let channel = Self::default();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let task_channel = channel.clone();
        let url = url.to_string();
        tokio::spawn(async move {
            if let Err(e) = task_channel.establish(&url, inbound_tx).await {
                tracing::warn!("Relay unavailable, continuing offline: {}", e);
            }
        });
        (channel, inbound_rx)
    }

    /// Connect and wait for the handshake to finish
    pub async fn connect_now(url: &str) -> Result<(Self, Inbound)> {
        let channel = Self::default();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        channel.establish(url, inbound_tx).await?;
        Ok((channel, inbound_rx))
    }

    pub fn is_connected(&self) -> bool {
        self.connection.lock().outbound.is_some()
    }

    /// Flush frames already emitted, then close the connection
    pub async fn shutdown(&self) {
        let writer = {
            let mut connection = self.connection.lock();
            connection.outbound = None;
            connection.writer.take()
        };
        if let Some(writer) = writer {
            let _ = writer.await;
        }
    }

    async fn establish(
        &self,
        url: &str,
        inbound: mpsc::UnboundedSender<RelayMessage>,
    ) -> Result<()> {
        let (ws, _response) = connect_async(url)
            .await
            .map_err(|e| GalleryError::Relay {
                message: format!("{}: {}", url, e),
            })?;
        tracing::info!("Connected to relay at {}", url);

        let (mut sink, mut stream) = ws.split();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

        let writer_connection = Arc::clone(&self.connection);
        let writer = tokio::spawn(async move {
            while let Some(frame) = outbound_rx.recv().await {
                if let Err(e) = sink.send(frame).await {
                    tracing::warn!("Relay send failed, going offline: {}", e);
                    writer_connection.lock().outbound = None;
                    return;
                }
            }
            let _ = sink.send(Message::Close(None)).await;
        });

        let reader_connection = Arc::clone(&self.connection);
        tokio::spawn(async move {
            while let Some(frame) = stream.next().await {
                match frame {
                    Ok(Message::Text(text)) => match RelayMessage::from_json(&text) {
                        Ok(message) => {
                            if inbound.send(message).is_err() {
                                break;
                            }
                        }
                        Err(e) => tracing::debug!("Ignoring unknown relay frame: {}", e),
                    },
                    Ok(Message::Close(_)) => break,
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!("Relay connection error: {}", e);
                        break;
                    }
                }
            }
            tracing::info!("Relay connection closed");
            reader_connection.lock().outbound = None;
        });

        let mut connection = self.connection.lock();
        connection.outbound = Some(outbound_tx);
        connection.writer = Some(writer);
        Ok(())
    }
}

impl RelaySink for RelayChannel {
    fn emit(&self, message: &RelayMessage) {
        let connection = self.connection.lock();
        let Some(outbound) = connection.outbound.as_ref() else {
            tracing::debug!("Relay offline, dropping '{}'", message.kind());
            return;
        };
        match message.to_json() {
            Ok(json) => {
                let _ = outbound.send(Message::Text(json));
            }
            Err(e) => tracing::error!("Failed to encode '{}': {}", message.kind(), e),
        }
    }
}

/// Sink that keeps every emitted message, for inspection
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    messages: Arc<Mutex<Vec<RelayMessage>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<RelayMessage> {
        self.messages.lock().clone()
    }

    pub fn clear(&self) {
        self.messages.lock().clear();
    }
}

impl RelaySink for RecordingSink {
    fn emit(&self, message: &RelayMessage) {
        self.messages.lock().push(message.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo::Photo;

    #[test]
    fn test_disconnected_channel_drops_events() {
        let channel = RelayChannel::disconnected();
        assert!(!channel.is_connected());
        // Must not panic or block
        channel.emit(&RelayMessage::Added(Photo::new("https://example.com/a.png")));
    }

    #[tokio::test]
    async fn test_connect_now_to_nothing_fails() {
        let err = RelayChannel::connect_now("ws://127.0.0.1:1/ws")
            .await
            .err()
            .expect("nothing listens on port 1");
        assert!(matches!(err, GalleryError::Relay { .. }));
    }

    #[tokio::test]
    async fn test_background_connect_failure_stays_offline() {
        let (channel, mut inbound) = RelayChannel::connect("ws://127.0.0.1:1/ws");
        // Inbound closes once the failed connect task finishes
        assert!(inbound.recv().await.is_none());
        assert!(!channel.is_connected());
    }
}
