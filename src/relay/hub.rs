//! Fan-out between relay connections
//!
//! The hub is a broadcast channel whose frames are tagged with the
//! connection that sent them. Each connection holds a [`Membership`] and
//! never sees its own frames. Nothing is retained between frames: a
//! connection that falls behind by more than the channel capacity loses the
//! frames it missed.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Identifier of a relay connection, unique for the life of the hub
pub type ConnectionId = u64;

/// A text frame on its way to every other connection
#[derive(Debug, Clone)]
pub struct RelayFrame {
    pub origin: ConnectionId,
    pub text: Arc<str>,
}

pub struct RelayHub {
    tx: broadcast::Sender<RelayFrame>,
    next_id: AtomicU64,
    connections: AtomicUsize,
}

impl RelayHub {
    pub fn new(capacity: usize) -> Arc<Self> {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Arc::new(Self {
            tx,
            next_id: AtomicU64::new(1),
            connections: AtomicUsize::new(0),
        })
    }

    /// Register a new connection and subscribe it to frames from now on
    pub fn join(self: &Arc<Self>) -> Membership {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let count = self.connections.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::info!("Client {} joined ({} connected)", id, count);
        Membership {
            id,
            rx: self.tx.subscribe(),
            hub: Arc::clone(self),
        }
    }

    /// Broadcast `text` to every connection except `origin`
    ///
    /// Returns the number of other connections the frame was queued for.
    pub fn publish(&self, origin: ConnectionId, text: &str) -> usize {
        let frame = RelayFrame {
            origin,
            text: Arc::from(text),
        };
        // The sender's own subscription is counted by the channel
        self.tx.send(frame).map(|n| n.saturating_sub(1)).unwrap_or(0)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }

    fn leave(&self, id: ConnectionId) {
        let remaining = self.connections.fetch_sub(1, Ordering::SeqCst) - 1;
        tracing::info!("Client {} left ({} connected)", id, remaining);
    }
}

/// A connection's subscription to the hub; leaving happens on drop
pub struct Membership {
    id: ConnectionId,
    rx: broadcast::Receiver<RelayFrame>,
    hub: Arc<RelayHub>,
}

impl Membership {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn publish(&self, text: &str) -> usize {
        self.hub.publish(self.id, text)
    }

    /// Next frame sent by some other connection, `None` once the hub is gone
    pub async fn next_frame(&mut self) -> Option<Arc<str>> {
        loop {
            match self.rx.recv().await {
                Ok(frame) if frame.origin == self.id => continue,
                Ok(frame) => return Some(frame.text),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Client {} lagged, dropped {} frames", self.id, skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for Membership {
    fn drop(&mut self) {
        self.hub.leave(self.id);
    }
}
