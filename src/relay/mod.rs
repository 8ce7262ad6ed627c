//! Relay: mirrors gallery mutations between connected clients
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐  added / deleted / order-changed   ┌──────────────────────┐
//! │ RelayChannel │ ─────────────────────────────────► │ shared-gallery-relay │
//! │  (client A)  │                                    │   RelayHub (fan-out) │
//! └──────────────┘                                    └──────────┬───────────┘
//!                                                                │ same frame,
//!                                  ┌──────────────┐              │ sender excluded
//!                                  │ RelayChannel │ ◄────────────┘
//!                                  │  (client B)  │
//!                                  └──────────────┘
//! ```
//!
//! The relay is best-effort. There is no acknowledgement, retry, queueing
//! while offline, ordering guarantee across clients, or reconciliation of
//! divergent local state. Clients stay local-first; the relay is advisory.

pub mod channel;
pub mod hub;
pub mod protocol;
pub mod server;

pub use channel::{Inbound, RecordingSink, RelayChannel, RelaySink};
pub use hub::{ConnectionId, Membership, RelayHub};
pub use protocol::{DeletedPayload, RelayMessage};
pub use server::{router, serve, ServerOptions, RELAY_PATH};
