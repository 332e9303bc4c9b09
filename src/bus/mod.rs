//! Cluster notification bus.
//!
//! # Data Flow
//! ```text
//! SyncCoordinator ──publish(topic, payload)──▶ Publisher
//!                                                 │
//!                                     (transport: not our concern)
//!                                                 ▼
//! Dispatcher ◀──────────── BusMessage ──────── subscriber
//! ```
//!
//! # Design Decisions
//! - The coordinator only sees the [`Publisher`] capability
//! - Delivery is at-most-once; nothing here retries
//! - [`LocalBus`] is an in-process transport for a single node and tests

pub mod local;

use thiserror::Error;

pub use local::LocalBus;

/// Topic used when the configuration does not name one.
pub const DEFAULT_TOPIC: &str = "gateway.cluster.notifications";

/// A raw message as carried by the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub topic: String,
    pub payload: String,
}

/// Errors raised while handing a message to the bus.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("No subscribers on topic {0}")]
    NoSubscribers(String),

    #[error("Bus transport error: {0}")]
    Transport(String),
}

/// Fire-and-forget publish capability.
pub trait Publisher: Send + Sync {
    fn publish(&self, topic: &str, payload: String) -> Result<(), BusError>;
}
