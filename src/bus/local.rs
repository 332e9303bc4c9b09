//! In-process bus backed by a Tokio broadcast channel.

use tokio::sync::broadcast;

use crate::bus::{BusError, BusMessage, Publisher};

/// Broadcast bus living inside one process.
///
/// Every subscriber sees every message on every topic; filtering by topic is
/// the subscriber's job, as it would be on a shared pub/sub channel.
#[derive(Debug, Clone)]
pub struct LocalBus {
    tx: broadcast::Sender<BusMessage>,
}

impl LocalBus {
    /// Create a bus buffering up to `capacity` messages per slow subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to all future messages.
    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for LocalBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl Publisher for LocalBus {
    fn publish(&self, topic: &str, payload: String) -> Result<(), BusError> {
        self.tx
            .send(BusMessage {
                topic: topic.to_string(),
                payload,
            })
            .map(|_| ())
            .map_err(|_| BusError::NoSubscribers(topic.to_string()))
    }
}
