//! Snapshots answered by other nodes.
//!
//! The dispatcher forwards every `config-response` it sees; this log keeps the
//! most recent ones so an operator can read them back through the admin API.
//! Entries are already sanitized by the node that sent them.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;

use crate::sync::envelope::ConfigSnapshotEnvelope;

const DEFAULT_CAPACITY: usize = 64;

/// Bounded, oldest-first log of received snapshots.
pub struct ResponseLog {
    capacity: usize,
    entries: Mutex<VecDeque<ConfigSnapshotEnvelope>>,
}

impl ResponseLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Append a snapshot, evicting the oldest once full.
    pub fn record(&self, response: ConfigSnapshotEnvelope) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(response);
    }

    /// Copy of the retained snapshots, newest last.
    pub fn recent(&self) -> Vec<ConfigSnapshotEnvelope> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Record everything arriving on `rx` until the sender is dropped.
    pub async fn collect(self: Arc<Self>, mut rx: mpsc::UnboundedReceiver<ConfigSnapshotEnvelope>) {
        while let Some(response) = rx.recv().await {
            self.record(response);
        }
    }
}

impl Default for ResponseLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
