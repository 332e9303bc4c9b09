//! Routes inbound bus messages to the coordinator.
//!
//! Each message becomes its own blocking task, so a slow push never holds up
//! the receive loop and overlapping pushes are serialized only by the
//! coordinator's write lock.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::bus::BusMessage;
use crate::observability::metrics;
use crate::sync::coordinator::SyncCoordinator;
use crate::sync::envelope::{Command, ConfigSnapshotEnvelope, Notification};

pub struct Dispatcher {
    coordinator: Arc<SyncCoordinator>,
    responses: Option<mpsc::UnboundedSender<ConfigSnapshotEnvelope>>,
}

impl Dispatcher {
    pub fn new(coordinator: Arc<SyncCoordinator>) -> Self {
        Self {
            coordinator,
            responses: None,
        }
    }

    /// Forward snapshots answered by other nodes to `tx`.
    pub fn with_responses(mut self, tx: mpsc::UnboundedSender<ConfigSnapshotEnvelope>) -> Self {
        self.responses = Some(tx);
        self
    }

    /// Receive until the bus closes or shutdown fires.
    pub async fn run(
        self,
        mut messages: broadcast::Receiver<BusMessage>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        tracing::info!(
            topic = %self.coordinator.topic(),
            node = %self.coordinator.identity(),
            "Sync dispatcher started"
        );

        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                received = messages.recv() => match received {
                    Ok(message) => {
                        self.dispatch(message);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Sync dispatcher lagged, messages dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }

        tracing::info!("Sync dispatcher stopped");
    }

    /// Route one message. Returns the handle of the spawned task, if any.
    pub fn dispatch(&self, message: BusMessage) -> Option<JoinHandle<()>> {
        if message.topic != self.coordinator.topic() {
            return None;
        }

        let notification = match Notification::decode(&message.payload) {
            Ok(n) => n,
            Err(e) => {
                tracing::error!(error = %e, "Failed to decode bus notification");
                metrics::record_notification("undecodable");
                return None;
            }
        };

        let Some(command) = notification.command() else {
            tracing::debug!(command = %notification.command, "Ignoring unrelated notification");
            metrics::record_notification("ignored");
            return None;
        };
        metrics::record_notification(command.as_str());

        let payload = notification.payload;
        match command {
            Command::PushConfig => {
                let coordinator = self.coordinator.clone();
                Some(tokio::task::spawn_blocking(move || {
                    coordinator.handle_push(&payload);
                }))
            }
            Command::GetConfig => {
                let coordinator = self.coordinator.clone();
                Some(tokio::task::spawn_blocking(move || {
                    coordinator.handle_query(&payload);
                }))
            }
            Command::ConfigResponse => {
                self.forward_response(&payload);
                None
            }
        }
    }

    fn forward_response(&self, payload: &str) {
        let response: ConfigSnapshotEnvelope = match serde_json::from_str(payload) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to decode configuration response");
                return;
            }
        };

        tracing::info!(
            responder_hostname = %response.responder_hostname,
            responder_node_id = %response.responder_node_id,
            keys = response.configuration.len(),
            "Configuration response received"
        );

        if let Some(tx) = &self.responses {
            let _ = tx.send(response);
        }
    }
}
