//! Push and pull flows of the configuration sync protocol.
//!
//! # Push
//! ```text
//! Received → Decoded → IdentityChecked → PermissionChecked
//!          → BackedUp → Persisted → ReloadRequested → Done
//!
//! any stage ──failure──▶ Aborted(stage, error)
//! ```
//! The merged configuration is validated and rendered before the backup, so a
//! push that could never be written leaves nothing behind.
//! Loading, merging, backing up and persisting run under one process-wide
//! write lock, so a concurrent push can never back up a half-applied file.
//! The reload request happens after the lock is released and never rolls
//! back what was persisted.
//!
//! # Pull
//! ```text
//! decode query → identity filter → read on-disk document → sanitize
//!              → publish config-response
//! ```
//!
//! Every failure ends in a logged outcome; nothing here returns an error to
//! the caller or panics on hostile input.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::bus::Publisher;
use crate::cluster::NodeIdentity;
use crate::config::loader::{apply_document, render_config};
use crate::config::{ConfigStore, Document};
use crate::lifecycle::reload::{ReloadError, Reloader};
use crate::observability::metrics;
use crate::sync::backup::{BackupArtifact, BackupManager};
use crate::sync::envelope::{
    unix_timestamp, Command, ConfigQueryEnvelope, ConfigSnapshotEnvelope, Notification,
    PushConfigEnvelope,
};
use crate::sync::error::SyncError;
use crate::sync::sanitize::sanitize;

/// Progress of a single push.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushStage {
    Received,
    Decoded,
    IdentityChecked,
    PermissionChecked,
    BackedUp,
    Persisted,
    ReloadRequested,
    Done,
}

impl fmt::Display for PushStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PushStage::Received => "received",
            PushStage::Decoded => "decoded",
            PushStage::IdentityChecked => "identity_checked",
            PushStage::PermissionChecked => "permission_checked",
            PushStage::BackedUp => "backed_up",
            PushStage::Persisted => "persisted",
            PushStage::ReloadRequested => "reload_requested",
            PushStage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Terminal state of a push.
#[derive(Debug)]
pub enum PushOutcome {
    /// New configuration is on disk. `reload` reports whether the signal went out.
    Done {
        backup: BackupArtifact,
        reload: Result<(), ReloadError>,
    },
    /// Stopped after `stage`; nothing past it happened.
    Aborted { stage: PushStage, error: SyncError },
}

impl PushOutcome {
    pub fn is_done(&self) -> bool {
        matches!(self, PushOutcome::Done { .. })
    }

    pub fn error(&self) -> Option<&SyncError> {
        match self {
            PushOutcome::Done { .. } => None,
            PushOutcome::Aborted { error, .. } => Some(error),
        }
    }
}

/// Terminal state of a snapshot query.
#[derive(Debug)]
pub enum PullOutcome {
    Responded(ConfigSnapshotEnvelope),
    Aborted(SyncError),
}

/// Runs the sync protocol for one node.
pub struct SyncCoordinator {
    identity: NodeIdentity,
    store: Arc<dyn ConfigStore>,
    backups: BackupManager,
    reloader: Arc<dyn Reloader>,
    publisher: Arc<dyn Publisher>,
    topic: String,
    write_lock: Mutex<()>,
}

impl SyncCoordinator {
    /// Create a coordinator publishing on the topic named by the live config.
    pub fn new(
        identity: NodeIdentity,
        store: Arc<dyn ConfigStore>,
        backups: BackupManager,
        reloader: Arc<dyn Reloader>,
        publisher: Arc<dyn Publisher>,
    ) -> Self {
        let topic = store.current().cluster.topic.clone();
        Self {
            identity,
            store,
            backups,
            reloader,
            publisher,
            topic,
            write_lock: Mutex::new(()),
        }
    }

    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn identity(&self) -> &NodeIdentity {
        &self.identity
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Handle a `push-config` payload.
    pub fn handle_push(&self, payload: &str) -> PushOutcome {
        let mut stage = PushStage::Received;
        match self.run_push(payload, &mut stage) {
            Ok((backup, reload)) => {
                metrics::record_push("applied");
                PushOutcome::Done { backup, reload }
            }
            Err(error) => {
                match &error {
                    SyncError::IdentityMismatch { .. } => tracing::info!(
                        command = %Command::PushConfig,
                        "Configuration update received, no NodeID/Hostname match found"
                    ),
                    SyncError::PermissionDenied => tracing::warn!(
                        command = %Command::PushConfig,
                        "Ignoring new config: remote configuration is not allowed for this node"
                    ),
                    other => tracing::error!(
                        command = %Command::PushConfig,
                        stage = %stage,
                        error = %other,
                        "Configuration push aborted"
                    ),
                }
                metrics::record_push(error.kind());
                PushOutcome::Aborted { stage, error }
            }
        }
    }

    fn run_push(
        &self,
        payload: &str,
        stage: &mut PushStage,
    ) -> Result<(BackupArtifact, Result<(), ReloadError>), SyncError> {
        let envelope: PushConfigEnvelope = serde_json::from_str(payload)?;
        *stage = PushStage::Decoded;

        if !self
            .identity
            .matches(&envelope.target_hostname, &envelope.target_node_id)
        {
            return Err(SyncError::IdentityMismatch {
                hostname: envelope.target_hostname,
                node_id: envelope.target_node_id,
            });
        }
        *stage = PushStage::IdentityChecked;

        if !self.store.current().allow_remote_config {
            return Err(SyncError::PermissionDenied);
        }
        *stage = PushStage::PermissionChecked;

        let backup = {
            let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);

            let current = self.store.load().map_err(SyncError::Store)?;
            let next = apply_document(&current, envelope.configuration)
                .map_err(SyncError::InvalidConfig)?;
            let rendered = render_config(&next).map_err(SyncError::InvalidConfig)?;

            let backup = self.backups.backup(&current)?;
            metrics::record_backup();
            *stage = PushStage::BackedUp;

            self.store.persist(&rendered).map_err(SyncError::Persist)?;
            *stage = PushStage::Persisted;
            backup
        };

        tracing::info!(
            path = %self.store.primary_path().display(),
            backup = %backup.path.display(),
            "New configuration written, initiating configuration reload"
        );

        let reload = self.reloader.reload(self.identity.pid());
        *stage = PushStage::ReloadRequested;
        match &reload {
            Ok(()) => metrics::record_reload("sent"),
            Err(e) => {
                tracing::error!(pid = self.identity.pid(), error = %e, "Process reload failed");
                metrics::record_reload("failed");
            }
        }

        *stage = PushStage::Done;
        Ok((backup, reload))
    }

    /// Handle a `get-config` payload, publishing a snapshot when addressed to us.
    pub fn handle_query(&self, payload: &str) -> PullOutcome {
        match self.run_query(payload) {
            Ok(response) => {
                tracing::debug!(command = %Command::GetConfig, "Configuration request responded");
                metrics::record_pull("responded");
                PullOutcome::Responded(response)
            }
            Err(error) => {
                match &error {
                    SyncError::IdentityMismatch { .. } => tracing::debug!(
                        command = %Command::GetConfig,
                        "Configuration request received, no NodeID/Hostname match found, ignoring"
                    ),
                    other => tracing::error!(
                        command = %Command::GetConfig,
                        error = %other,
                        "Configuration request failed"
                    ),
                }
                metrics::record_pull(error.kind());
                PullOutcome::Aborted(error)
            }
        }
    }

    fn run_query(&self, payload: &str) -> Result<ConfigSnapshotEnvelope, SyncError> {
        let query: ConfigQueryEnvelope = serde_json::from_str(payload)?;

        if !self
            .identity
            .matches(&query.requester_hostname, &query.requester_node_id)
        {
            return Err(SyncError::IdentityMismatch {
                hostname: query.requester_hostname,
                node_id: query.requester_node_id,
            });
        }

        let response = ConfigSnapshotEnvelope {
            responder_hostname: self.identity.hostname().to_string(),
            responder_node_id: self.identity.node_id().to_string(),
            configuration: self.snapshot()?,
            timestamp: unix_timestamp(),
        };

        let encoded = Notification::wrap(Command::ConfigResponse, &response)
            .and_then(|notification| notification.encode())
            .map_err(SyncError::Encode)?;
        self.publisher.publish(&self.topic, encoded)?;
        Ok(response)
    }

    /// Sanitized copy of the on-disk configuration.
    pub fn snapshot(&self) -> Result<Document, SyncError> {
        let document = self.store.read_document().map_err(SyncError::Store)?;
        Ok(sanitize(document))
    }
}
