//! Errors produced while handling sync messages.
//!
//! None of these escape the coordinator: each is logged at its own level and
//! turned into an aborted outcome. A failed reload is not among them; it is
//! reported on the completed push, since the new configuration stays written.

use thiserror::Error;

use crate::bus::BusError;
use crate::config::ConfigError;
use crate::sync::backup::BackupError;

#[derive(Debug, Error)]
pub enum SyncError {
    /// Envelope could not be decoded.
    #[error("malformed envelope: {0}")]
    Decode(#[from] serde_json::Error),

    /// Addressed to another node. Normal cluster chatter.
    #[error("no hostname or node ID match (target {hostname}/{node_id})")]
    IdentityMismatch { hostname: String, node_id: String },

    #[error("remote configuration is not allowed for this node")]
    PermissionDenied,

    #[error("could not load configuration: {0}")]
    Store(#[source] ConfigError),

    #[error("pushed configuration rejected: {0}")]
    InvalidConfig(#[source] ConfigError),

    #[error("failed to back up existing configuration: {0}")]
    Backup(#[from] BackupError),

    #[error("failed to write new configuration: {0}")]
    Persist(#[source] ConfigError),

    #[error("failed to encode response: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to publish response: {0}")]
    Publish(#[from] BusError),
}

impl SyncError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::Decode(_) => "decode_error",
            SyncError::IdentityMismatch { .. } => "identity_mismatch",
            SyncError::PermissionDenied => "permission_denied",
            SyncError::Store(_) => "store_error",
            SyncError::InvalidConfig(_) => "invalid_config",
            SyncError::Backup(_) => "backup_failure",
            SyncError::Persist(_) => "persist_failure",
            SyncError::Encode(_) => "encode_error",
            SyncError::Publish(_) => "publish_failure",
        }
    }
}
