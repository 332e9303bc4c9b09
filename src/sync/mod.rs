//! Configuration sync protocol.
//!
//! # Data Flow
//! ```text
//! bus message
//!     → dispatcher.rs (topic filter, Notification decode, command routing)
//!     → coordinator.rs
//!         push-config: identity → permission → merge → backup.rs → persist → reload
//!         get-config:  identity → on-disk document → sanitize.rs → config-response
//!     config-response from peers → responses.rs (read back by the admin API)
//! ```
//!
//! # Design Decisions
//! - Messages are handled independently; only pushes share a write lock
//! - At-most-once: no step is ever retried
//! - Hostile or malformed input ends in a logged outcome, never a panic

pub mod backup;
pub mod coordinator;
pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod responses;
pub mod sanitize;

pub use backup::{BackupArtifact, BackupManager};
pub use coordinator::{PullOutcome, PushOutcome, PushStage, SyncCoordinator};
pub use dispatcher::Dispatcher;
pub use envelope::{
    Command, ConfigQueryEnvelope, ConfigSnapshotEnvelope, Notification, PushConfigEnvelope,
};
pub use error::SyncError;
pub use responses::ResponseLog;
pub use sanitize::sanitize;
