//! Gateway configuration sync library.
//!
//! Nodes of a gateway cluster exchange configuration over a shared bus: a
//! node can be pushed a new configuration, or asked for a sanitized snapshot
//! of the one it runs with.

pub mod admin;
pub mod bus;
pub mod cluster;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod sync;

pub use cluster::NodeIdentity;
pub use config::schema::GatewayConfig;
pub use lifecycle::Shutdown;
pub use sync::SyncCoordinator;
