//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, merge over defaults)
//!     → validation.rs (semantic checks)
//!     → store.rs (live Arc<GatewayConfig> behind ArcSwap)
//!     → read by the sync coordinator and the admin API
//!
//! Remote push:
//!     incoming document → loader::apply_document (merge over current)
//!     → validation.rs → backup of current → store.persist
//!
//! On reload (SIGHUP or watcher.rs):
//!     loader.rs loads the file in force
//!     → validation.rs validates
//!     → atomic swap of Arc<GatewayConfig>
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require full reload
//! - All fields have defaults to allow minimal configs
//! - Persisting a config does not make it live; a reload does

pub mod loader;
pub mod schema;
pub mod store;
pub mod validation;
pub mod watcher;

pub use loader::{ConfigError, Document};
pub use schema::GatewayConfig;
pub use schema::ListenerConfig;
pub use schema::ClusterConfig;
pub use schema::ObservabilityConfig;
pub use store::{ConfigStore, FileConfigStore};
