//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Reload (reload.rs → signals.rs):
//!     push persisted → SignalReloader sends SIGHUP to the recorded pid
//!     → SignalHandler re-reads the file → live config swapped
//!
//! Shutdown (shutdown.rs):
//!     SIGTERM/SIGINT → broadcast → dispatcher and admin API stop
//! ```
//!
//! # Design Decisions
//! - Reload requests are fire-and-forget; nobody waits for completion
//! - Shutdown is a broadcast every long-running task subscribes to

pub mod reload;
pub mod shutdown;
pub mod signals;

pub use reload::{Reloader, SignalReloader};
pub use shutdown::Shutdown;
pub use signals::SignalHandler;
