//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGTERM, SIGINT, SIGHUP)
//! - SIGHUP re-reads the configuration in force into the live store
//! - SIGTERM/SIGINT trigger graceful shutdown
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Handlers are registered before anything can send a reload signal, since
//!   SIGHUP's default action would end the process
//! - A failed reload keeps serving the previous configuration

use std::io;
use std::sync::Arc;

use crate::config::FileConfigStore;
use crate::lifecycle::shutdown::Shutdown;

/// Registered process signal streams.
pub struct SignalHandler {
    #[cfg(unix)]
    hangup: tokio::signal::unix::Signal,
    #[cfg(unix)]
    terminate: tokio::signal::unix::Signal,
    #[cfg(unix)]
    interrupt: tokio::signal::unix::Signal,
}

impl SignalHandler {
    /// Register the handlers. Must be called inside a Tokio runtime.
    #[cfg(unix)]
    pub fn install() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            hangup: signal(SignalKind::hangup())?,
            terminate: signal(SignalKind::terminate())?,
            interrupt: signal(SignalKind::interrupt())?,
        })
    }

    #[cfg(not(unix))]
    pub fn install() -> io::Result<Self> {
        Ok(Self {})
    }

    /// Serve signals until a termination signal arrives, then trigger shutdown.
    #[cfg(unix)]
    pub async fn run(mut self, store: Arc<FileConfigStore>, shutdown: &Shutdown) {
        loop {
            tokio::select! {
                _ = self.hangup.recv() => reload(&store),
                _ = self.terminate.recv() => {
                    tracing::info!("SIGTERM received, shutting down");
                    break;
                }
                _ = self.interrupt.recv() => {
                    tracing::info!("SIGINT received, shutting down");
                    break;
                }
            }
        }
        shutdown.trigger();
    }

    #[cfg(not(unix))]
    pub async fn run(self, _store: Arc<FileConfigStore>, shutdown: &Shutdown) {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
        }
        tracing::info!("Ctrl-C received, shutting down");
        shutdown.trigger();
    }
}

fn reload(store: &FileConfigStore) {
    tracing::info!("SIGHUP received, reloading configuration");
    match store.reload_from_disk() {
        Ok(config) => tracing::info!(
            allow_remote_config = config.allow_remote_config,
            bind_address = %config.listener.bind_address,
            "Configuration reloaded"
        ),
        Err(e) => tracing::error!(
            error = %e,
            "Failed to reload config. Keeping current configuration."
        ),
    }
}
