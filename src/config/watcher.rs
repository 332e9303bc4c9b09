//! Configuration file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_first;
use crate::config::schema::GatewayConfig;

/// A watcher that monitors the configuration files for changes.
pub struct ConfigWatcher {
    paths: Vec<PathBuf>,
    update_tx: mpsc::UnboundedSender<GatewayConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(paths: &[PathBuf]) -> (Self, mpsc::UnboundedReceiver<GatewayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                paths: paths.to_vec(),
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching in a background thread.
    ///
    /// Parent directories are watched rather than the files themselves, so a
    /// candidate created after startup is picked up too.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let paths = self.paths.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let relevant = event
                        .paths
                        .iter()
                        .any(|changed| paths.iter().any(|candidate| changed.ends_with(candidate)));
                    if relevant && (event.kind.is_modify() || event.kind.is_create()) {
                        tracing::info!("Config file change detected, reloading...");
                        match load_first(&paths) {
                            Ok(new_config) => {
                                let _ = tx.send(new_config);
                            }
                            Err(e) => {
                                tracing::error!(
                                    "Failed to reload config: {}. Keeping current configuration.",
                                    e
                                );
                            }
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        for dir in watch_dirs(&self.paths) {
            watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        }

        tracing::info!(paths = ?self.paths, "Config watcher started");
        Ok(watcher)
    }
}

fn watch_dirs(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = paths
        .iter()
        .map(|p| match p.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => Path::new(".").to_path_buf(),
        })
        .collect();
    dirs.sort();
    dirs.dedup();
    dirs
}
