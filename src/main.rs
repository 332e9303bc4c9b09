//! Gateway configuration sync node.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────┐
//!                 │                  GATEWAY NODE                     │
//!   cluster bus   │  ┌────────────┐     ┌──────────────────┐          │
//!  ──────────────▶│─▶│ dispatcher │────▶│ sync coordinator │          │
//!                 │  └────────────┘     └────────┬─────────┘          │
//!                 │                              │                    │
//!                 │        ┌────────────┬────────┼───────────┐        │
//!                 │        ▼            ▼        ▼           ▼        │
//!                 │   ┌────────┐  ┌─────────┐ ┌──────┐ ┌──────────┐   │
//!                 │   │identity│  │ config  │ │backup│ │  reload  │   │
//!                 │   │ filter │  │  store  │ │      │ │ (SIGHUP) │   │
//!                 │   └────────┘  └─────────┘ └──────┘ └────┬─────┘   │
//!                 │                    ▲                    │         │
//!                 │                    └──── signals ◀──────┘         │
//!                 │                                                   │
//!                 │   admin API · metrics · logging · config watcher  │
//!                 └──────────────────────────────────────────────────┘
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;

use gateway_sync::admin::{self, AdminState};
use gateway_sync::bus::LocalBus;
use gateway_sync::cluster::NodeIdentity;
use gateway_sync::config::watcher::ConfigWatcher;
use gateway_sync::config::{ConfigStore, FileConfigStore};
use gateway_sync::lifecycle::{Shutdown, SignalHandler, SignalReloader};
use gateway_sync::observability::{logging, metrics};
use gateway_sync::sync::{BackupManager, Dispatcher, ResponseLog, SyncCoordinator};

#[derive(Parser)]
#[command(name = "gateway-sync")]
#[command(about = "Gateway node with cluster configuration sync", long_about = None)]
struct Args {
    /// Candidate configuration files; the first one receives pushes.
    #[arg(short, long = "config", default_value = "gateway.toml")]
    config: Vec<PathBuf>,

    /// Override the node ID.
    #[arg(long, env = "GATEWAY_NODE_ID")]
    node_id: Option<String>,

    /// Override the hostname used for addressing.
    #[arg(long, env = "GATEWAY_HOSTNAME")]
    hostname: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let store = Arc::new(
        FileConfigStore::open(args.config.clone()).context("failed to load configuration")?,
    );
    let config = store.current();

    logging::init_logging(&config.observability).context("failed to initialize logging")?;
    tracing::info!("gateway-sync v{} starting", env!("CARGO_PKG_VERSION"));

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .context("invalid metrics address")?;
        metrics::init_metrics(addr).context("failed to start metrics endpoint")?;
    }

    // Registered before anything can send SIGHUP to this process.
    let signals = SignalHandler::install().context("failed to register signal handlers")?;
    let shutdown = Shutdown::new();

    let identity = NodeIdentity::from_host(
        args.node_id.or_else(|| config.cluster.node_id.clone()),
        args.hostname,
    );
    tracing::info!(
        hostname = %identity.hostname(),
        node_id = %identity.node_id(),
        pid = identity.pid(),
        allow_remote_config = config.allow_remote_config,
        "Node identity resolved"
    );

    let bus = Arc::new(LocalBus::default());
    let coordinator = Arc::new(SyncCoordinator::new(
        identity,
        store.clone(),
        BackupManager::new(&config.cluster.backup_dir),
        Arc::new(SignalReloader),
        bus.clone(),
    ));

    let responses = Arc::new(ResponseLog::default());
    let (response_tx, response_rx) = tokio::sync::mpsc::unbounded_channel();
    tokio::spawn(responses.clone().collect(response_rx));

    let dispatcher = Dispatcher::new(coordinator.clone()).with_responses(response_tx);
    let dispatcher_task = tokio::spawn(dispatcher.run(bus.subscribe(), shutdown.subscribe()));

    let _watcher = if config.cluster.watch_config {
        let (watcher, mut updates) = ConfigWatcher::new(store.paths());
        let guard = watcher.run().context("failed to start config watcher")?;
        let live = store.clone();
        tokio::spawn(async move {
            while let Some(next) = updates.recv().await {
                live.replace(next);
                tracing::info!("Live configuration replaced from watcher");
            }
        });
        Some(guard)
    } else {
        None
    };

    if config.admin.enabled {
        let listener = TcpListener::bind(&config.admin.bind_address)
            .await
            .context("failed to bind admin API")?;
        let state = AdminState {
            coordinator: coordinator.clone(),
            bus: bus.clone(),
            responses: responses.clone(),
            api_key: Arc::from(config.secret.as_str()),
        };
        let admin_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            if let Err(e) = admin::serve(listener, state, admin_shutdown).await {
                tracing::error!(error = %e, "Admin API failed");
            }
        });
    }

    signals.run(store, &shutdown).await;
    let _ = dispatcher_task.await;

    tracing::info!("Shutdown complete");
    Ok(())
}
