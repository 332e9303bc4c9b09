//! Metrics collection and exposition.
//!
//! # Metrics
//! - `config_sync_notifications_total` (counter): inbound bus traffic by command
//! - `config_sync_push_total` (counter): push outcomes
//! - `config_sync_pull_total` (counter): query outcomes
//! - `config_sync_backups_total` (counter): backups written
//! - `config_sync_reload_requests_total` (counter): reload signals by result
//!
//! # Design Decisions
//! - Recording without an installed exporter is a no-op, so tests need no setup
//! - Labels are static strings; no per-node cardinality

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// Start the Prometheus scrape endpoint on `addr`.
///
/// Must be called from inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_notification(command: &'static str) {
    counter!("config_sync_notifications_total", "command" => command).increment(1);
}

pub fn record_push(outcome: &'static str) {
    counter!("config_sync_push_total", "outcome" => outcome).increment(1);
}

pub fn record_pull(outcome: &'static str) {
    counter!("config_sync_pull_total", "outcome" => outcome).increment(1);
}

pub fn record_backup() {
    counter!("config_sync_backups_total").increment(1);
}

pub fn record_reload(result: &'static str) {
    counter!("config_sync_reload_requests_total", "result" => result).increment(1);
}
