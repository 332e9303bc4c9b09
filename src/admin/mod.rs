//! Admin API for a gateway node.
//!
//! - `GET /admin/status`: identity and version
//! - `GET /admin/config`: sanitized snapshot of this node's configuration
//! - `GET /admin/responses`: snapshots other nodes answered with, newest last
//! - `POST /admin/notify`: publish a notification onto the cluster bus
//!
//! Every route requires `Authorization: Bearer <secret>`.

pub mod auth;
pub mod handlers;

use std::io;
use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use self::auth::admin_auth_middleware;
use self::handlers::*;
use crate::bus::Publisher;
use crate::lifecycle::shutdown::wait;
use crate::sync::{ResponseLog, SyncCoordinator};

/// State shared by admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub coordinator: Arc<SyncCoordinator>,
    pub bus: Arc<dyn Publisher>,
    pub responses: Arc<ResponseLog>,
    pub api_key: Arc<str>,
}

pub fn setup_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/config", get(get_config))
        .route("/admin/responses", get(get_responses))
        .route("/admin/notify", post(post_notify))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the admin API until shutdown fires.
pub async fn serve(
    listener: TcpListener,
    state: AdminState,
    shutdown: broadcast::Receiver<()>,
) -> io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "Admin API listening");

    axum::serve(listener, setup_admin_router(state))
        .with_graceful_shutdown(wait(shutdown))
        .await?;

    tracing::info!("Admin API stopped");
    Ok(())
}
