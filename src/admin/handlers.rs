use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::admin::AdminState;
use crate::config::Document;
use crate::sync::{ConfigSnapshotEnvelope, Notification};

#[derive(Debug, Serialize, Deserialize)]
pub struct NodeStatus {
    pub version: String,
    pub status: String,
    pub hostname: String,
    pub node_id: String,
    pub topic: String,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<NodeStatus> {
    let identity = state.coordinator.identity();
    Json(NodeStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        hostname: identity.hostname().to_string(),
        node_id: identity.node_id().to_string(),
        topic: state.coordinator.topic().to_string(),
    })
}

pub async fn get_config(
    State(state): State<AdminState>,
) -> Result<Json<Document>, (StatusCode, String)> {
    state
        .coordinator
        .snapshot()
        .map(Json)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

pub async fn get_responses(State(state): State<AdminState>) -> Json<Vec<ConfigSnapshotEnvelope>> {
    Json(state.responses.recent())
}

pub async fn post_notify(
    State(state): State<AdminState>,
    Json(notification): Json<Notification>,
) -> Result<StatusCode, (StatusCode, String)> {
    if notification.command().is_none() {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("unknown command '{}'", notification.command),
        ));
    }

    let encoded = notification
        .encode()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    state
        .bus
        .publish(state.coordinator.topic(), encoded)
        .map_err(|e| (StatusCode::SERVICE_UNAVAILABLE, e.to_string()))?;

    tracing::info!(command = %notification.command, "Notification published from admin API");
    Ok(StatusCode::ACCEPTED)
}
