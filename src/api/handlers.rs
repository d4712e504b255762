//! HTTP handlers.

use axum::{extract::State, http::StatusCode, Json};

use super::types::{ErrorResponse, ListSessionsResponse, SessionSummary};
use crate::hub::{Hub, HubConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub hub: Hub,
}

impl AppState {
    pub fn new(hub: Hub) -> Self {
        Self { hub }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Hub::new(HubConfig::default()))
    }
}

/// Health check endpoint.
pub async fn health() -> &'static str {
    "OK"
}

/// API information endpoint.
pub async fn api_info(State(state): State<AppState>) -> Json<serde_json::Value> {
    let status = if state.hub.is_shutting_down() {
        "shutting_down"
    } else {
        "running"
    };

    Json(serde_json::json!({
        "name": "chat-hub",
        "version": env!("CARGO_PKG_VERSION"),
        "status": status,
        "sessions": state.hub.registry().count(),
    }))
}

/// List open sessions in connection order.
pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<ListSessionsResponse>, (StatusCode, Json<ErrorResponse>)> {
    let sessions = state.hub.registry().snapshot(None).map_err(|e| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::internal_error(e.to_string())),
        )
    })?;

    let sessions: Vec<SessionSummary> = sessions.iter().map(SessionSummary::from_session).collect();

    Ok(Json(ListSessionsResponse {
        count: sessions.len(),
        sessions,
    }))
}
