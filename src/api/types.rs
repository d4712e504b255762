//! API response types.

use serde::Serialize;

use crate::session::Session;

/// One connected session as seen by the introspection endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub user_id: String,
    pub user_name: String,
    /// Seconds since the connection was accepted.
    pub connected_seconds: f64,
}

impl SessionSummary {
    pub fn from_session(session: &Session) -> Self {
        Self {
            user_id: session.id.to_string(),
            user_name: session.display_name.clone(),
            connected_seconds: session.connected_at.elapsed().as_secs_f64(),
        }
    }
}

/// Response listing open sessions.
#[derive(Debug, Clone, Serialize)]
pub struct ListSessionsResponse {
    pub count: usize,
    pub sessions: Vec<SessionSummary>,
}

/// Error response body.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
        }
    }
}
