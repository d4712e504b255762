//! API layer for chat-hub.
//!
//! A thin axum shell around the [`Hub`](crate::hub::Hub): WebSocket
//! endpoints that turn each connection into a hub session, plus a few
//! read-only HTTP endpoints.
//!
//! ## Endpoints
//!
//! - `WS /` and `WS /ws` - Join the hub
//! - `GET /health` - Health check
//! - `GET /api/v1` - Server information
//! - `GET /api/v1/sessions` - Open sessions in connection order
//!
//! ## Example
//!
//! ```no_run
//! use chat_hub::api::{serve, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> chat_hub::Result<()> {
//!     let config = ServerConfig::new("127.0.0.1", 4242);
//!     serve(config).await
//! }
//! ```

pub mod handlers;
pub mod router;
pub mod types;
pub mod websocket;

pub use handlers::AppState;
pub use router::{create_router, create_router_with_state, run, serve, serve_with_hub, ServerConfig};
pub use types::{ErrorResponse, ListSessionsResponse, SessionSummary};
