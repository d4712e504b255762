//! API router and server entry points.

use std::time::Duration;

use axum::{
    routing::{any, get},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use super::handlers::{api_info, health, list_sessions, AppState};
use super::websocket::ws_handler;
use crate::error::HubError;
use crate::hub::{Hub, HubConfig};

/// Create the API router for a hub.
pub fn create_router(hub: Hub) -> Router {
    create_router_with_state(AppState::new(hub))
}

/// Create the API router with custom state.
pub fn create_router_with_state(state: AppState) -> Router {
    Router::new()
        // Clients connect to the bare host as well as to /ws.
        .route("/", any(ws_handler))
        .route("/ws", any(ws_handler))
        .route("/health", get(health))
        .route("/api/v1", get(api_info))
        .route("/api/v1/sessions", get(list_sessions))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Stop on Ctrl-C instead of being killed outright.
    pub graceful_shutdown: bool,
    /// How long shutdown waits for delayed sends to drain.
    pub shutdown_grace: Duration,
    /// Hub tuning.
    pub hub: HubConfig,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_hub(mut self, hub: HubConfig) -> Self {
        self.hub = hub;
        self
    }

    pub fn with_shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    pub fn without_graceful_shutdown(mut self) -> Self {
        self.graceful_shutdown = false;
        self
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4242,
            graceful_shutdown: true,
            shutdown_grace: Duration::from_secs(5),
            hub: HubConfig::default(),
        }
    }
}

/// Start the hub server.
pub async fn serve(config: ServerConfig) -> crate::Result<()> {
    let hub = Hub::new(config.hub.clone());
    serve_with_hub(config, hub).await
}

/// Start the server around an existing hub.
pub async fn serve_with_hub(config: ServerConfig, hub: Hub) -> crate::Result<()> {
    let listener = TcpListener::bind(config.bind_address()).await?;

    if config.graceful_shutdown {
        let signal_hub = hub.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
                signal_hub.shutdown();
            }
        });
    }

    run(listener, hub, config.shutdown_grace).await
}

/// Serve on an already bound listener until the hub shuts down.
///
/// Shutdown stops accepting first and gives delayed sends up to `grace` to
/// reach the sessions that are still open. Only then are the sessions
/// closed, and their connection tasks get up to `grace` to finish.
pub async fn run(listener: TcpListener, hub: Hub, grace: Duration) -> crate::Result<()> {
    info!("Listening websockets on {}", listener.local_addr()?);

    let token = hub.shutdown_token();
    let server = axum::serve(listener, create_router(hub.clone()))
        .with_graceful_shutdown(async move { token.cancelled().await });
    let mut server = tokio::spawn(async move { server.await });

    let shutdown = hub.shutdown_token();
    tokio::select! {
        _ = shutdown.cancelled() => {}
        result = &mut server => {
            // The listener failed before anyone asked it to stop.
            hub.disconnect();
            return match result {
                Ok(result) => result.map_err(HubError::from),
                Err(e) => Err(HubError::Io(std::io::Error::other(e))),
            };
        }
    }

    if !hub.drain(grace).await {
        warn!(
            pending = hub.delay().pending(),
            "shutdown grace elapsed with sends still pending"
        );
    }

    hub.disconnect();
    if let Ok(Ok(Err(e))) = tokio::time::timeout(grace, server).await {
        warn!(error = %e, "listener error during shutdown");
    }
    if !hub.wait_connections(grace).await {
        warn!(
            connections = hub.live_connections(),
            "connections still open after shutdown grace"
        );
    }

    if let Some(reason) = hub.fatal_error() {
        return Err(HubError::Aborted(reason.to_string()));
    }
    info!("chat-hub stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 4242);
        assert_eq!(config.bind_address(), "127.0.0.1:4242");
        assert!(config.graceful_shutdown);
        assert_eq!(config.hub.latency, Duration::from_millis(500));
    }

    #[test]
    fn test_server_config_custom() {
        let config = ServerConfig::new("0.0.0.0", 8080)
            .with_shutdown_grace(Duration::from_secs(1))
            .without_graceful_shutdown();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.shutdown_grace, Duration::from_secs(1));
        assert!(!config.graceful_shutdown);
    }

    #[test]
    fn test_router_creation() {
        let _router = create_router(Hub::default());
    }
}
