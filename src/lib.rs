//! # chat-hub
//!
//! Real-time broadcast hub for anonymous WebSocket chat.
//!
//! Clients open a WebSocket, get an ephemeral identity with a generated
//! name like "Grumpy Fox", and every payload they send is fanned out to
//! all other connected clients. Nothing is persisted: state lives only as
//! long as the connection.
//!
//! ## Features
//!
//! - **Session registry**: live connections tracked behind one lock, in
//!   connection order
//! - **Fan-out**: per-recipient failures are isolated and never retried
//! - **Simulated latency**: every outbound send is delayed without blocking
//! - **Lightweight**: tokio + axum, no storage
//!
//! ## Quick Start
//!
//! ```no_run
//! use chat_hub::{Envelope, Hub, HubConfig};
//!
//! #[tokio::main]
//! async fn main() -> chat_hub::Result<()> {
//!     chat_hub::logging::try_init().ok();
//!
//!     let hub = Hub::new(HubConfig::default());
//!     let (session, mut frames) = hub.connect()?;
//!     println!("{} connected as {}", session.id(), session.display_name());
//!
//!     if let Some(frame) = frames.recv().await {
//!         let welcome = Envelope::from_frame(&frame)?;
//!         println!("{welcome:?}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod hub;
pub mod logging;
pub mod session;

// Re-export commonly used types
pub use error::{HubError, Result};
pub use hub::{
    BroadcastDispatcher, DelaySimulator, Delivery, Envelope, EnvelopeKind, Hub, HubConfig,
    SessionLifecycle,
};
pub use session::{ConnectionRegistry, Frame, Outbox, Session, SessionId, SessionState};
