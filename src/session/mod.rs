//! Session management module.
//!
//! This module provides types and utilities for tracking connected
//! sessions: identification, pseudonymous names, state, the outbound
//! transport handle, and the live registry.

mod id;
pub mod names;
mod outbox;
mod registry;
mod state;

pub use id::SessionId;
pub use outbox::{Frame, Outbox, OutboxError};
pub use registry::{ConnectionRegistry, Session};
pub use state::SessionState;
