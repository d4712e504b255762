//! Error types for chat-hub.

use thiserror::Error;

use crate::session::{SessionId, SessionState};

/// Main error type for chat-hub operations.
#[derive(Error, Debug)]
pub enum HubError {
    /// The registry already holds a session with this ID.
    ///
    /// Only a broken ID source can produce this, so it is treated as fatal.
    #[error("duplicate session id: {0}")]
    DuplicateId(SessionId),

    /// Inbound client data is not valid JSON.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// A frame could not be handed to one session's transport.
    #[error("delivery to {id} failed: {reason}")]
    DeliverySend { id: SessionId, reason: String },

    /// Invalid state transition attempted.
    #[error("invalid state transition from {from:?} to {to:?}")]
    InvalidStateTransition { from: SessionState, to: SessionState },

    /// Text could not be parsed as a session ID.
    #[error("invalid session id: {0}")]
    InvalidSessionId(String),

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,

    /// The hub was stopped by a fatal error.
    #[error("hub aborted: {0}")]
    Aborted(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Outbound envelope could not be serialized.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl HubError {
    /// Whether this error signals a correctness bug that must stop the service.
    pub fn is_fatal(&self) -> bool {
        matches!(self, HubError::DuplicateId(_))
    }
}

/// Convenience Result type for chat-hub operations.
pub type Result<T> = std::result::Result<T, HubError>;
