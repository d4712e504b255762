//! Wire envelopes sent from the hub to clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::session::{Frame, Session, SessionId};

/// Event pushed to a client, serialized as a JSON object tagged by `kind`.
///
/// For `Welcome` the identity fields name the recipient; for every other
/// kind they name the session that caused the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum Envelope {
    /// Sent once, privately, to a newly connected session.
    Welcome { user_id: String, user_name: String },
    /// Another session connected.
    Joined { user_id: String, user_name: String },
    /// Another session sent a payload.
    Message {
        user_id: String,
        user_name: String,
        message: Value,
    },
    /// Another session disconnected.
    Left { user_id: String, user_name: String },
}

/// Discriminant of an [`Envelope`], handy for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeKind {
    Welcome,
    Joined,
    Message,
    Left,
}

impl Envelope {
    pub fn welcome(session: &Session) -> Self {
        Self::Welcome {
            user_id: session.id.to_string(),
            user_name: session.display_name.clone(),
        }
    }

    pub fn joined(session: &Session) -> Self {
        Self::Joined {
            user_id: session.id.to_string(),
            user_name: session.display_name.clone(),
        }
    }

    pub fn message(session: &Session, message: Value) -> Self {
        Self::Message {
            user_id: session.id.to_string(),
            user_name: session.display_name.clone(),
            message,
        }
    }

    pub fn left(session: &Session) -> Self {
        Self::Left {
            user_id: session.id.to_string(),
            user_name: session.display_name.clone(),
        }
    }

    pub fn kind(&self) -> EnvelopeKind {
        match self {
            Self::Welcome { .. } => EnvelopeKind::Welcome,
            Self::Joined { .. } => EnvelopeKind::Joined,
            Self::Message { .. } => EnvelopeKind::Message,
            Self::Left { .. } => EnvelopeKind::Left,
        }
    }

    /// ID of the session this envelope is about.
    pub fn user_id(&self) -> &str {
        match self {
            Self::Welcome { user_id, .. }
            | Self::Joined { user_id, .. }
            | Self::Message { user_id, .. }
            | Self::Left { user_id, .. } => user_id,
        }
    }

    /// Serialize once into a frame shared by all recipients.
    pub fn to_frame(&self) -> crate::Result<Frame> {
        Ok(Frame::from(serde_json::to_string(self)?))
    }

    /// Parse a frame back into an envelope.
    pub fn from_frame(frame: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(frame)?)
    }

    /// Whether this envelope refers to `id`.
    pub fn is_about(&self, id: &SessionId) -> bool {
        self.user_id() == id.to_string()
    }
}
