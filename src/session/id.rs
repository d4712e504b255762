//! Session identifier type.

use std::fmt;
use std::str::FromStr;

use uuid::Uuid;

/// Unique identifier for a connected session.
///
/// A random 128-bit token minted when a connection is accepted. It is
/// displayed in the canonical hyphenated form, e.g.
/// `67e55044-10b1-426f-9247-bb680e5fe0c8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Mint a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    ///
    /// This is primarily for testing and fixed vectors.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// First five characters of the ID, used to keep log lines short.
    pub fn short(&self) -> String {
        self.to_string().chars().take(5).collect()
    }

    /// The display name derived from this ID.
    pub fn display_name(&self) -> String {
        super::names::generate(&self.to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for SessionId {
    type Err = crate::error::HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(SessionId)
            .map_err(|_| crate::error::HubError::InvalidSessionId(s.into()))
    }
}
