//! Live session registry.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::time::Instant;

use tracing::warn;

use super::{Frame, Outbox, OutboxError, SessionId, SessionState};
use crate::error::HubError;
use crate::Result;

/// One live connection.
#[derive(Debug, Clone)]
pub struct Session {
    /// Unique identifier.
    pub id: SessionId,
    /// Name derived from `id` once, at creation.
    pub display_name: String,
    /// Current state.
    pub state: SessionState,
    /// Time the connection was accepted.
    pub connected_at: Instant,
    outbox: Outbox,
}

impl Session {
    /// Create a session in the `Connecting` state.
    pub fn new(id: SessionId, outbox: Outbox) -> Self {
        Self {
            id,
            display_name: id.display_name(),
            state: SessionState::Connecting,
            connected_at: Instant::now(),
            outbox,
        }
    }

    /// Queue a frame on this session's transport.
    pub fn deliver(&self, frame: Frame) -> Result<()> {
        self.outbox
            .push(frame)
            .map_err(|e: OutboxError| HubError::DeliverySend {
                id: self.id,
                reason: e.to_string(),
            })
    }
}

#[derive(Default)]
struct Inner {
    sessions: HashMap<SessionId, (u64, Session)>,
    /// Insertion sequence -> id, giving snapshots a stable order.
    order: BTreeMap<u64, SessionId>,
    next_seq: u64,
}

/// Thread-safe registry of live sessions.
///
/// Every mutation and every snapshot takes the same lock, so a snapshot
/// never observes a half-inserted or half-removed session.
pub struct ConnectionRegistry {
    inner: RwLock<Inner>,
}

impl ConnectionRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Register a session.
    ///
    /// Fails with [`HubError::DuplicateId`] if the ID is already live.
    pub fn add(&self, session: Session) -> Result<()> {
        let mut inner = self.inner.write().map_err(|_| HubError::LockPoisoned)?;

        if inner.sessions.contains_key(&session.id) {
            return Err(HubError::DuplicateId(session.id));
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.order.insert(seq, session.id);
        inner.sessions.insert(session.id, (seq, session));
        Ok(())
    }

    /// Remove a session from the registry.
    ///
    /// Returns the removed session, or None if it was not registered.
    pub fn remove(&self, id: &SessionId) -> Result<Option<Session>> {
        let mut inner = self.inner.write().map_err(|_| HubError::LockPoisoned)?;

        let Some((seq, session)) = inner.sessions.remove(id) else {
            return Ok(None);
        };
        inner.order.remove(&seq);
        Ok(Some(session))
    }

    /// Open sessions in insertion order, optionally leaving one out.
    pub fn snapshot(&self, exclude: Option<&SessionId>) -> Result<Vec<Session>> {
        let inner = self.inner.read().map_err(|_| HubError::LockPoisoned)?;

        Ok(inner
            .order
            .values()
            .filter(|id| Some(*id) != exclude)
            .filter_map(|id| inner.sessions.get(id))
            .map(|(_, session)| session)
            .filter(|session| session.state.is_open())
            .cloned()
            .collect())
    }

    /// Get a clone of the session with the given ID.
    pub fn get(&self, id: &SessionId) -> Result<Option<Session>> {
        let inner = self.inner.read().map_err(|_| HubError::LockPoisoned)?;
        Ok(inner.sessions.get(id).map(|(_, s)| s.clone()))
    }

    /// Check if a session is registered.
    pub fn contains(&self, id: &SessionId) -> Result<bool> {
        let inner = self.inner.read().map_err(|_| HubError::LockPoisoned)?;
        Ok(inner.sessions.contains_key(id))
    }

    /// Get the number of registered sessions.
    ///
    /// Reports zero if the lock is poisoned.
    pub fn count(&self) -> usize {
        match self.inner.read() {
            Ok(inner) => inner.sessions.len(),
            Err(_) => {
                warn!("session registry lock poisoned, reporting no sessions");
                0
            }
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
