//! Per-connection state machine.

use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::{Envelope, Hub};
use crate::error::HubError;
use crate::session::{Outbox, Session, SessionId, SessionState};
use crate::Result;

/// Drives one session from acceptance to teardown.
///
/// `accept` registers the session and schedules its Welcome (private) and
/// Joined (everyone else) envelopes. Inbound payloads become Message
/// broadcasts and `close` unregisters the session and broadcasts Left.
///
/// Message and Left broadcasts for a session wait until its Welcome and
/// Joined have gone out, so peers never hear about a session before it
/// has been greeted.
///
/// A session is `Open` from registration, before its Welcome is sent, so it
/// may receive a peer's broadcast ahead of its own Welcome.
pub struct SessionLifecycle {
    hub: Hub,
    session: Session,
    announced: watch::Receiver<bool>,
}

impl SessionLifecycle {
    /// Accept a new connection whose frames are written through `outbox`.
    ///
    /// Fails with [`HubError::DuplicateId`] if the freshly minted ID is
    /// already live.
    pub fn accept(hub: &Hub, outbox: Outbox) -> Result<Self> {
        Self::accept_with_id(hub, SessionId::new(), outbox)
    }

    pub(crate) fn accept_with_id(hub: &Hub, id: SessionId, outbox: Outbox) -> Result<Self> {
        let mut session = Session::new(id, outbox);
        session.state.transition_to(SessionState::Open)?;
        hub.registry().add(session.clone())?;

        info!("+++ {}[{}] joined", session.display_name, session.id);

        let (announce_tx, announced) = watch::channel(false);
        let dispatcher = hub.dispatcher().clone();
        let greeted = session.clone();
        hub.delay().schedule(async move {
            if let Err(e) = dispatcher.send_to(&greeted, &Envelope::welcome(&greeted)) {
                warn!(session = %greeted.id, error = %e, "welcome not delivered");
            }
            if let Err(e) = dispatcher.broadcast(&Envelope::joined(&greeted), Some(&greeted.id)) {
                warn!(session = %greeted.id, error = %e, "joined broadcast failed");
            }
            announce_tx.send_replace(true);
        });

        Ok(Self {
            hub: hub.clone(),
            session,
            announced,
        })
    }

    pub fn id(&self) -> SessionId {
        self.session.id
    }

    pub fn display_name(&self) -> &str {
        &self.session.display_name
    }

    pub fn state(&self) -> SessionState {
        self.session.state
    }

    /// Handle one inbound payload.
    ///
    /// Valid JSON is broadcast to every other session as a Message.
    /// Anything else fails with [`HubError::MalformedMessage`] and leaves
    /// the session open. Payloads arriving after close are ignored.
    pub fn receive(&self, data: &[u8]) -> Result<()> {
        if !self.session.state.is_open() {
            return Ok(());
        }

        let message: Value =
            serde_json::from_slice(data).map_err(|e| HubError::MalformedMessage(e.to_string()))?;

        debug!(
            "[{} - {}] {}",
            self.session.display_name,
            self.session.id.short(),
            String::from_utf8_lossy(data)
        );

        self.broadcast_when_announced(Envelope::message(&self.session, message));
        Ok(())
    }

    /// Tear the session down.
    ///
    /// Returns `false` if it was already closed, in which case nothing
    /// happens.
    pub fn close(&mut self) -> bool {
        if self.session.state.transition_to(SessionState::Closed).is_err() {
            return false;
        }

        if let Err(e) = self.hub.registry().remove(&self.session.id) {
            warn!(session = %self.session.id, error = %e, "failed to unregister session");
        }

        info!("--- {}[{}] left", self.session.display_name, self.session.id);

        self.broadcast_when_announced(Envelope::left(&self.session));
        true
    }

    fn broadcast_when_announced(&self, envelope: Envelope) {
        let dispatcher = self.hub.dispatcher().clone();
        let mut announced = self.announced.clone();
        let id = self.session.id;

        self.hub.delay().schedule(async move {
            // An abandoned greeting drops the sender; go ahead anyway.
            let _ = announced.wait_for(|done| *done).await;
            if let Err(e) = dispatcher.broadcast(&envelope, Some(&id)) {
                warn!(session = %id, kind = ?envelope.kind(), error = %e, "broadcast failed");
            }
        });
    }
}
