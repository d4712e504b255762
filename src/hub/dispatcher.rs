//! Fan-out of envelopes to registered sessions.

use std::sync::Arc;

use tracing::{debug, warn};

use super::Envelope;
use crate::session::{ConnectionRegistry, Session, SessionId};
use crate::Result;

/// Outcome of one broadcast.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Recipients whose transport accepted the frame.
    pub delivered: usize,
    /// Recipients skipped because their transport refused it.
    pub failed: usize,
}

/// Sends envelopes to every open session in the registry.
///
/// Sends never wait on a recipient, and a failed send is logged and
/// skipped without retry. A session that cannot receive is expected to
/// disconnect on its own.
#[derive(Clone)]
pub struct BroadcastDispatcher {
    registry: Arc<ConnectionRegistry>,
}

impl BroadcastDispatcher {
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Deliver `envelope` to every open session except `exclude`.
    pub fn broadcast(&self, envelope: &Envelope, exclude: Option<&SessionId>) -> Result<Delivery> {
        let frame = envelope.to_frame()?;
        let recipients = self.registry.snapshot(exclude)?;
        let mut delivery = Delivery::default();

        for session in &recipients {
            match session.deliver(frame.clone()) {
                Ok(()) => delivery.delivered += 1,
                Err(e) => {
                    warn!(session = %session.id, kind = ?envelope.kind(), error = %e, "dropping envelope");
                    delivery.failed += 1;
                }
            }
        }

        debug!(
            kind = ?envelope.kind(),
            subject = envelope.user_id(),
            delivered = delivery.delivered,
            failed = delivery.failed,
            "broadcast"
        );
        Ok(delivery)
    }

    /// Deliver `envelope` to a single session.
    pub fn send_to(&self, session: &Session, envelope: &Envelope) -> Result<()> {
        session.deliver(envelope.to_frame()?)
    }
}
