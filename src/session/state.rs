//! Session state machine.

/// Represents the lifecycle state of a connected session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Transport accepted, session not yet registered.
    #[default]
    Connecting,
    /// Registered and visible to the dispatcher.
    Open,
    /// Transport released and removed from the registry. Terminal.
    Closed,
}

impl SessionState {
    /// Check if transition to target state is valid.
    ///
    /// Valid transitions:
    /// - Connecting -> Open
    /// - Connecting -> Closed
    /// - Open -> Closed
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (*self, target),
            (Connecting, Open) | (Connecting, Closed) | (Open, Closed)
        )
    }

    /// Attempt to transition to a new state.
    ///
    /// Returns `Ok(())` if the transition is valid, or an error otherwise.
    pub fn transition_to(&mut self, target: SessionState) -> crate::Result<()> {
        if self.can_transition_to(target) {
            *self = target;
            Ok(())
        } else {
            Err(crate::error::HubError::InvalidStateTransition {
                from: *self,
                to: target,
            })
        }
    }

    /// Check if this is a terminal state (no further transitions possible).
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Closed)
    }

    /// Check if the session may send and receive envelopes.
    pub fn is_open(&self) -> bool {
        matches!(self, SessionState::Open)
    }
}
