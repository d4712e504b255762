//! Outbound transport handle for a session.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TrySendError};

/// A serialized envelope ready to be written to a socket.
///
/// Shared between all recipients of one broadcast.
pub type Frame = Arc<str>;

/// Sending half of a session's transport.
///
/// Frames are queued on a bounded channel drained by the connection's
/// writer task. Queuing never waits: a full or closed queue fails the send
/// for this session only.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: mpsc::Sender<Frame>,
}

/// Why a frame could not be queued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutboxError {
    /// The writer side has gone away.
    Closed,
    /// The session is not draining its queue fast enough.
    Full,
}

impl std::fmt::Display for OutboxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "outbox closed"),
            Self::Full => write!(f, "outbox full"),
        }
    }
}

impl Outbox {
    /// Create an outbox and the receiver its writer task drains.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    /// Queue a frame without waiting.
    pub fn push(&self, frame: Frame) -> Result<(), OutboxError> {
        self.tx.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => OutboxError::Full,
            TrySendError::Closed(_) => OutboxError::Closed,
        })
    }

    /// Whether the writer side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_push_and_receive_in_order() {
        let (outbox, mut rx) = Outbox::channel(8);
        outbox.push(Frame::from("one")).unwrap();
        outbox.push(Frame::from("two")).unwrap();

        assert_eq!(&*rx.recv().await.unwrap(), "one");
        assert_eq!(&*rx.recv().await.unwrap(), "two");
    }

    #[test]
    fn test_push_to_dropped_receiver() {
        let (outbox, rx) = Outbox::channel(8);
        drop(rx);
        assert!(outbox.is_closed());
        assert_eq!(outbox.push(Frame::from("lost")), Err(OutboxError::Closed));
    }

    #[test]
    fn test_push_when_full() {
        let (outbox, _rx) = Outbox::channel(1);
        outbox.push(Frame::from("first")).unwrap();
        assert_eq!(outbox.push(Frame::from("second")), Err(OutboxError::Full));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let (outbox, _rx) = Outbox::channel(0);
        assert!(outbox.push(Frame::from("fits")).is_ok());
    }
}
