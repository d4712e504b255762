//! Broadcast hub.
//!
//! The [`Hub`] bundles everything connection tasks share: the
//! [`ConnectionRegistry`], the [`BroadcastDispatcher`] reading from it, the
//! [`DelaySimulator`] every outbound send goes through, and the shutdown
//! tokens. It is cheap to clone and is handed to each connection.
//!
//! Shutdown runs in two phases. [`Hub::shutdown`] stops new connections
//! while open sessions stay registered so delayed sends can still reach
//! them. [`Hub::disconnect`] then closes the sessions themselves.

mod delay;
mod dispatcher;
mod envelope;
mod lifecycle;

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::task_tracker::TaskTrackerToken;
use tokio_util::task::TaskTracker;

pub use delay::{DelayHandle, DelaySimulator};
pub use dispatcher::{BroadcastDispatcher, Delivery};
pub use envelope::{Envelope, EnvelopeKind};
pub use lifecycle::SessionLifecycle;

use crate::error::HubError;
use crate::session::{ConnectionRegistry, Frame, Outbox};
use crate::Result;

/// Default artificial latency before every outbound send.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(500);

/// Default number of frames queued per session before sends to it fail.
pub const DEFAULT_OUTBOX_CAPACITY: usize = 256;

/// Hub tuning.
#[derive(Debug, Clone)]
pub struct HubConfig {
    /// Delay applied before every outbound send.
    pub latency: Duration,
    /// Per-session outbound queue size.
    pub outbox_capacity: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            latency: DEFAULT_LATENCY,
            outbox_capacity: DEFAULT_OUTBOX_CAPACITY,
        }
    }
}

/// Shared handle to the hub.
#[derive(Clone)]
pub struct Hub {
    registry: Arc<ConnectionRegistry>,
    dispatcher: BroadcastDispatcher,
    delay: DelaySimulator,
    outbox_capacity: usize,
    shutdown: CancellationToken,
    disconnect: CancellationToken,
    connections: TaskTracker,
    fatal: Arc<OnceLock<String>>,
}

impl Hub {
    pub fn new(config: HubConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let dispatcher = BroadcastDispatcher::new(Arc::clone(&registry));
        Self {
            registry,
            dispatcher,
            delay: DelaySimulator::new(config.latency),
            outbox_capacity: config.outbox_capacity,
            shutdown: CancellationToken::new(),
            disconnect: CancellationToken::new(),
            connections: TaskTracker::new(),
            fatal: Arc::new(OnceLock::new()),
        }
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    pub fn dispatcher(&self) -> &BroadcastDispatcher {
        &self.dispatcher
    }

    pub fn delay(&self) -> &DelaySimulator {
        &self.delay
    }

    /// Accept a new connection.
    ///
    /// Returns the session's lifecycle and the receiver its writer task
    /// must drain into the transport.
    pub fn connect(&self) -> Result<(SessionLifecycle, mpsc::Receiver<Frame>)> {
        let (outbox, rx) = Outbox::channel(self.outbox_capacity);
        let lifecycle = SessionLifecycle::accept(self, outbox)?;
        Ok((lifecycle, rx))
    }

    /// Stop accepting connections.
    ///
    /// Open sessions keep running until [`Hub::disconnect`].
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Close every open session. Implies [`Hub::shutdown`].
    pub fn disconnect(&self) {
        self.shutdown.cancel();
        self.disconnect.cancel();
    }

    /// Record an invariant violation and shut down.
    ///
    /// Only the first recorded error is kept.
    pub fn abort(&self, err: &HubError) {
        let _ = self.fatal.set(err.to_string());
        self.shutdown();
    }

    /// The error that aborted the hub, if any.
    pub fn fatal_error(&self) -> Option<&str> {
        self.fatal.get().map(String::as_str)
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Token cancelled when the hub stops accepting connections.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Token cancelled when open sessions must close.
    pub fn disconnect_token(&self) -> CancellationToken {
        self.disconnect.clone()
    }

    /// Mark a connection task as live until the returned token drops.
    pub fn track_connection(&self) -> TaskTrackerToken {
        self.connections.token()
    }

    /// Number of connection tasks still running.
    pub fn live_connections(&self) -> usize {
        self.connections.len()
    }

    /// Wait up to `timeout` for every connection task to finish.
    pub async fn wait_connections(&self, timeout: Duration) -> bool {
        self.connections.close();
        let done = tokio::time::timeout(timeout, self.connections.wait())
            .await
            .is_ok();
        self.connections.reopen();
        done
    }

    /// Wait up to `timeout` for in-flight delayed sends.
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.delay.drain(timeout).await
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new(HubConfig::default())
    }
}
