//! Artificial network latency.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::task::TaskTracker;

/// Runs outbound work after a fixed delay without blocking the caller.
///
/// Each scheduled action is its own task, so actions scheduled in order
/// are not guaranteed to fire in order. All tasks are tracked so shutdown
/// can wait for them to drain.
#[derive(Debug, Clone)]
pub struct DelaySimulator {
    latency: Duration,
    tracker: TaskTracker,
}

/// Handle to one scheduled action.
#[derive(Debug)]
pub struct DelayHandle {
    handle: JoinHandle<()>,
}

impl DelayHandle {
    /// Drop the action if it has not fired yet.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the action to complete or be cancelled.
    pub async fn join(self) {
        let _ = self.handle.await;
    }
}

impl DelaySimulator {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            tracker: TaskTracker::new(),
        }
    }

    /// The configured latency.
    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Run `action` once, `delay` from now.
    pub fn after<F>(&self, delay: Duration, action: F) -> DelayHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let handle = self.tracker.spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            action.await;
        });
        DelayHandle { handle }
    }

    /// Run `action` once after the configured latency.
    pub fn schedule<F>(&self, action: F) -> DelayHandle
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.after(self.latency, action)
    }

    /// Number of actions that have not finished yet.
    pub fn pending(&self) -> usize {
        self.tracker.len()
    }

    /// Wait up to `timeout` for every scheduled action to finish.
    ///
    /// Returns `true` if everything drained in time. Actions scheduled
    /// while draining are waited on too.
    pub async fn drain(&self, timeout: Duration) -> bool {
        self.tracker.close();
        let drained = tokio::time::timeout(timeout, self.tracker.wait())
            .await
            .is_ok();
        self.tracker.reopen();
        drained
    }
}
