//! Scheduler backed by a tokio runtime.

use std::time::Duration;

use tokio::runtime::{Handle, TryCurrentError};
use tokio_util::task::TaskTracker;

use super::{ScheduleHandle, ScheduledAction, Scheduler};

/// Spawns one task per scheduled action on a tokio runtime.
///
/// The spawned task sleeps for the delay, racing the handle's cancellation.
/// If the handle is cancelled first the action is dropped without running.
/// Once the action has started, cancelling no longer affects it.
///
/// # Examples
///
/// ```
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tasklist_undo::scheduler::{Scheduler, TokioScheduler};
///
/// # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
/// let scheduler = TokioScheduler::from_current().unwrap();
/// let ran = Arc::new(AtomicBool::new(false));
/// let flag = ran.clone();
/// scheduler.schedule(
///     Duration::from_millis(5),
///     Box::pin(async move { flag.store(true, Ordering::SeqCst) }),
/// );
/// scheduler.drain().await;
/// assert!(ran.load(Ordering::SeqCst));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    runtime: Handle,
    tracker: TaskTracker,
}

impl TokioScheduler {
    /// Creates a scheduler that spawns onto `runtime`.
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            tracker: TaskTracker::new(),
        }
    }

    /// Creates a scheduler on the runtime the caller is running in.
    ///
    /// # Errors
    ///
    /// Returns [`TryCurrentError`] when called outside a tokio runtime.
    pub fn from_current() -> Result<Self, TryCurrentError> {
        Handle::try_current().map(Self::new)
    }

    /// Number of timers that have not finished (sleeping or running).
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Waits until every timer scheduled so far has fired or been cancelled
    /// and its action has completed.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        self.tracker.reopen();
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, delay: Duration, action: ScheduledAction) -> ScheduleHandle {
        let handle = ScheduleHandle::new();
        let timer = handle.clone();
        self.tracker.spawn_on(
            async move {
                tokio::select! {
                    () = timer.cancelled() => {
                        tracing::trace!("scheduled action cancelled before firing");
                    }
                    () = tokio::time::sleep(delay) => {
                        if timer.try_fire() {
                            action.await;
                        }
                    }
                }
            },
            &self.runtime,
        );
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_action(counter: &Arc<AtomicUsize>) -> ScheduledAction {
        let counter = counter.clone();
        Box::pin(async move {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[tokio::test(start_paused = true)]
    async fn fires_after_delay() {
        let scheduler = TokioScheduler::from_current().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = scheduler.schedule(Duration::from_secs(10), counting_action(&counter));

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(handle.has_fired());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_before_firing_drops_action() {
        let scheduler = TokioScheduler::from_current().unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = scheduler.schedule(Duration::from_secs(10), counting_action(&counter));

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(handle.cancel());
        scheduler.drain().await;

        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.in_flight(), 0);
    }

    #[test]
    fn from_current_outside_runtime_fails() {
        assert!(TokioScheduler::from_current().is_err());
    }
}
