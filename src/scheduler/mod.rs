//! Cancellable one-shot timers.
//!
//! The controller never sleeps on its own. It asks a [`Scheduler`] to run
//! the commit after the undo window and keeps the returned
//! [`ScheduleHandle`] in the pending-delete registry. Cancelling the handle
//! before the timer fires stops the commit; cancelling afterwards is a
//! no-op.
//!
//! # Implementations
//!
//! - [`TokioScheduler`](runtime::TokioScheduler) - spawns a task on a tokio
//!   runtime that sleeps for the delay.
//! - [`ManualScheduler`](manual::ManualScheduler) - virtual clock driven by
//!   [`advance`](manual::ManualScheduler::advance), for deterministic tests.

pub mod manual;
pub mod runtime;

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

pub use self::manual::ManualScheduler;
pub use self::runtime::TokioScheduler;

/// Deferred work handed to a [`Scheduler`].
pub type ScheduledAction = BoxFuture<'static, ()>;

const ARMED: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

/// Handle to one scheduled action.
///
/// Clones share state. Exactly one of [`cancel`](Self::cancel) and
/// [`try_fire`](Self::try_fire) wins; the loser returns `false`.
///
/// # Examples
///
/// ```
/// use tasklist_undo::scheduler::ScheduleHandle;
///
/// let handle = ScheduleHandle::new();
/// assert!(handle.cancel());
/// assert!(!handle.cancel()); // idempotent
/// assert!(!handle.try_fire());
/// assert!(handle.is_cancelled());
///
/// let handle = ScheduleHandle::new();
/// assert!(handle.try_fire());
/// assert!(!handle.cancel()); // already fired, nothing to stop
/// assert!(handle.has_fired());
/// ```
#[derive(Debug, Clone)]
pub struct ScheduleHandle {
    state: Arc<AtomicU8>,
    token: CancellationToken,
}

impl ScheduleHandle {
    /// Creates an armed handle.
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(ARMED)),
            token: CancellationToken::new(),
        }
    }

    /// Cancels the action if it has not fired yet.
    ///
    /// Returns `true` if this call stopped the action.
    pub fn cancel(&self) -> bool {
        let won = self
            .state
            .compare_exchange(ARMED, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok();
        if won {
            self.token.cancel();
        }
        won
    }

    /// Marks the action as fired. Schedulers call this right before running
    /// the action and skip it when this returns `false`.
    pub fn try_fire(&self) -> bool {
        self.state
            .compare_exchange(ARMED, FIRED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Returns `true` once [`cancel`](Self::cancel) has won.
    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::Acquire) == CANCELLED
    }

    /// Returns `true` once the action has started running.
    pub fn has_fired(&self) -> bool {
        self.state.load(Ordering::Acquire) == FIRED
    }

    /// Resolves when the handle is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }
}

impl Default for ScheduleHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs an action once after a delay, unless cancelled first.
pub trait Scheduler: Send + Sync {
    /// Schedules `action` to run after `delay` and returns its handle.
    fn schedule(&self, delay: Duration, action: ScheduledAction) -> ScheduleHandle;
}
