//! Virtual-clock scheduler for deterministic tests.

use std::time::Duration;

use parking_lot::Mutex;

use super::{ScheduleHandle, ScheduledAction, Scheduler};

struct Entry {
    seq: u64,
    due: Duration,
    handle: ScheduleHandle,
    action: ScheduledAction,
}

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_seq: u64,
    entries: Vec<Entry>,
}

/// Scheduler whose clock only moves when [`advance`](Self::advance) is called.
///
/// Due actions run inline inside `advance`, in deadline order (ties in
/// scheduling order), each awaited to completion before the next one starts.
///
/// # Examples
///
/// ```
/// use std::sync::atomic::{AtomicUsize, Ordering};
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tasklist_undo::scheduler::{ManualScheduler, Scheduler};
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let scheduler = ManualScheduler::new();
/// let runs = Arc::new(AtomicUsize::new(0));
/// let counter = runs.clone();
/// scheduler.schedule(
///     Duration::from_secs(10),
///     Box::pin(async move { counter.fetch_add(1, Ordering::SeqCst); }),
/// );
///
/// assert_eq!(scheduler.advance(Duration::from_secs(9)).await, 0);
/// assert_eq!(scheduler.advance(Duration::from_secs(1)).await, 1);
/// assert_eq!(runs.load(Ordering::SeqCst), 1);
/// # });
/// ```
#[derive(Default)]
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

impl ManualScheduler {
    /// Creates a scheduler with the clock at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time since creation.
    pub fn now(&self) -> Duration {
        self.state.lock().now
    }

    /// Number of scheduled actions that have neither fired nor been cancelled.
    pub fn pending(&self) -> usize {
        self.state
            .lock()
            .entries
            .iter()
            .filter(|e| !e.handle.is_cancelled())
            .count()
    }

    /// Moves the clock forward by `by`, running every action that falls due.
    ///
    /// Returns how many actions ran. Cancelled actions are discarded.
    pub async fn advance(&self, by: Duration) -> usize {
        let target = self.now() + by;
        let mut ran = 0;
        while let Some(entry) = self.pop_due(target) {
            if entry.handle.try_fire() {
                entry.action.await;
                ran += 1;
            }
        }
        let mut state = self.state.lock();
        if state.now < target {
            state.now = target;
        }
        ran
    }

    fn pop_due(&self, target: Duration) -> Option<Entry> {
        let mut state = self.state.lock();
        let index = state
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= target)
            .min_by_key(|(_, e)| (e.due, e.seq))
            .map(|(i, _)| i)?;
        let entry = state.entries.swap_remove(index);
        if entry.due > state.now {
            state.now = entry.due;
        }
        Some(entry)
    }
}

impl std::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ManualScheduler")
            .field("now", &state.now)
            .field("entries", &state.entries.len())
            .finish()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, action: ScheduledAction) -> ScheduleHandle {
        let handle = ScheduleHandle::new();
        let mut state = self.state.lock();
        let seq = state.next_seq;
        state.next_seq += 1;
        let due = state.now + delay;
        state.entries.push(Entry {
            seq,
            due,
            handle: handle.clone(),
            action,
        });
        handle
    }
}
