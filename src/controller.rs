//! The undo-delete state machine.
//!
//! # Lifecycle
//!
//! ```text
//! Visible -> PendingRemoval -> Committing -> Committed
//!                 |                 |
//!                 +-- undo ---------+--> Restored (Visible again)
//!                                   |
//!                                   +-- delete failed --> Restored (rollback)
//! ```
//!
//! All three stores (visible tasks, pending deletions, notices) sit behind
//! one mutex and are only changed by the controller. The lock is never held
//! across an `.await`, so every local transition is applied completely
//! before anything else observes the state.
//!
//! # Undo during an in-flight commit
//!
//! Once the timer has fired and the delete request is on the wire, `undo`
//! still succeeds locally: the task reappears and the notice goes away. The
//! request cannot be recalled, so the backend may end up deleting a task the
//! user sees as restored. The controller detects that case when the request
//! resolves and reports it as [`DeleteEvent::LateCommit`]; it does not try
//! to reconcile further.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::collection::TaskCollection;
use crate::config::UndoConfig;
use crate::deleter::TaskDeleter;
use crate::error::{DeleteFailure, Result, UndoError};
use crate::notifications::NotificationQueue;
use crate::registry::PendingDeleteRegistry;
use crate::scheduler::{ScheduledAction, Scheduler};
use crate::types::{NotificationItem, Task};

/// Where a task currently is in the deletion lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletionState {
    /// In the visible collection.
    Visible,
    /// Hidden, waiting for the undo window to close.
    PendingRemoval,
    /// Hidden, delete request sent and not resolved yet.
    Committing,
}

/// Lifecycle notifications broadcast by the controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeleteEvent {
    /// A task was hidden and its deletion scheduled.
    Requested {
        /// The task.
        task_id: String,
    },
    /// A pending deletion was cancelled and the task restored.
    Undone {
        /// The task.
        task_id: String,
    },
    /// The delete endpoint confirmed the deletion.
    Committed {
        /// The task.
        task_id: String,
    },
    /// The delete endpoint failed; the task was put back.
    RolledBack {
        /// The task.
        task_id: String,
        /// What the endpoint reported.
        failure: DeleteFailure,
    },
    /// A delete request resolved after its deletion had been undone.
    LateCommit {
        /// The task.
        task_id: String,
        /// Whether the backend reported the task as deleted.
        remote_deleted: bool,
    },
}

impl DeleteEvent {
    /// The task this event is about.
    pub fn task_id(&self) -> &str {
        match self {
            Self::Requested { task_id }
            | Self::Undone { task_id }
            | Self::Committed { task_id }
            | Self::RolledBack { task_id, .. }
            | Self::LateCommit { task_id, .. } => task_id,
        }
    }

    /// The reported error, for [`RolledBack`](Self::RolledBack) events.
    pub fn error(&self) -> Option<UndoError> {
        match self {
            Self::RolledBack { task_id, failure } => Some(UndoError::CommitFailed {
                task_id: task_id.clone(),
                failure: failure.clone(),
            }),
            _ => None,
        }
    }
}

/// Result of a fired commit that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommitOutcome {
    /// Deletion confirmed and cleaned up.
    Committed,
    /// Nothing was pending any more; no request was sent.
    Skipped,
    /// The request resolved after an undo.
    Superseded,
}

#[derive(Debug, Default)]
struct DeleteState {
    tasks: TaskCollection,
    pending: PendingDeleteRegistry,
    notifications: NotificationQueue,
}

impl DeleteState {
    fn restore(&mut self, snapshot: Task) {
        let task_id = snapshot.id.clone();
        if let Err(err) = self.tasks.insert(snapshot) {
            tracing::warn!(task_id, %err, "restored task already visible, keeping visible copy");
        }
    }
}

struct Inner {
    state: Mutex<DeleteState>,
    scheduler: Arc<dyn Scheduler>,
    deleter: Arc<dyn TaskDeleter>,
    undo_window: Duration,
    events: broadcast::Sender<DeleteEvent>,
}

/// Orchestrates optimistic deletion with an undo window.
///
/// Cheap to clone; clones share the same state.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tasklist_undo::deleter::TaskDeleter;
/// use tasklist_undo::scheduler::ManualScheduler;
/// use tasklist_undo::{DeleteFailure, Task, UndoConfig, UndoDeleteController};
///
/// struct Offline;
///
/// #[async_trait::async_trait]
/// impl TaskDeleter for Offline {
///     async fn delete(&self, _task_id: &str) -> Result<(), DeleteFailure> {
///         Err(DeleteFailure::transport("offline"))
///     }
/// }
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let scheduler = Arc::new(ManualScheduler::new());
/// let controller =
///     UndoDeleteController::new(UndoConfig::default(), scheduler.clone(), Arc::new(Offline));
/// controller.load_tasks(vec![Task::new("t2", "Book flights")]);
///
/// controller.request_delete("t2").unwrap();
/// scheduler.advance(Duration::from_secs(10)).await;
///
/// // the failed delete put the task back and cleared the notice
/// assert_eq!(controller.tasks()[0].title, "Book flights");
/// assert!(controller.notifications().is_empty());
/// # });
/// ```
#[derive(Clone)]
pub struct UndoDeleteController {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for UndoDeleteController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("UndoDeleteController")
            .field("undo_window", &self.inner.undo_window)
            .field("visible", &state.tasks.len())
            .field("pending", &state.pending.len())
            .field("notifications", &state.notifications.len())
            .finish()
    }
}

impl UndoDeleteController {
    /// Creates a controller with an empty task list.
    pub fn new(
        config: UndoConfig,
        scheduler: Arc<dyn Scheduler>,
        deleter: Arc<dyn TaskDeleter>,
    ) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(DeleteState::default()),
                scheduler,
                deleter,
                undo_window: config.undo_window(),
                events,
            }),
        }
    }

    /// The configured undo window.
    pub fn undo_window(&self) -> Duration {
        self.inner.undo_window
    }

    /// Subscribes to lifecycle events from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<DeleteEvent> {
        self.inner.events.subscribe()
    }

    /// Replaces the visible tasks, e.g. after fetching the list.
    ///
    /// Tasks whose deletion is pending are left out so a stale fetch cannot
    /// resurrect them.
    pub fn load_tasks(&self, tasks: impl IntoIterator<Item = Task>) {
        let mut state = self.inner.state.lock();
        let DeleteState {
            tasks: visible,
            pending,
            ..
        } = &mut *state;
        visible.load(tasks.into_iter().filter(|t| !pending.contains(&t.id)));
        tracing::debug!(visible = visible.len(), "task list loaded");
    }

    /// Inserts or updates a visible task (create and edit flows).
    ///
    /// Returns the previous version when updating.
    ///
    /// # Errors
    ///
    /// [`UndoError::AlreadyPending`] if the task is pending deletion.
    pub fn upsert_task(&self, task: Task) -> Result<Option<Task>> {
        let mut state = self.inner.state.lock();
        if state.pending.contains(&task.id) {
            return Err(UndoError::AlreadyPending { task_id: task.id });
        }
        Ok(state.tasks.replace(task))
    }

    /// Hides the task and schedules its deletion after the undo window.
    ///
    /// # Errors
    ///
    /// - [`UndoError::AlreadyPending`] if a deletion is already pending; the
    ///   running timer is not restarted.
    /// - [`UndoError::NotFound`] if the task is not visible.
    pub fn request_delete(&self, task_id: &str) -> Result<()> {
        let mut state = self.inner.state.lock();
        if state.pending.contains(task_id) {
            return Err(UndoError::AlreadyPending {
                task_id: task_id.to_string(),
            });
        }
        let task = state.tasks.remove(task_id)?;

        let action = self.commit_action(task_id);
        let scheduler = &self.inner.scheduler;
        let window = self.inner.undo_window;
        state
            .pending
            .begin(task_id, task.clone(), || scheduler.schedule(window, action))?;
        state.notifications.enqueue(task_id, task);
        let lifecycle_id = state.pending.get(task_id).map(|e| e.lifecycle_id);
        self.emit(DeleteEvent::Requested {
            task_id: task_id.to_string(),
        });
        drop(state);

        tracing::info!(
            task_id,
            lifecycle_id = ?lifecycle_id,
            window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX),
            "task hidden, deletion scheduled"
        );
        Ok(())
    }

    /// Cancels a pending deletion and puts the task back at the end of the
    /// visible list, unchanged.
    ///
    /// # Errors
    ///
    /// [`UndoError::NotPending`] if no deletion is pending; nothing changes.
    pub fn undo(&self, task_id: &str) -> Result<Task> {
        let mut state = self.inner.state.lock();
        let committing = state.pending.get(task_id).is_some_and(|e| e.committing);
        let snapshot = state.pending.cancel(task_id)?;
        state.restore(snapshot.clone());
        state.notifications.dequeue(task_id);
        self.emit(DeleteEvent::Undone {
            task_id: task_id.to_string(),
        });
        drop(state);

        if committing {
            tracing::warn!(
                task_id,
                "undo after the delete request was sent, backend may still delete the task"
            );
        } else {
            tracing::info!(task_id, "deletion undone");
        }
        Ok(snapshot)
    }

    /// Removes the undo notice without touching the pending deletion.
    ///
    /// Returns `false` if there was no notice.
    pub fn dismiss(&self, task_id: &str) -> bool {
        self.inner.state.lock().notifications.dequeue(task_id)
    }

    /// Snapshot of the visible tasks in display order.
    pub fn tasks(&self) -> Vec<Task> {
        self.inner.state.lock().tasks.to_vec()
    }

    /// The visible task with `task_id`.
    pub fn task(&self, task_id: &str) -> Option<Task> {
        self.inner.state.lock().tasks.get(task_id).cloned()
    }

    /// Snapshot of the undo notices in the order they were raised.
    pub fn notifications(&self) -> Vec<NotificationItem> {
        self.inner.state.lock().notifications.list().to_vec()
    }

    /// Number of deletions in flight.
    pub fn pending_count(&self) -> usize {
        self.inner.state.lock().pending.len()
    }

    /// Returns `true` if a deletion is pending for `task_id`.
    pub fn is_pending(&self, task_id: &str) -> bool {
        self.inner.state.lock().pending.contains(task_id)
    }

    /// Lifecycle state of `task_id`, or `None` if the controller does not
    /// know it (never loaded, or deleted for good).
    pub fn lifecycle(&self, task_id: &str) -> Option<DeletionState> {
        let state = self.inner.state.lock();
        if let Some(entry) = state.pending.get(task_id) {
            return Some(if entry.committing {
                DeletionState::Committing
            } else {
                DeletionState::PendingRemoval
            });
        }
        state
            .tasks
            .contains(task_id)
            .then_some(DeletionState::Visible)
    }

    fn commit_action(&self, task_id: &str) -> ScheduledAction {
        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        let task_id = task_id.to_string();
        Box::pin(async move {
            let Some(inner) = inner.upgrade() else {
                return;
            };
            let controller = UndoDeleteController { inner };
            if let Err(err) = controller.commit(&task_id).await {
                tracing::debug!(task_id, %err, "commit finished with error");
            }
        })
    }

    fn begin_commit(&self, task_id: &str) -> Option<(Task, Uuid)> {
        self.inner.state.lock().pending.mark_committing(task_id)
    }

    /// Sends the delete request for a pending task and reconciles the result.
    pub(crate) async fn commit(&self, task_id: &str) -> Result<CommitOutcome> {
        let Some((snapshot, lifecycle_id)) = self.begin_commit(task_id) else {
            tracing::debug!(task_id, "commit skipped, deletion no longer pending");
            return Ok(CommitOutcome::Skipped);
        };
        tracing::debug!(task_id, %lifecycle_id, "committing deletion");

        let result = self.inner.deleter.delete(task_id).await;

        let mut state = self.inner.state.lock();
        let current = state
            .pending
            .get(task_id)
            .is_some_and(|e| e.lifecycle_id == lifecycle_id);
        if current {
            state.pending.complete(task_id);
            state.notifications.dequeue(task_id);
        }

        match result {
            Ok(()) if current => {
                self.emit(DeleteEvent::Committed {
                    task_id: task_id.to_string(),
                });
                drop(state);
                tracing::info!(task_id, %lifecycle_id, "task deleted");
                Ok(CommitOutcome::Committed)
            }
            Err(failure) if current => {
                state.restore(snapshot);
                self.emit(DeleteEvent::RolledBack {
                    task_id: task_id.to_string(),
                    failure: failure.clone(),
                });
                drop(state);
                tracing::warn!(task_id, %lifecycle_id, %failure, "delete failed, task restored");
                Err(UndoError::CommitFailed {
                    task_id: task_id.to_string(),
                    failure,
                })
            }
            result => {
                let remote_deleted = result.is_ok();
                self.emit(DeleteEvent::LateCommit {
                    task_id: task_id.to_string(),
                    remote_deleted,
                });
                drop(state);
                if remote_deleted {
                    tracing::warn!(
                        task_id,
                        %lifecycle_id,
                        "delete landed after undo, task is visible but gone from the backend"
                    );
                } else {
                    tracing::debug!(task_id, %lifecycle_id, "delete failed after undo, nothing to roll back");
                }
                Ok(CommitOutcome::Superseded)
            }
        }
    }

    /// Broadcasts `event`. Callers hold the state lock so the event order
    /// matches the order of state transitions.
    fn emit(&self, event: DeleteEvent) {
        // no subscribers is fine
        let _ = self.inner.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingDeleter {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl TaskDeleter for CountingDeleter {
        async fn delete(&self, _task_id: &str) -> std::result::Result<(), DeleteFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(DeleteFailure::with_status(500, "boom"))
            } else {
                Ok(())
            }
        }
    }

    fn controller_with(deleter: Arc<CountingDeleter>) -> (UndoDeleteController, Arc<ManualScheduler>) {
        let scheduler = Arc::new(ManualScheduler::new());
        let controller = UndoDeleteController::new(UndoConfig::default(), scheduler.clone(), deleter);
        controller.load_tasks(vec![Task::new("a", "A"), Task::new("b", "B")]);
        (controller, scheduler)
    }

    #[tokio::test]
    async fn commit_without_pending_entry_makes_no_call() {
        let deleter = Arc::new(CountingDeleter::default());
        let (controller, _scheduler) = controller_with(deleter.clone());

        let outcome = controller.commit("a").await.unwrap();
        assert_eq!(outcome, CommitOutcome::Skipped);
        assert_eq!(deleter.calls.load(Ordering::SeqCst), 0);
        assert_eq!(controller.tasks().len(), 2);
    }

    #[tokio::test]
    async fn commit_success_cleans_up() {
        let deleter = Arc::new(CountingDeleter::default());
        let (controller, _scheduler) = controller_with(deleter.clone());
        controller.request_delete("a").unwrap();

        assert_eq!(controller.commit("a").await.unwrap(), CommitOutcome::Committed);
        assert_eq!(controller.pending_count(), 0);
        assert!(controller.notifications().is_empty());
        assert_eq!(controller.lifecycle("a"), None);
    }

    #[tokio::test]
    async fn commit_failure_returns_commit_failed() {
        let deleter = Arc::new(CountingDeleter {
            fail: true,
            ..CountingDeleter::default()
        });
        let (controller, _scheduler) = controller_with(deleter);
        controller.request_delete("a").unwrap();

        let err = controller.commit("a").await.unwrap_err();
        assert!(matches!(err, UndoError::CommitFailed { ref task_id, .. } if task_id == "a"));
        assert_eq!(controller.lifecycle("a"), Some(DeletionState::Visible));
    }

    #[tokio::test]
    async fn dropped_controller_disarms_timers() {
        let deleter = Arc::new(CountingDeleter::default());
        let (controller, scheduler) = controller_with(deleter.clone());
        controller.request_delete("a").unwrap();
        drop(controller);

        assert_eq!(scheduler.advance(Duration::from_secs(10)).await, 1);
        assert_eq!(deleter.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn lifecycle_reports_each_state() {
        let deleter = Arc::new(CountingDeleter::default());
        let (controller, _scheduler) = controller_with(deleter);
        assert_eq!(controller.lifecycle("a"), Some(DeletionState::Visible));
        controller.request_delete("a").unwrap();
        assert_eq!(controller.lifecycle("a"), Some(DeletionState::PendingRemoval));
        assert_eq!(controller.lifecycle("zzz"), None);
    }

    #[test]
    fn event_error_maps_rolled_back_only() {
        let event = DeleteEvent::RolledBack {
            task_id: "t".to_string(),
            failure: DeleteFailure::transport("down"),
        };
        assert!(matches!(event.error(), Some(UndoError::CommitFailed { .. })));
        assert_eq!(event.task_id(), "t");
        assert!(DeleteEvent::Committed {
            task_id: "t".to_string()
        }
        .error()
        .is_none());
    }

    #[test]
    fn event_serialization_is_tagged() {
        let json = serde_json::to_value(DeleteEvent::LateCommit {
            task_id: "t".to_string(),
            remote_deleted: true,
        })
        .unwrap();
        assert_eq!(json["type"], "late_commit");
        assert_eq!(json["task_id"], "t");
    }
}
