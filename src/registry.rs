//! Pending deletions and their restore snapshots.
//!
//! A [`PendingDelete`] exists from the moment a task is optimistically
//! removed until its deletion is committed, rolled back or undone. It holds
//! the [`ScheduleHandle`] of the deferred commit and an immutable snapshot of
//! the task for restoring it.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{Result, UndoError};
use crate::scheduler::ScheduleHandle;
use crate::types::Task;

/// One in-flight, cancellable deletion.
#[derive(Debug, Clone)]
pub struct PendingDelete {
    /// The task being deleted.
    pub task_id: String,
    /// Task as it was when the deletion was requested.
    pub snapshot: Task,
    /// Handle of the deferred commit.
    pub handle: ScheduleHandle,
    /// When the deletion was requested.
    pub created_at: DateTime<Utc>,
    /// Fresh id per deletion lifecycle, for log correlation.
    pub lifecycle_id: Uuid,
    /// Set once the delete request has been sent.
    pub committing: bool,
}

/// At most one [`PendingDelete`] per task id.
///
/// # Examples
///
/// ```
/// use tasklist_undo::registry::PendingDeleteRegistry;
/// use tasklist_undo::scheduler::ScheduleHandle;
/// use tasklist_undo::{Task, UndoError};
///
/// let mut registry = PendingDeleteRegistry::new();
/// let handle = registry
///     .begin("t1", Task::new("t1", "Write report"), ScheduleHandle::new)
///     .unwrap();
///
/// let again = registry.begin("t1", Task::new("t1", "Write report"), ScheduleHandle::new);
/// assert!(matches!(again, Err(UndoError::AlreadyPending { .. })));
///
/// let snapshot = registry.cancel("t1").unwrap();
/// assert_eq!(snapshot.title, "Write report");
/// assert!(handle.is_cancelled());
/// assert!(!registry.complete("t1"));
/// ```
#[derive(Debug, Default)]
pub struct PendingDeleteRegistry {
    entries: HashMap<String, PendingDelete>,
}

impl PendingDeleteRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pending deletion for `task_id`.
    ///
    /// `schedule` is only invoked once the id is known to be free, so a
    /// rejected call never leaves a stray timer behind. Returns a clone of
    /// the stored handle.
    ///
    /// # Errors
    ///
    /// [`UndoError::AlreadyPending`] if `task_id` is already registered.
    pub fn begin<F>(&mut self, task_id: &str, snapshot: Task, schedule: F) -> Result<ScheduleHandle>
    where
        F: FnOnce() -> ScheduleHandle,
    {
        if self.entries.contains_key(task_id) {
            return Err(UndoError::AlreadyPending {
                task_id: task_id.to_string(),
            });
        }
        let handle = schedule();
        self.entries.insert(
            task_id.to_string(),
            PendingDelete {
                task_id: task_id.to_string(),
                snapshot,
                handle: handle.clone(),
                created_at: Utc::now(),
                lifecycle_id: Uuid::new_v4(),
                committing: false,
            },
        );
        Ok(handle)
    }

    /// Cancels the deferred commit and removes the entry, returning the
    /// snapshot for restoration. Cancelling an already-fired timer is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// [`UndoError::NotPending`] if `task_id` is not registered.
    pub fn cancel(&mut self, task_id: &str) -> Result<Task> {
        let entry = self
            .entries
            .remove(task_id)
            .ok_or_else(|| UndoError::NotPending {
                task_id: task_id.to_string(),
            })?;
        entry.handle.cancel();
        Ok(entry.snapshot)
    }

    /// Removes the entry after its commit resolved.
    ///
    /// Returns `false` if the entry was already gone (undone while the
    /// commit was in flight).
    pub fn complete(&mut self, task_id: &str) -> bool {
        self.entries.remove(task_id).is_some()
    }

    /// Flags the entry as having its delete request in flight.
    ///
    /// Returns the entry's snapshot and lifecycle id, or `None` if absent.
    pub fn mark_committing(&mut self, task_id: &str) -> Option<(Task, Uuid)> {
        let entry = self.entries.get_mut(task_id)?;
        entry.committing = true;
        Some((entry.snapshot.clone(), entry.lifecycle_id))
    }

    /// Returns the entry for `task_id`.
    pub fn get(&self, task_id: &str) -> Option<&PendingDelete> {
        self.entries.get(task_id)
    }

    /// Returns `true` if a deletion is pending for `task_id`.
    pub fn contains(&self, task_id: &str) -> bool {
        self.entries.contains_key(task_id)
    }

    /// Number of pending deletions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids of all pending deletions, in no particular order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
