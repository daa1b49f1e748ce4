//! Undo notice shown while a deletion is pending.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::task::Task;

/// One "task deleted, undo?" notice.
///
/// The `id` is the task id, so there is at most one notice per pending
/// deletion. The notice carries the task snapshot so it can render the title
/// and hand the task back to an undo action.
///
/// # Examples
///
/// ```
/// use tasklist_undo::{NotificationItem, Task};
///
/// let item = NotificationItem::new(Task::new("t1", "Write report"));
/// assert_eq!(item.id, "t1");
/// assert_eq!(item.message(), "Write report deleted.");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationItem {
    /// Id of the deleted task.
    pub id: String,

    /// Snapshot of the deleted task.
    pub task: Task,

    /// When the notice was raised.
    pub created_at: DateTime<Utc>,
}

impl NotificationItem {
    /// Creates a notice for `task`, timestamped now.
    pub fn new(task: Task) -> Self {
        Self {
            id: task.id.clone(),
            task,
            created_at: Utc::now(),
        }
    }

    /// Text rendered in the notice.
    pub fn message(&self) -> String {
        format!("{} deleted.", self.task.title)
    }
}
