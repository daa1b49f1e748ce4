//! Ordered queue of undo notices.

use crate::types::{NotificationItem, Task};

/// Undo notices in the order their deletions were requested.
///
/// At most one notice per task id. Reading the queue has no side effects, so
/// the UI can re-render it as often as it likes.
///
/// # Examples
///
/// ```
/// use tasklist_undo::notifications::NotificationQueue;
/// use tasklist_undo::Task;
///
/// let mut queue = NotificationQueue::new();
/// queue.enqueue("a", Task::new("a", "First"));
/// queue.enqueue("b", Task::new("b", "Second"));
/// queue.dequeue("a");
/// queue.dequeue("a"); // no-op
///
/// let ids: Vec<_> = queue.list().iter().map(|n| n.id.clone()).collect();
/// assert_eq!(ids, vec!["b"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    items: Vec<NotificationItem>,
}

impl NotificationQueue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a notice for `task_id`. An existing notice for the same id is
    /// replaced in place.
    pub fn enqueue(&mut self, task_id: &str, task: Task) {
        let mut item = NotificationItem::new(task);
        item.id = task_id.to_string();
        match self.items.iter_mut().find(|n| n.id == task_id) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    /// Removes the notice for `task_id`. Returns `false` if there was none.
    pub fn dequeue(&mut self, task_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|n| n.id != task_id);
        self.items.len() != before
    }

    /// Notices in insertion order.
    pub fn list(&self) -> &[NotificationItem] {
        &self.items
    }

    /// Returns `true` if a notice exists for `task_id`.
    pub fn contains(&self, task_id: &str) -> bool {
        self.items.iter().any(|n| n.id == task_id)
    }

    /// Number of notices.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there are no notices.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
