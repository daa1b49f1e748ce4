//! The visible task collection.
//!
//! [`TaskCollection`] is the list the user sees. It keeps insertion order;
//! a task restored after a cancelled or failed deletion goes to the end, not
//! back to its old position.
//!
//! The collection has no locking of its own. The
//! [`UndoDeleteController`](crate::controller::UndoDeleteController) owns it
//! and is its only writer.

use crate::error::{Result, UndoError};
use crate::types::Task;

/// Ordered set of visible tasks, unique by id.
///
/// # Examples
///
/// ```
/// use tasklist_undo::collection::TaskCollection;
/// use tasklist_undo::{Task, UndoError};
///
/// let mut tasks = TaskCollection::new();
/// tasks.insert(Task::new("a", "First")).unwrap();
/// tasks.insert(Task::new("b", "Second")).unwrap();
///
/// assert!(matches!(
///     tasks.insert(Task::new("a", "Again")),
///     Err(UndoError::Conflict { .. })
/// ));
///
/// let removed = tasks.remove("a").unwrap();
/// assert_eq!(removed.title, "First");
/// assert_eq!(tasks.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TaskCollection {
    tasks: Vec<Task>,
}

impl TaskCollection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole contents, keeping the first task for duplicated ids.
    pub fn load(&mut self, tasks: impl IntoIterator<Item = Task>) {
        self.tasks.clear();
        for task in tasks {
            if !self.contains(&task.id) {
                self.tasks.push(task);
            }
        }
    }

    /// Removes and returns the task with `task_id`.
    ///
    /// # Errors
    ///
    /// [`UndoError::NotFound`] if no such task is visible.
    pub fn remove(&mut self, task_id: &str) -> Result<Task> {
        let index = self
            .position(task_id)
            .ok_or_else(|| UndoError::NotFound {
                task_id: task_id.to_string(),
            })?;
        Ok(self.tasks.remove(index))
    }

    /// Appends `task` at the end.
    ///
    /// # Errors
    ///
    /// [`UndoError::Conflict`] if a task with the same id is visible.
    pub fn insert(&mut self, task: Task) -> Result<()> {
        if self.contains(&task.id) {
            return Err(UndoError::Conflict { task_id: task.id });
        }
        self.tasks.push(task);
        Ok(())
    }

    /// Upserts `task` by id. An existing task keeps its position.
    ///
    /// Returns the previous version if there was one.
    pub fn replace(&mut self, task: Task) -> Option<Task> {
        match self.position(&task.id) {
            Some(index) => Some(std::mem::replace(&mut self.tasks[index], task)),
            None => {
                self.tasks.push(task);
                None
            }
        }
    }

    /// Returns the task with `task_id`, if visible.
    pub fn get(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Returns `true` if a task with `task_id` is visible.
    pub fn contains(&self, task_id: &str) -> bool {
        self.position(task_id).is_some()
    }

    /// Number of visible tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns `true` if nothing is visible.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Iterates in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// Snapshot of the visible tasks in display order.
    pub fn to_vec(&self) -> Vec<Task> {
        self.tasks.clone()
    }

    fn position(&self, task_id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == task_id)
    }
}
