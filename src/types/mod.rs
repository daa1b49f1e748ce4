//! Data types carried through the deletion lifecycle.
//!
//! - [`task`] - [`Task`], [`TaskStatus`], [`TaskPriority`]
//! - [`notification`] - [`NotificationItem`]

pub mod notification;
pub mod task;

pub use notification::NotificationItem;
pub use task::{Task, TaskPriority, TaskStatus};
