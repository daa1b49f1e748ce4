//! The task record shown in the task list.
//!
//! Field names serialize in camelCase to match the task API's JSON.
//! The deletion subsystem only cares about [`Task::id`]; everything else is
//! carried along so a restored task renders exactly as before.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Progress status of a task.
///
/// # Examples
///
/// ```
/// use tasklist_undo::TaskStatus;
///
/// let json = serde_json::to_value(TaskStatus::InProgress).unwrap();
/// assert_eq!(json, "in-progress");
/// assert_eq!(TaskStatus::Expired.to_string(), "expired");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started yet.
    #[default]
    Pending,
    /// Being worked on.
    InProgress,
    /// Done.
    Completed,
    /// Past its end date without completion.
    Expired,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in-progress"),
            Self::Completed => write!(f, "completed"),
            Self::Expired => write!(f, "expired"),
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Low priority.
    Low,
    /// Medium priority.
    #[default]
    Medium,
    /// High priority.
    High,
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// A task in the user's list.
///
/// # Serialization
///
/// - Fields use `camelCase` naming.
/// - Optional fields are omitted when `None`.
///
/// # Examples
///
/// ```
/// use tasklist_undo::{Task, TaskPriority, TaskStatus};
///
/// let task = Task::new("t1", "Write report")
///     .with_status(TaskStatus::InProgress)
///     .with_priority(TaskPriority::High);
///
/// let json = serde_json::to_value(&task).unwrap();
/// assert_eq!(json["id"], "t1");
/// assert_eq!(json["status"], "in-progress");
/// assert_eq!(json["isOnCalendar"], false);
/// assert!(json.get("dueTime").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique, stable identifier.
    pub id: String,

    /// Owner of the task.
    #[serde(default)]
    pub user_id: String,

    /// Title shown in the list and in undo notices.
    pub title: String,

    /// Progress status.
    #[serde(default)]
    pub status: TaskStatus,

    /// Free-form category label.
    #[serde(default)]
    pub category: String,

    /// Priority.
    #[serde(default)]
    pub priority: TaskPriority,

    /// Longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// When work is planned to start.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,

    /// When work is planned to end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,

    /// Deadline.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_time: Option<DateTime<Utc>>,

    /// Estimated effort in hours.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_time: Option<f64>,

    /// Whether the task is shown on the calendar view.
    #[serde(default)]
    pub is_on_calendar: bool,
}

impl Task {
    /// Creates a pending, medium-priority task with the given id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user_id: String::new(),
            title: title.into(),
            status: TaskStatus::default(),
            category: String::new(),
            priority: TaskPriority::default(),
            description: None,
            start_date: None,
            end_date: None,
            due_time: None,
            estimated_time: None,
            is_on_calendar: false,
        }
    }

    /// Sets the owner.
    #[must_use]
    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    /// Sets the status.
    #[must_use]
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the priority.
    #[must_use]
    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the due time.
    #[must_use]
    pub fn with_due_time(mut self, due_time: DateTime<Utc>) -> Self {
        self.due_time = Some(due_time);
        self
    }
}
