//! Error types for the undo-delete subsystem.
//!
//! [`UndoError`] covers contract violations (`AlreadyPending`, `NotPending`),
//! collection misuse (`NotFound`, `Conflict`) and the recoverable
//! [`CommitFailed`](UndoError::CommitFailed). [`DeleteFailure`] is what the
//! external delete endpoint reports.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, UndoError>;

/// Errors returned by the collection, registry and controller.
///
/// None of these are fatal to the process. `AlreadyPending` and `NotPending`
/// mean the caller broke the lifecycle contract; state is left unchanged.
/// `CommitFailed` is reported after the task has already been rolled back.
///
/// # Examples
///
/// ```
/// use tasklist_undo::UndoError;
///
/// let err = UndoError::AlreadyPending { task_id: "t3".to_string() };
/// assert_eq!(err.to_string(), "deletion already pending for task t3");
/// assert!(err.is_contract_violation());
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UndoError {
    /// A deletion for this task is already in flight.
    #[error("deletion already pending for task {task_id}")]
    AlreadyPending {
        /// The task that is already pending.
        task_id: String,
    },

    /// No deletion is pending for this task.
    #[error("no pending deletion for task {task_id}")]
    NotPending {
        /// The task that was expected to be pending.
        task_id: String,
    },

    /// The task is not in the visible collection.
    #[error("task not found: {task_id}")]
    NotFound {
        /// The missing task.
        task_id: String,
    },

    /// A task with the same id is already visible.
    #[error("task already present: {task_id}")]
    Conflict {
        /// The duplicated task id.
        task_id: String,
    },

    /// The external delete call did not succeed; the task was restored.
    #[error("delete commit failed for task {task_id}: {failure}")]
    CommitFailed {
        /// The task whose deletion failed.
        task_id: String,
        /// What the endpoint reported.
        failure: DeleteFailure,
    },
}

impl UndoError {
    /// Returns `true` for errors caused by calling an operation outside its
    /// lifecycle precondition.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::AlreadyPending { .. } | Self::NotPending { .. })
    }

    /// The task id this error refers to.
    pub fn task_id(&self) -> &str {
        match self {
            Self::AlreadyPending { task_id }
            | Self::NotPending { task_id }
            | Self::NotFound { task_id }
            | Self::Conflict { task_id }
            | Self::CommitFailed { task_id, .. } => task_id,
        }
    }
}

/// Structured failure from the delete endpoint.
///
/// `status` is the HTTP status when the server answered, `None` for
/// transport errors. The controller treats every failure the same way.
///
/// # Examples
///
/// ```
/// use tasklist_undo::DeleteFailure;
///
/// let failure = DeleteFailure::with_status(404, "Task not found");
/// assert_eq!(failure.to_string(), "status 404: Task not found");
///
/// let failure = DeleteFailure::transport("connection refused");
/// assert_eq!(failure.to_string(), "connection refused");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFailure {
    /// HTTP status, if a response was received.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Human-readable reason.
    pub message: String,
}

impl DeleteFailure {
    /// Failure with a response status.
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Failure without a response (network, timeout, ...).
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for DeleteFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "status {status}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for DeleteFailure {}
