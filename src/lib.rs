//! Optimistic task deletion with a cancellable undo window.
//!
//! Deleting a task hides it from the visible collection immediately and
//! defers the destructive call to the delete endpoint by a fixed window
//! (10 seconds by default). While the window is open the user can undo the
//! deletion and get the task back exactly as it was. A notification queue
//! tracks the pending deletions for rendering "deleted, undo?" notices.
//!
//! # Overview
//!
//! ```text
//!   request_delete ──► Visible ──► PendingRemoval ──timer──► Committing
//!                                      │                        │
//!                                    undo                 ok ───┴─── err
//!                                      ▼                  ▼          ▼
//!                                   Restored          Committed   Restored
//!                                                                (rollback)
//! ```
//!
//! # Module Organization
//!
//! - [`types`] - Task and notification data types
//! - [`collection`] - The visible task collection
//! - [`registry`] - Pending deletions with their restore snapshots
//! - [`notifications`] - Ordered undo notices
//! - [`scheduler`] - Cancellable one-shot timers (tokio and virtual clock)
//! - [`deleter`] - The external delete endpoint
//! - [`controller`] - The undo-delete state machine
//! - [`config`] - TOML + environment configuration
//! - [`constants`] - Default values and configuration keys
//! - `logging` - Subscriber setup (requires the `logging` feature)
//! - [`error`] - Error types
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tasklist_undo::deleter::TaskDeleter;
//! use tasklist_undo::scheduler::ManualScheduler;
//! use tasklist_undo::{DeleteFailure, Task, UndoConfig, UndoDeleteController};
//!
//! struct AlwaysOk;
//!
//! #[async_trait::async_trait]
//! impl TaskDeleter for AlwaysOk {
//!     async fn delete(&self, _task_id: &str) -> Result<(), DeleteFailure> {
//!         Ok(())
//!     }
//! }
//!
//! # tokio_test_block(async {
//! let scheduler = Arc::new(ManualScheduler::new());
//! let controller =
//!     UndoDeleteController::new(UndoConfig::default(), scheduler.clone(), Arc::new(AlwaysOk));
//! controller.load_tasks(vec![Task::new("t1", "Write report")]);
//!
//! controller.request_delete("t1").unwrap();
//! assert!(controller.tasks().is_empty());
//! assert_eq!(controller.notifications().len(), 1);
//!
//! let restored = controller.undo("t1").unwrap();
//! assert_eq!(restored.title, "Write report");
//! assert!(controller.notifications().is_empty());
//!
//! scheduler.advance(Duration::from_secs(10)).await;
//! assert_eq!(controller.tasks().len(), 1);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

pub mod collection;
pub mod config;
pub mod constants;
pub mod controller;
pub mod deleter;
pub mod error;
#[cfg(feature = "logging")]
pub mod logging;
pub mod notifications;
pub mod registry;
pub mod scheduler;
pub mod types;

// Re-exports for ergonomic access
pub use config::{ConfigError, EndpointConfig, LoggingConfig, UndoConfig};
pub use controller::{DeleteEvent, DeletionState, UndoDeleteController};
pub use error::{DeleteFailure, Result, UndoError};
pub use types::{NotificationItem, Task, TaskPriority, TaskStatus};
