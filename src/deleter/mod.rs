//! The external task-deletion endpoint.
//!
//! The controller only sees the [`TaskDeleter`] trait. Any `Err` is treated
//! as a failed commit, whatever the cause.
//!
//! [`HttpTaskDeleter`](http::HttpTaskDeleter) talks to the task API over
//! HTTP and is available behind the `http-client` feature.

#[cfg(feature = "http-client")]
pub mod http;

use async_trait::async_trait;

use crate::error::DeleteFailure;

#[cfg(feature = "http-client")]
pub use http::HttpTaskDeleter;

/// Permanently deletes a task in the backing system.
///
/// Implementations must be `Send + Sync`; the commit runs on whatever task
/// the scheduler fires it on. Retries, auth and timeouts belong to the
/// implementation, not to the controller.
#[async_trait]
pub trait TaskDeleter: Send + Sync {
    /// Deletes the task with `task_id`.
    ///
    /// # Errors
    ///
    /// A [`DeleteFailure`] with the response status when the endpoint
    /// answered with a non-success status, or without one on transport
    /// errors.
    async fn delete(&self, task_id: &str) -> Result<(), DeleteFailure>;
}
