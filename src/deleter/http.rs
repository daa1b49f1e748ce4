//! HTTP implementation of [`TaskDeleter`].

use std::time::Duration;

use async_trait::async_trait;

use super::TaskDeleter;
use crate::config::EndpointConfig;
use crate::error::DeleteFailure;

/// Sends `DELETE {base_url}/tasks/{id}` to the task API.
///
/// 2xx responses are success. Any other status becomes a
/// [`DeleteFailure`] carrying the status and the response body; transport
/// errors (connect, timeout) become a failure without a status.
#[derive(Debug, Clone)]
pub struct HttpTaskDeleter {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpTaskDeleter {
    /// Creates a deleter for the API at `base_url` with the given timeout.
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Creates a deleter from endpoint configuration.
    ///
    /// # Errors
    ///
    /// Returns the `reqwest` error if the HTTP client cannot be built.
    pub fn from_config(config: &EndpointConfig) -> Result<Self, reqwest::Error> {
        Self::new(config.base_url.clone(), config.timeout())
    }

    /// The base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn task_url(&self, task_id: &str) -> String {
        format!("{}/tasks/{}", self.base_url, urlencoding::encode(task_id))
    }
}

#[async_trait]
impl TaskDeleter for HttpTaskDeleter {
    async fn delete(&self, task_id: &str) -> Result<(), DeleteFailure> {
        let url = self.task_url(task_id);
        tracing::debug!(task_id, %url, "sending delete request");

        let response = self
            .http_client
            .delete(&url)
            .send()
            .await
            .map_err(|e| DeleteFailure::transport(format!("delete request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        let message = if body.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("delete rejected")
                .to_string()
        } else {
            body
        };
        Err(DeleteFailure::with_status(status.as_u16(), message))
    }
}
