//! Defaults shared by configuration and the controller.

/// Default undo window in milliseconds before a deletion is committed.
pub const DEFAULT_UNDO_WINDOW_MS: u64 = 10_000;

/// Default base URL of the task API serving `DELETE /tasks/{id}`.
pub const DEFAULT_ENDPOINT_BASE_URL: &str = "http://localhost:3000";

/// Default HTTP client timeout for the delete request, in milliseconds.
pub const DEFAULT_ENDPOINT_TIMEOUT_MS: u64 = 10_000;

/// Default capacity of the lifecycle event broadcast channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Default config file looked up by [`UndoConfig::load`](crate::config::UndoConfig::load).
pub const DEFAULT_CONFIG_FILE: &str = ".tasklist-undo.toml";

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "TASKLIST_UNDO_";
