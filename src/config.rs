//! Undo-delete configuration.
//!
//! Configuration can be loaded from:
//! 1. TOML file (`.tasklist-undo.toml`)
//! 2. Environment variables (with `TASKLIST_UNDO_` prefix)
//!
//! Environment variables override TOML configuration.
//!
//! # Example TOML Configuration
//!
//! ```toml
//! [undo]
//! undo_window_ms = 10000
//! event_capacity = 64
//!
//! [undo.endpoint]
//! base_url = "http://localhost:3000"
//! timeout_ms = 10000
//!
//! [undo.logging]
//! filter = "tasklist_undo=debug"
//! with_target = false
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_CONFIG_FILE, DEFAULT_ENDPOINT_BASE_URL, DEFAULT_ENDPOINT_TIMEOUT_MS,
    DEFAULT_EVENT_CAPACITY, DEFAULT_UNDO_WINDOW_MS, ENV_PREFIX,
};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {error}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying error message.
        error: String,
    },

    /// The config file is not valid TOML for this schema.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// A value is out of range.
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        /// Offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
}

/// Top-level configuration for the undo-delete controller.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use tasklist_undo::UndoConfig;
///
/// let config = UndoConfig::default();
/// assert_eq!(config.undo_window(), Duration::from_secs(10));
/// assert_eq!(config.endpoint.base_url, "http://localhost:3000");
///
/// let config = UndoConfig::from_toml("[undo]\nundo_window_ms = 5000\n").unwrap();
/// assert_eq!(config.undo_window(), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UndoConfig {
    /// How long a deletion can be undone before it is committed.
    pub undo_window_ms: u64,

    /// Capacity of the lifecycle event channel. Slow subscribers lag and
    /// miss events beyond this.
    pub event_capacity: usize,

    /// Delete endpoint configuration.
    pub endpoint: EndpointConfig,

    /// Log output configuration.
    pub logging: LoggingConfig,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            undo_window_ms: DEFAULT_UNDO_WINDOW_MS,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            endpoint: EndpointConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl UndoConfig {
    /// Load configuration from file and environment.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. `.tasklist-undo.toml` in the working directory
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] if the file exists but is malformed,
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file_or_default(Path::new(DEFAULT_CONFIG_FILE))?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reads `path` if it exists. An unreadable file is logged and skipped.
    fn from_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "config file exists but cannot be read, using defaults"
                );
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file path, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, plus the errors of
    /// [`from_toml`](Self::from_toml) and [`validate`](Self::validate).
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;
        let mut config = Self::from_toml(&contents)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML content with an `[undo]` table.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed TOML or mistyped fields.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        #[derive(Deserialize)]
        struct FullConfig {
            #[serde(default)]
            undo: UndoConfig,
        }

        let full: FullConfig =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Ok(full.undo)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] for a zero event capacity, a zero endpoint
    /// timeout or an empty base URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.event_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "event_capacity",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.endpoint.timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "endpoint.timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.endpoint.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "endpoint.base_url",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// The undo window as a [`Duration`].
    pub fn undo_window(&self) -> Duration {
        Duration::from_millis(self.undo_window_ms)
    }

    /// Sets the undo window.
    #[must_use]
    pub fn with_undo_window(mut self, window: Duration) -> Self {
        self.undo_window_ms = u64::try_from(window.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok());
    }

    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("WINDOW_MS").and_then(|v| v.parse().ok()) {
            self.undo_window_ms = v;
        }
        if let Some(v) = lookup("EVENT_CAPACITY").and_then(|v| v.parse().ok()) {
            self.event_capacity = v;
        }
        if let Some(v) = lookup("ENDPOINT_URL") {
            self.endpoint.base_url = v;
        }
        if let Some(v) = lookup("ENDPOINT_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.endpoint.timeout_ms = v;
        }
        if let Some(v) = lookup("LOG") {
            self.logging.filter = v;
        }
    }
}

/// Delete endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Base URL of the task API.
    pub base_url: String,

    /// HTTP client timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ENDPOINT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_ENDPOINT_TIMEOUT_MS,
        }
    }
}

impl EndpointConfig {
    /// The client timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Log output configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,

    /// Include the event target in output.
    pub with_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            with_target: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn empty_toml_yields_defaults() {
        assert_eq!(UndoConfig::from_toml("").unwrap(), UndoConfig::default());
    }

    #[test]
    fn nested_tables_parse() {
        let config = UndoConfig::from_toml(
            r#"
            [undo]
            undo_window_ms = 3000

            [undo.endpoint]
            base_url = "https://tasks.example.com"

            [undo.logging]
            filter = "tasklist_undo=debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.undo_window_ms, 3000);
        assert_eq!(config.endpoint.base_url, "https://tasks.example.com");
        assert_eq!(config.endpoint.timeout_ms, DEFAULT_ENDPOINT_TIMEOUT_MS);
        assert_eq!(config.logging.filter, "tasklist_undo=debug");
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = UndoConfig::from_toml("[undo]\nundo_window_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn overrides_take_precedence() {
        let env: HashMap<&str, &str> = [
            ("WINDOW_MS", "2500"),
            ("ENDPOINT_URL", "http://api:8080"),
            ("ENDPOINT_TIMEOUT_MS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = UndoConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.undo_window(), Duration::from_millis(2500));
        assert_eq!(config.endpoint.base_url, "http://api:8080");
        // unparsable values are ignored
        assert_eq!(config.endpoint.timeout_ms, DEFAULT_ENDPOINT_TIMEOUT_MS);
    }

    #[test]
    fn validate_rejects_zero_capacity() {
        let config = UndoConfig {
            event_capacity: 0,
            ..UndoConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "event_capacity",
                ..
            })
        ));
    }

    #[test]
    fn from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[undo]\nevent_capacity = 8").unwrap();
        let config = UndoConfig::from_file(file.path()).unwrap();
        assert_eq!(config.event_capacity, 8);
    }

    #[test]
    fn from_file_missing_is_io_error() {
        let err = UndoConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn default_file_missing_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = UndoConfig::from_file_or_default(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, UndoConfig::default());
    }

    #[test]
    fn default_file_unreadable_falls_back_to_defaults() {
        // a directory exists at the path but cannot be read as a file
        let dir = tempfile::tempdir().unwrap();
        let config = UndoConfig::from_file_or_default(dir.path()).unwrap();
        assert_eq!(config, UndoConfig::default());
    }

    #[test]
    fn default_file_malformed_is_still_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[undo\nevent_capacity = 8").unwrap();
        let err = UndoConfig::from_file_or_default(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn with_undo_window_round_trips() {
        let config = UndoConfig::default().with_undo_window(Duration::from_millis(750));
        assert_eq!(config.undo_window_ms, 750);
    }
}
