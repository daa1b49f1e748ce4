//! Tracing subscriber setup.
//!
//! The library itself only emits `tracing` events. Applications that want
//! them printed call [`init_logging`] once at startup.

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Installs a global `fmt` subscriber.
///
/// `RUST_LOG` wins over [`LoggingConfig::filter`] when set. Returns `false`
/// if a global subscriber was already installed.
pub fn init_logging(config: &LoggingConfig) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_target(config.with_target)
        .with_level(true)
        .try_init()
        .is_ok()
}

fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
