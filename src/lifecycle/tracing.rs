//! # Observability & Tracing
//!
//! [`setup_tracing`] initializes structured logging with the `tracing` crate
//! and returns a [`LogLevelHandle`] through which the level can be changed
//! while the process runs (the `/logging` resource does exactly that).
//!
//! ## Configuration
//!
//! The compact format hides the crate/module prefix (`with_target(false)`);
//! the structured `kind` and `path` fields say which resource logged.
//!
//! - `RUST_LOG` wins when set
//! - otherwise the configured `log_level` applies
//!
//! ```bash
//! # Show every message each resource handles
//! RUST_LOG=debug cargo run
//!
//! # Include notification fan-out counts
//! RUST_LOG=resource_actors::framework=trace cargo run
//! ```
//!
//! ## What Gets Traced
//!
//! - **Actor Lifecycle**: Started, on_start/on_stop failures, Shutdown
//! - **Registry**: Registered, Unregistered, path conflicts
//! - **Messages**: Notify/SetState/Delete at debug, handler failures at warn
//! - **State Changes**: Subscribed, fan-out counts at trace

use crate::framework::error::ServiceError;
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as tracing_fmt, reload, EnvFilter, Registry};

/// Levels the logging resource can switch between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
}

impl LogLevel {
    /// Canonical upper-case name, as stored in resource state.
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
        }
    }

    fn directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ERROR" => Ok(LogLevel::Error),
            "WARN" => Ok(LogLevel::Warn),
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            other => Err(ServiceError::UnrecognisedState(other.to_string())),
        }
    }
}

/// Changes the process-wide log filter at run time.
///
/// A detached handle (no subscriber installed, as in tests) accepts every
/// change and does nothing.
#[derive(Clone, Default)]
pub struct LogLevelHandle {
    inner: Option<reload::Handle<EnvFilter, Registry>>,
}

impl LogLevelHandle {
    pub fn detached() -> Self {
        Self::default()
    }

    /// Sets the filter to `level`, or silences everything with `None`.
    pub fn apply(&self, level: Option<LogLevel>) -> Result<(), ServiceError> {
        let Some(inner) = &self.inner else {
            return Ok(());
        };
        let directive = level.map_or("off", LogLevel::directive);
        inner
            .reload(EnvFilter::new(directive))
            .map_err(|e| ServiceError::ResourceException(format!("log filter reload failed: {e}")))
    }
}

impl fmt::Debug for LogLevelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogLevelHandle")
            .field("attached", &self.inner.is_some())
            .finish()
    }
}

/// Installs the global subscriber. `default_level` applies when `RUST_LOG`
/// is unset. If a subscriber is already installed the returned handle is
/// detached.
pub fn setup_tracing(default_level: &str) -> LogLevelHandle {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let (filter, handle) = reload::Layer::new(filter);

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_fmt::layer()
                .with_target(false) // Resources are identified by their kind/path fields
                .compact(),
        )
        .try_init();

    match installed {
        Ok(()) => LogLevelHandle {
            inner: Some(handle),
        },
        Err(_) => LogLevelHandle::detached(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_parse_case_insensitively() {
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("WARN".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!(matches!(
            "loud".parse::<LogLevel>(),
            Err(ServiceError::UnrecognisedState(_))
        ));
        assert_eq!(LogLevel::Info.to_string(), "INFO");
    }

    #[test]
    fn detached_handle_accepts_changes() {
        let handle = LogLevelHandle::detached();
        assert!(handle.apply(Some(LogLevel::Debug)).is_ok());
        assert!(handle.apply(None).is_ok());
    }
}
