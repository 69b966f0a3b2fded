//! Logging setup for tools that embed the engine.
//!
//! The engine only emits `tracing` events. A host calls [`initialise`] once
//! to route them to stderr as JSON lines or compact text. `GRAFT_LOG`, when
//! set, replaces the configured filter.

use std::io::{self, IsTerminal};

use once_cell::sync::OnceCell;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};

use crate::config::{LogFormat, LoggingConfig};

/// Environment variable that overrides [`LoggingConfig::filter`].
pub const FILTER_ENV: &str = "GRAFT_LOG";

static INSTALLED: OnceCell<LogFormat> = OnceCell::new();

/// Proof that a subscriber is installed, and in which format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryHandle {
    format: LogFormat,
}

impl TelemetryHandle {
    /// Returns the format chosen by the call that installed the subscriber.
    #[must_use]
    pub const fn format(&self) -> LogFormat {
        self.format
    }
}

/// Failures installing the subscriber.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TelemetryError {
    /// The filter directive does not parse.
    #[error("invalid log filter `{filter}`: {message}")]
    Filter {
        /// The rejected directive.
        filter: String,
        /// Parser message.
        message: String,
    },
    /// Another global subscriber was installed outside graft.
    #[error("a global tracing subscriber is already installed")]
    Occupied(#[source] TryInitError),
}

/// Installs the global subscriber on the first call.
///
/// Later calls return a handle for the subscriber already in place and
/// ignore `config`.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] for a malformed filter and
/// [`TelemetryError::Occupied`] when some other subscriber got there first.
pub fn initialise(config: &LoggingConfig) -> Result<TelemetryHandle, TelemetryError> {
    INSTALLED
        .get_or_try_init(|| install(config))
        .map(|format| TelemetryHandle { format: *format })
}

fn install(config: &LoggingConfig) -> Result<LogFormat, TelemetryError> {
    let directive = std::env::var(FILTER_ENV).unwrap_or_else(|_| config.filter().to_owned());
    let filter = parse_filter(&directive)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .with_timer(UtcTime::rfc_3339());
    match config.format() {
        LogFormat::Json => builder.json().flatten_event(true).finish().try_init(),
        LogFormat::Compact => builder.compact().finish().try_init(),
    }
    .map_err(TelemetryError::Occupied)?;
    Ok(config.format())
}

fn parse_filter(directive: &str) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(directive).map_err(|err| TelemetryError::Filter {
        filter: directive.to_owned(),
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("info")]
    #[case("graft_core=debug,graft_java=trace,warn")]
    fn accepts_filter_directives(#[case] directive: &str) {
        assert!(parse_filter(directive).is_ok());
    }

    #[test]
    fn names_the_rejected_filter() {
        let err = parse_filter("graft_core=notalevel[").expect_err("malformed filter");
        assert!(err.to_string().starts_with("invalid log filter `graft_core=notalevel[`"));
    }

    #[test]
    fn only_the_first_call_installs() {
        let first = initialise(&LoggingConfig::new("warn", LogFormat::Compact));
        let second = initialise(&LoggingConfig::new("debug", LogFormat::Json));
        match (first, second) {
            (Ok(first), Ok(second)) => {
                assert_eq!(first, second);
                assert_eq!(second.format(), LogFormat::Compact);
            }
            (Err(TelemetryError::Occupied(_)), _) => {}
            (other, _) => panic!("unexpected telemetry outcome: {other:?}"),
        }
    }
}
