//! Engine configuration.
//!
//! All settings have defaults and can be loaded from YAML:
//!
//! ```yaml
//! run:
//!   max_cycles: 3
//!   parallel: true
//!   scan_retries: 3
//! logging:
//!   filter: info
//!   format: compact
//! ```

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use thiserror::Error;

/// Limits and scheduling options for a recipe run.
///
/// # Defaults
///
/// - `max_cycles`: 3
/// - `parallel`: `true`
/// - `scan_retries`: 3
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    /// Maximum number of edit cycles before reporting non-convergence.
    max_cycles: usize,
    /// Whether files are edited in parallel within a cycle.
    parallel: bool,
    /// Attempts made by scan phases that fetch external resources.
    scan_retries: u32,
}

impl RunConfig {
    /// Creates a run configuration with explicit values.
    #[must_use]
    pub const fn new(max_cycles: usize, parallel: bool, scan_retries: u32) -> Self {
        Self {
            max_cycles,
            parallel,
            scan_retries,
        }
    }

    /// Returns the cycle limit.
    #[must_use]
    pub const fn max_cycles(&self) -> usize {
        self.max_cycles
    }

    /// Returns whether files are edited in parallel.
    #[must_use]
    pub const fn parallel(&self) -> bool {
        self.parallel
    }

    /// Returns the number of attempts for external fetches.
    #[must_use]
    pub const fn scan_retries(&self) -> u32 {
        self.scan_retries
    }

    /// Returns a copy with a different cycle limit.
    #[must_use]
    pub const fn with_max_cycles(mut self, max_cycles: usize) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    /// Returns a copy with parallel editing switched on or off.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self::new(3, true, 3)
    }
}

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Structured JSON suitable for ingestion by logging stacks.
    #[default]
    Json,
    /// Human-readable single line output.
    Compact,
}

/// Logging settings consumed by [`telemetry::initialise`](crate::telemetry::initialise).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `graft_core=debug,info`.
    filter: String,
    /// Output format.
    format: LogFormat,
}

impl LoggingConfig {
    /// Creates logging settings.
    #[must_use]
    pub fn new(filter: impl Into<String>, format: LogFormat) -> Self {
        Self {
            filter: filter.into(),
            format,
        }
    }

    /// Returns the filter directive.
    #[must_use]
    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Returns the output format.
    #[must_use]
    pub const fn format(&self) -> LogFormat {
        self.format
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new("info", LogFormat::default())
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraftConfig {
    /// Run limits and scheduling.
    pub run: RunConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The YAML document could not be deserialised.
    #[error("invalid configuration: {0}")]
    Yaml(String),
    /// A value is out of range.
    #[error("invalid configuration value for `{key}`: {message}")]
    Invalid {
        /// The offending key.
        key: &'static str,
        /// Description of the problem.
        message: String,
    },
}

impl GraftConfig {
    /// Loads configuration from YAML text. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the document is malformed or a value is
    /// out of range.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_saphyr::from_str(text).map_err(|error| ConfigError::Yaml(error.to_string()))?;
        if config.run.max_cycles == 0 {
            return Err(ConfigError::Invalid {
                key: "run.max_cycles",
                message: "must be at least 1".to_owned(),
            });
        }
        Ok(config)
    }
}
