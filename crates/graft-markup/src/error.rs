//! Error types for markup parsing and path matchers.

use graft_core::ParseError;
use thiserror::Error;

/// Errors from XML, YAML and properties support.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum MarkupError {
    /// Failed to initialise a Tree-sitter parser.
    #[error("failed to initialise {language} parser: {message}")]
    ParserInit {
        /// Grammar that failed to load.
        language: &'static str,
        /// Description of the failure.
        message: String,
    },

    /// Source text did not parse.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A path or key pattern is malformed.
    #[error("invalid path `{path}`: {message}")]
    InvalidPath {
        /// The offending pattern.
        path: String,
        /// Description of the problem.
        message: String,
    },
}

impl MarkupError {
    /// Creates a parser initialisation error.
    #[must_use]
    pub fn parser_init(language: &'static str, message: impl Into<String>) -> Self {
        Self::ParserInit {
            language,
            message: message.into(),
        }
    }

    /// Creates an invalid path error.
    #[must_use]
    pub fn invalid_path(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            message: message.into(),
        }
    }
}
