//! Error types for Java parsing, matching and attribution.

use graft_core::ParseError;
use thiserror::Error;

/// Errors from Java-specific operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum JavaError {
    /// Failed to initialise the Tree-sitter parser.
    #[error("failed to initialise Java parser: {message}")]
    ParserInit {
        /// Description of the failure.
        message: String,
    },

    /// Source text did not parse.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A type reference could not be bound to a known type.
    #[error("unresolved type: {name}")]
    UnresolvedType {
        /// The name as written in source.
        name: String,
    },

    /// A matcher pattern is malformed.
    #[error("invalid pattern `{pattern}`: {message}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Description of the problem.
        message: String,
    },
}

impl JavaError {
    /// Creates a parser initialisation error.
    #[must_use]
    pub fn parser_init(message: impl Into<String>) -> Self {
        Self::ParserInit {
            message: message.into(),
        }
    }

    /// Creates an unresolved type error.
    #[must_use]
    pub fn unresolved_type(name: impl Into<String>) -> Self {
        Self::UnresolvedType { name: name.into() }
    }

    /// Creates an invalid pattern error.
    #[must_use]
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}

/// Errors raised while building or applying a [`crate::JavaTemplate`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TemplateError {
    /// The snippet or its placeholders are malformed.
    #[error("invalid template `{snippet}`: {message}")]
    Configuration {
        /// The template source.
        snippet: String,
        /// Description of the problem.
        message: String,
    },

    /// The number of arguments does not match the placeholders.
    #[error("template `{snippet}` takes {expected} argument(s), got {actual}")]
    Arity {
        /// The template source.
        snippet: String,
        /// Number of distinct placeholders.
        expected: usize,
        /// Number of arguments supplied.
        actual: usize,
    },

    /// A typed placeholder received an argument without type information.
    #[error("argument {index} has no resolved type; expected {expected}")]
    UnresolvedArgument {
        /// Zero-based argument index.
        index: usize,
        /// The type the placeholder requires.
        expected: String,
    },

    /// A typed placeholder received an argument of the wrong type.
    #[error("argument {index} has type {actual}, which is not assignable to {expected}")]
    IncompatibleArgument {
        /// Zero-based argument index.
        index: usize,
        /// The type the placeholder requires.
        expected: String,
        /// The argument's type.
        actual: String,
    },

    /// The substituted snippet did not parse.
    #[error("substituted template does not parse: {message}\n{code}")]
    Parse {
        /// The substituted source.
        code: String,
        /// Description of the syntax error.
        message: String,
    },

    /// The coordinates do not fit the cursor position or fragment.
    #[error("cannot apply template at {coordinates}: {message}")]
    Coordinates {
        /// The requested coordinates.
        coordinates: String,
        /// Description of the mismatch.
        message: String,
    },
}

impl TemplateError {
    pub(crate) fn configuration(snippet: &str, message: impl Into<String>) -> Self {
        Self::Configuration {
            snippet: snippet.to_owned(),
            message: message.into(),
        }
    }

    pub(crate) fn coordinates(coordinates: impl std::fmt::Display, message: impl Into<String>) -> Self {
        Self::Coordinates {
            coordinates: coordinates.to_string(),
            message: message.into(),
        }
    }
}
