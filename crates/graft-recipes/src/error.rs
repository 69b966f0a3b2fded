//! Error types for the recipe catalog, source loading and metadata lookups.

use camino::Utf8PathBuf;
use graft_core::RecipeError;
use graft_java::JavaError;
use graft_markup::MarkupError;
use thiserror::Error;

/// Errors raised while building recipes from names and options.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    /// A recipe rejected its configuration.
    #[error(transparent)]
    Recipe(#[from] RecipeError),

    /// Options did not deserialise into the recipe's option type.
    #[error("invalid options for {recipe}: {message}")]
    Options {
        /// Name of the recipe.
        recipe: String,
        /// Deserialisation failure.
        message: String,
    },

    /// A recipe with this name is already registered.
    #[error("recipe {name} is already registered")]
    Duplicate {
        /// The conflicting name.
        name: String,
    },

    /// A declarative recipe document is malformed.
    #[error("invalid declarative recipe document: {message}")]
    Document {
        /// Description of the problem.
        message: String,
    },
}

impl CatalogError {
    /// Creates an options error.
    #[must_use]
    pub fn options(recipe: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Options {
            recipe: recipe.into(),
            message: message.into(),
        }
    }

    /// Creates a document error.
    #[must_use]
    pub fn document(message: impl Into<String>) -> Self {
        Self::Document {
            message: message.into(),
        }
    }
}

/// Errors raised while turning text into source files.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum SourceError {
    /// No parser handles the file's extension.
    #[error("no parser for {path}")]
    Unsupported {
        /// The rejected path.
        path: Utf8PathBuf,
    },

    /// A Java file failed to parse.
    #[error(transparent)]
    Java(#[from] JavaError),

    /// A markup file failed to parse.
    #[error(transparent)]
    Markup(#[from] MarkupError),
}

/// Failures fetching dependency metadata.
///
/// These never abort a run; scanning recipes record them and report them as
/// warning markers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum MetadataError {
    /// The metadata source could not be reached.
    #[error("dependency metadata for {coordinates} could not be downloaded: {message}")]
    Unavailable {
        /// `group:artifact` coordinates.
        coordinates: String,
        /// Description of the failure.
        message: String,
    },

    /// The artifact has no published release.
    #[error("no released versions of {coordinates} are published")]
    NoRelease {
        /// `group:artifact` coordinates.
        coordinates: String,
    },
}

impl MetadataError {
    /// Creates an unavailable error.
    #[must_use]
    pub fn unavailable(coordinates: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable {
            coordinates: coordinates.into(),
            message: message.into(),
        }
    }

    /// Creates a no-release error.
    #[must_use]
    pub fn no_release(coordinates: impl Into<String>) -> Self {
        Self::NoRelease {
            coordinates: coordinates.into(),
        }
    }
}
