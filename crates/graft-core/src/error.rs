//! Error types shared by the rewrite engine.

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::language::Language;

/// Input text does not conform to the grammar of its language.
///
/// A parse error fails only the file it belongs to.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error(
    "failed to parse {language} source{}: {message} at line {line}, column {column}",
    describe_path(.path.as_ref())
)]
pub struct ParseError {
    language: Language,
    path: Option<Utf8PathBuf>,
    line: u32,
    column: u32,
    message: String,
}

fn describe_path(path: Option<&Utf8PathBuf>) -> String {
    path.map(|p| format!(" {p}")).unwrap_or_default()
}

impl ParseError {
    /// Creates a parse error at a one-based location.
    #[must_use]
    pub fn new(language: Language, line: u32, column: u32, message: impl Into<String>) -> Self {
        Self {
            language,
            path: None,
            line,
            column,
            message: message.into(),
        }
    }

    /// Attaches the path of the file that failed to parse.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Returns the language whose grammar rejected the input.
    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Returns the path of the failing file, when known.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8Path> {
        self.path.as_deref()
    }

    /// Returns the one-based line of the first error.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Returns the one-based column of the first error.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Returns the failure description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors raised while configuring or validating recipes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RecipeError {
    /// A required option was not supplied.
    #[error("recipe {recipe} is missing required option `{option}`")]
    MissingOption {
        /// Name of the recipe.
        recipe: String,
        /// Name of the option.
        option: String,
    },

    /// An option value is malformed.
    #[error("recipe {recipe} has invalid option `{option}`: {message}")]
    InvalidOption {
        /// Name of the recipe.
        recipe: String,
        /// Name of the option.
        option: String,
        /// Description of the problem.
        message: String,
    },

    /// The recipe itself is defective, e.g. a template that does not parse.
    #[error("recipe {recipe} is misconfigured: {message}")]
    Configuration {
        /// Name of the recipe.
        recipe: String,
        /// Description of the defect.
        message: String,
    },

    /// No recipe with the given name is registered.
    #[error("unknown recipe: {name}")]
    UnknownRecipe {
        /// The requested recipe name.
        name: String,
    },
}

impl RecipeError {
    /// Creates a missing option error.
    #[must_use]
    pub fn missing_option(recipe: impl Into<String>, option: impl Into<String>) -> Self {
        Self::MissingOption {
            recipe: recipe.into(),
            option: option.into(),
        }
    }

    /// Creates an invalid option error.
    #[must_use]
    pub fn invalid_option(
        recipe: impl Into<String>,
        option: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidOption {
            recipe: recipe.into(),
            option: option.into(),
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(recipe: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Configuration {
            recipe: recipe.into(),
            message: message.into(),
        }
    }

    /// Creates an unknown recipe error.
    #[must_use]
    pub fn unknown_recipe(name: impl Into<String>) -> Self {
        Self::UnknownRecipe { name: name.into() }
    }
}
