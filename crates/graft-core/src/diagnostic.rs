//! Diagnostic types for structured reporting of run problems.
//!
//! Recoverable problems (non-convergence, skipped edits, resource failures)
//! are reported through [`Diagnostic`] entries on the run result rather than
//! aborting the run. Each diagnostic carries a stable [`DiagnosticCode`].

use std::fmt;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, RecipeError};

/// Stable error codes for engine diagnostics.
///
/// ```
/// use graft_core::DiagnosticCode;
///
/// assert_eq!(DiagnosticCode::NonConvergence.to_string(), "E_GRAFT_NON_CONVERGENCE");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum DiagnosticCode {
    /// A file did not parse.
    ParseFailure,
    /// A recipe failed validation.
    InvalidRecipe,
    /// A template snippet did not compile.
    TemplateConfiguration,
    /// A type reference could not be bound.
    UnresolvedType,
    /// The cycle limit was reached while files were still changing.
    NonConvergence,
    /// An external resource could not be fetched.
    ExternalResource,
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ParseFailure => f.write_str("E_GRAFT_PARSE_FAILURE"),
            Self::InvalidRecipe => f.write_str("E_GRAFT_INVALID_RECIPE"),
            Self::TemplateConfiguration => f.write_str("E_GRAFT_TEMPLATE_CONFIGURATION"),
            Self::UnresolvedType => f.write_str("E_GRAFT_UNRESOLVED_TYPE"),
            Self::NonConvergence => f.write_str("E_GRAFT_NON_CONVERGENCE"),
            Self::ExternalResource => f.write_str("E_GRAFT_EXTERNAL_RESOURCE"),
        }
    }
}

/// A location in a source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    path: Option<Utf8PathBuf>,
    line: u32,
    column: u32,
}

impl SourceLocation {
    /// Creates a one-based location.
    #[must_use]
    pub const fn new(path: Option<Utf8PathBuf>, line: u32, column: u32) -> Self {
        Self { path, line, column }
    }

    /// Returns the file path, if known.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        self.path.as_ref()
    }

    /// Returns the one-based line.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Returns the one-based column.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }
}

/// A single diagnostic entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    code: DiagnosticCode,
    message: String,
    location: Option<SourceLocation>,
    notes: Vec<String>,
}

impl Diagnostic {
    /// Creates a new diagnostic.
    #[must_use]
    pub const fn new(
        code: DiagnosticCode,
        message: String,
        location: Option<SourceLocation>,
        notes: Vec<String>,
    ) -> Self {
        Self {
            code,
            message,
            location,
            notes,
        }
    }

    /// Returns the diagnostic code.
    #[must_use]
    pub const fn code(&self) -> DiagnosticCode {
        self.code
    }

    /// Returns the diagnostic message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the location, if available.
    #[must_use]
    pub const fn location(&self) -> Option<&SourceLocation> {
        self.location.as_ref()
    }

    /// Returns the supplementary notes.
    #[must_use]
    pub fn notes(&self) -> &[String] {
        &self.notes
    }
}

impl From<&ParseError> for Diagnostic {
    fn from(error: &ParseError) -> Self {
        Self::new(
            DiagnosticCode::ParseFailure,
            error.to_string(),
            Some(SourceLocation::new(None, error.line(), error.column())),
            Vec::new(),
        )
    }
}

impl From<&RecipeError> for Diagnostic {
    fn from(error: &RecipeError) -> Self {
        let code = match error {
            RecipeError::Configuration { .. } => DiagnosticCode::TemplateConfiguration,
            _ => DiagnosticCode::InvalidRecipe,
        };
        Self::new(code, error.to_string(), None, Vec::new())
    }
}

fn diagnostic_summary(diagnostics: &[Diagnostic]) -> String {
    diagnostics.first().map_or_else(
        || String::from("empty diagnostic report"),
        |d| format!("{}: {}", d.code, d.message),
    )
}

/// A collection of diagnostics, usable as an error value.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("{}", diagnostic_summary(&self.diagnostics))]
pub struct DiagnosticReport {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticReport {
    /// Creates a report from a vector of diagnostics.
    #[must_use]
    pub const fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self { diagnostics }
    }

    /// Returns the diagnostics in this report.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Returns whether the report is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}
