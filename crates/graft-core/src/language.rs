//! Source languages understood by the rewrite engine.
//!
//! The core crate knows languages only by name and file extension; each
//! language crate owns its grammar and parser.

use std::fmt;
use std::str::FromStr;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Languages a [`SourceFile`](crate::SourceFile) can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    /// Java compilation units (`.java`).
    Java,
    /// XML documents (`.xml`), including Maven `pom.xml` files.
    Xml,
    /// YAML documents (`.yml`, `.yaml`).
    Yaml,
    /// Java properties files (`.properties`).
    Properties,
}

impl Language {
    /// Detects the language from a file extension.
    ///
    /// Returns `None` if the extension is not recognised.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        let normalised = ext.to_ascii_lowercase();
        match normalised.as_str() {
            "java" => Some(Self::Java),
            "xml" | "pom" => Some(Self::Xml),
            "yml" | "yaml" => Some(Self::Yaml),
            "properties" => Some(Self::Properties),
            _ => None,
        }
    }

    /// Detects the language from a file path by examining its extension.
    #[must_use]
    pub fn from_path(path: &Utf8Path) -> Option<Self> {
        path.extension().and_then(Self::from_extension)
    }

    /// Returns the lower-case identifier for this language.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Java => "java",
            Self::Xml => "xml",
            Self::Yaml => "yaml",
            Self::Properties => "properties",
        }
    }

    /// Returns all supported languages.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Java, Self::Xml, Self::Yaml, Self::Properties]
    }

    /// Returns whether the language is a markup or configuration format.
    #[must_use]
    pub const fn is_markup(self) -> bool {
        !matches!(self, Self::Java)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing a language identifier fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported language: '{0}'")]
pub struct LanguageParseError(String);

impl LanguageParseError {
    /// Returns the input that failed to parse.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.0
    }
}

impl FromStr for Language {
    type Err = LanguageParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let normalised = input.trim().to_ascii_lowercase();
        match normalised.as_str() {
            "java" => Ok(Self::Java),
            "xml" | "maven" => Ok(Self::Xml),
            "yaml" | "yml" => Ok(Self::Yaml),
            "properties" => Ok(Self::Properties),
            other => Err(LanguageParseError(other.to_owned())),
        }
    }
}
