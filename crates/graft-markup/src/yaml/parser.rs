//! YAML parsing through tree-sitter-yaml.

use camino::Utf8PathBuf;
use graft_core::{Language, ParseError, SourceFile, lossless};

use tracing::debug;

use crate::error::MarkupError;

/// Scalar kinds kept whole as single tokens.
pub const YAML_COLLAPSED_KINDS: &[&str] = &[
    "plain_scalar",
    "double_quote_scalar",
    "single_quote_scalar",
    "block_scalar",
];

/// Parses YAML streams into lossless trees.
pub struct YamlParser {
    inner: tree_sitter::Parser,
}

impl YamlParser {
    /// Creates a parser.
    ///
    /// # Errors
    ///
    /// Returns [`MarkupError::ParserInit`] when the grammar cannot be loaded.
    pub fn new() -> Result<Self, MarkupError> {
        let mut inner = tree_sitter::Parser::new();
        inner
            .set_language(&tree_sitter_yaml::LANGUAGE.into())
            .map_err(|err| MarkupError::parser_init("YAML", err.to_string()))?;
        Ok(Self { inner })
    }

    /// Parses `text` as the stream at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] locating the first syntax error.
    pub fn parse(
        &mut self,
        path: impl Into<Utf8PathBuf>,
        text: &str,
    ) -> Result<SourceFile, ParseError> {
        let path = path.into();
        let tree = self
            .inner
            .parse(text, None)
            .ok_or_else(|| ParseError::new(Language::Yaml, 1, 1, "parser produced no tree"))?;
        let (root, eof) =
            lossless::from_tree_sitter(&tree, text, Language::Yaml, YAML_COLLAPSED_KINDS)
                .map_err(|err| err.with_path(path.clone()))?;
        debug!(%path, language = %Language::Yaml, "parsed source file");
        Ok(SourceFile::new(path, Language::Yaml, root, eof))
    }
}

impl std::fmt::Debug for YamlParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YamlParser").finish_non_exhaustive()
    }
}

/// Parses a single YAML stream.
///
/// # Errors
///
/// Returns [`MarkupError`] when the parser cannot start or the text does not
/// parse.
pub fn parse_yaml(path: impl Into<Utf8PathBuf>, text: &str) -> Result<SourceFile, MarkupError> {
    Ok(YamlParser::new()?.parse(path, text)?)
}
