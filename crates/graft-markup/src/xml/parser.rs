//! XML parsing through tree-sitter-xml.

use camino::Utf8PathBuf;
use graft_core::{Language, ParseError, SourceFile, lossless};

use tracing::debug;

use crate::error::MarkupError;

/// Node kinds kept whole as single tokens: character data, attribute values
/// and the other runs whose inner structure edits never touch.
pub const XML_COLLAPSED_KINDS: &[&str] = &[
    "XMLDecl",
    "doctypedecl",
    "AttValue",
    "CharData",
    "CDSect",
    "Comment",
    "PI",
];

/// Parses XML documents into lossless trees.
pub struct XmlParser {
    inner: tree_sitter::Parser,
}

impl XmlParser {
    /// Creates a parser.
    ///
    /// # Errors
    ///
    /// Returns [`MarkupError::ParserInit`] when the grammar cannot be loaded.
    pub fn new() -> Result<Self, MarkupError> {
        let mut inner = tree_sitter::Parser::new();
        inner
            .set_language(&tree_sitter_xml::LANGUAGE_XML.into())
            .map_err(|err| MarkupError::parser_init("XML", err.to_string()))?;
        Ok(Self { inner })
    }

    /// Parses `text` as the document at `path`.
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
            .ok_or_else(|| ParseError::new(Language::Xml, 1, 1, "parser produced no tree"))?;
        let (root, eof) =
            lossless::from_tree_sitter(&tree, text, Language::Xml, XML_COLLAPSED_KINDS)
                .map_err(|err| err.with_path(path.clone()))?;
        debug!(%path, language = %Language::Xml, "parsed source file");
        Ok(SourceFile::new(path, Language::Xml, root, eof))
    }
}

impl std::fmt::Debug for XmlParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlParser").finish_non_exhaustive()
    }
}

/// Parses a single XML document.
///
/// # Errors
///
/// Returns [`MarkupError`] when the parser cannot start or the text does not
/// parse.
pub fn parse_xml(path: impl Into<Utf8PathBuf>, text: &str) -> Result<SourceFile, MarkupError> {
    Ok(XmlParser::new()?.parse(path, text)?)
}
