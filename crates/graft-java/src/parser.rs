//! Java parsing into lossless trees.
//!
//! Parsing goes through Tree-sitter and [`graft_core::lossless`]. String,
//! character and text-block literals are collapsed into single tokens so
//! their content is never split across nodes.

use std::sync::Arc;

use camino::Utf8PathBuf;
use graft_core::{Language, Node, ParseError, SourceFile, lossless};

use crate::attribution::attribute_root;
use crate::classpath::Classpath;
use crate::error::JavaError;
use crate::syntax::ImportDecl;

/// Node kinds kept whole as single tokens.
pub const COLLAPSED_KINDS: &[&str] = &["string_literal", "character_literal", "text_block"];

/// Parses Java compilation units, attributing types when a classpath is set.
pub struct JavaParser {
    inner: tree_sitter::Parser,
    classpath: Option<Arc<Classpath>>,
}

impl JavaParser {
    /// Creates a parser without type attribution.
    ///
    /// # Errors
    ///
    /// Returns [`JavaError::ParserInit`] when the grammar cannot be loaded.
    pub fn new() -> Result<Self, JavaError> {
        let mut inner = tree_sitter::Parser::new();
        inner
            .set_language(&tree_sitter_java::LANGUAGE.into())
            .map_err(|err| JavaError::parser_init(err.to_string()))?;
        Ok(Self {
            inner,
            classpath: None,
        })
    }

    /// Attributes every parsed file against `classpath`.
    #[must_use]
    pub fn with_classpath(mut self, classpath: Arc<Classpath>) -> Self {
        self.classpath = Some(classpath);
        self
    }

    /// Parses `text` as the compilation unit at `path`.
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
        let (root, eof) = self
            .parse_root(text)
            .map_err(|err| err.with_path(path.clone()))?;
        let file = SourceFile::new(path, Language::Java, root, eof);
        Ok(match &self.classpath {
            Some(classpath) => {
                let root = attribute_root(file.root(), classpath);
                file.with_root(root)
            }
            None => file,
        })
    }

    pub(crate) fn parse_root(&mut self, text: &str) -> Result<(Arc<Node>, String), ParseError> {
        let tree = self
            .inner
            .parse(text, None)
            .ok_or_else(|| ParseError::new(Language::Java, 1, 1, "parser produced no tree"))?;
        lossless::from_tree_sitter(&tree, text, Language::Java, COLLAPSED_KINDS)
    }
}

impl std::fmt::Debug for JavaParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JavaParser")
            .field("attributing", &self.classpath.is_some())
            .finish_non_exhaustive()
    }
}

/// Builds a detached `import_declaration` node for `decl`.
pub(crate) fn parse_import(decl: &ImportDecl) -> Result<Arc<Node>, JavaError> {
    let text = format!("import {};\n", decl.render());
    let (root, _) = JavaParser::new()?.parse_root(&text)?;
    root.child_of_kind("import_declaration")
        .map(|import| Arc::new(import.with_prefix("")))
        .ok_or_else(|| {
            JavaError::Parse(ParseError::new(Language::Java, 1, 1, "not an import declaration"))
        })
}

/// Parses a single Java file without attribution.
///
/// # Errors
///
/// Returns [`JavaError`] when the parser cannot start or the text does not
/// parse.
pub fn parse_java(path: impl Into<Utf8PathBuf>, text: &str) -> Result<SourceFile, JavaError> {
    Ok(JavaParser::new()?.parse(path, text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::class("class A {}\n")]
    #[case::comments("// header\npackage p;\n\n/** doc */\nclass A {\n    int x = 1; // trailing\n}\n")]
    #[case::strings("class A { String s = \"a  b\\n\"; char c = ' '; }")]
    fn prints_exactly_what_was_parsed(#[case] text: &str) {
        let file = parse_java("A.java", text).expect("parse");
        assert_eq!(file.print(), text);
    }

    #[test]
    fn string_literals_are_single_tokens() {
        let file = parse_java("A.java", "class A { String s = \"x y\"; }").expect("parse");
        let literal = file
            .root()
            .descendants()
            .find(|node| node.is("string_literal"))
            .expect("literal");
        assert_eq!(literal.text(), Some("\"x y\""));
    }

    #[test]
    fn syntax_errors_carry_the_path() {
        let err = parse_java("src/Broken.java", "class {").expect_err("should fail");
        let JavaError::Parse(parse) = err else {
            panic!("unexpected error: {err}");
        };
        assert_eq!(parse.path().map(|p| p.as_str()), Some("src/Broken.java"));
        assert_eq!(parse.line(), 1);
    }
}
