//! Parsed source files.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};

use super::node::Node;
use crate::language::Language;

/// A parsed source file: the tree root plus whatever trails it.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: Utf8PathBuf,
    language: Language,
    root: Arc<Node>,
    eof: String,
}

impl SourceFile {
    /// Creates a source file from a parsed root and its trailing text.
    #[must_use]
    pub fn new(
        path: impl Into<Utf8PathBuf>,
        language: Language,
        root: Arc<Node>,
        eof: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            language,
            root,
            eof: eof.into(),
        }
    }

    /// Returns the path relative to the project root.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Returns the source language.
    #[must_use]
    pub const fn language(&self) -> Language {
        self.language
    }

    /// Returns the tree root.
    #[must_use]
    pub const fn root(&self) -> &Arc<Node> {
        &self.root
    }

    /// Returns the whitespace and comments after the last node.
    #[must_use]
    pub fn eof(&self) -> &str {
        &self.eof
    }

    /// Returns a copy with a new root.
    #[must_use]
    pub fn with_root(&self, root: Arc<Node>) -> Self {
        Self {
            root,
            ..self.clone()
        }
    }

    /// Prints the file back to text.
    #[must_use]
    pub fn print(&self) -> String {
        let mut out = self.root.print();
        out.push_str(&self.eof);
        out
    }

    /// Collects the messages of every warning marker in the tree.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        self.root
            .descendants()
            .flat_map(|node| node.markers().warnings())
            .map(str::to_owned)
            .collect()
    }

    /// Counts the nodes carrying a search result marker.
    #[must_use]
    pub fn search_results(&self) -> usize {
        self.root
            .descendants()
            .filter(|node| node.markers().has_search_result())
            .count()
    }
}
