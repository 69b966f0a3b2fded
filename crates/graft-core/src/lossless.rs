//! Conversion of Tree-sitter trees into the lossless [`Node`] model.
//!
//! The gap between consecutive tokens becomes the prefix of the outermost
//! node starting after it. Extra nodes (comments) are folded into that gap,
//! so they travel with the node they precede.

use std::sync::Arc;

use crate::error::ParseError;
use crate::language::Language;
use crate::position::point_to_one_based;
use crate::tree::{Body, Node};

/// Converts a Tree-sitter tree into a lossless tree.
///
/// Nodes whose kind appears in `collapse` become single tokens holding their
/// full source text, which keeps literals such as strings intact. Returns the
/// root and the text trailing it.
///
/// # Errors
///
/// Returns a [`ParseError`] locating the first `ERROR` or `MISSING` node when
/// the grammar rejected part of the input.
pub fn from_tree_sitter(
    tree: &tree_sitter::Tree,
    source: &str,
    language: Language,
    collapse: &[&str],
) -> Result<(Arc<Node>, String), ParseError> {
    let root = tree.root_node();
    if root.has_error() {
        return Err(first_error(root, language));
    }

    let mut builder = Builder {
        source,
        collapse,
        pos: 0,
    };
    let node = builder.convert(root, None);
    let eof = source.get(builder.pos..).unwrap_or_default().to_owned();
    Ok((Arc::new(node), eof))
}

struct Builder<'s, 'c> {
    source: &'s str,
    collapse: &'c [&'c str],
    pos: usize,
}

impl Builder<'_, '_> {
    fn take_gap(&mut self, start: usize) -> String {
        let gap = self
            .source
            .get(self.pos..start)
            .unwrap_or_default()
            .to_owned();
        self.pos = self.pos.max(start);
        gap
    }

    fn convert(&mut self, node: tree_sitter::Node<'_>, field: Option<&'static str>) -> Node {
        let prefix = self.take_gap(node.start_byte());

        if node.child_count() == 0 || self.collapse.contains(&node.kind()) {
            let text = self
                .source
                .get(node.start_byte()..node.end_byte())
                .unwrap_or_default();
            self.pos = self.pos.max(node.end_byte());
            return Node::from_parts(
                node.kind(),
                field,
                node.is_named(),
                prefix,
                Body::Token(Arc::from(text)),
            );
        }

        let mut children = Vec::with_capacity(node.child_count());
        let mut cursor = node.walk();
        if cursor.goto_first_child() {
            loop {
                let child = cursor.node();
                // Extras stay in the gap and land in the next node's prefix.
                if !child.is_extra() {
                    children.push(Arc::new(self.convert(child, cursor.field_name())));
                }
                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }

        Node::from_parts(
            node.kind(),
            field,
            node.is_named(),
            prefix,
            Body::Branch(children),
        )
    }
}

fn first_error(node: tree_sitter::Node<'_>, language: Language) -> ParseError {
    find_error_node(node).map_or_else(
        || ParseError::new(language, 1, 1, "syntax error"),
        |error| {
            let (line, column) = point_to_one_based(error.start_position());
            let message = if error.is_missing() {
                format!("missing {}", error.kind())
            } else {
                "syntax error".to_owned()
            };
            ParseError::new(language, line, column, message)
        },
    )
}

fn find_error_node(node: tree_sitter::Node<'_>) -> Option<tree_sitter::Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(find_error_node)
}
