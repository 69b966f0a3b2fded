//! YAML visitors with per-construct hooks.

use std::sync::Arc;

use graft_core::{Cursor, ExecutionContext, Language, Node, SourceFile, TreeVisitor, walk_children_with};

use super::entries::{is_entry, is_scalar};

/// Coarse classification of YAML node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YamlKind {
    /// One document of the stream.
    Document,
    /// A block or flow mapping.
    Mapping,
    /// A `key: value` entry.
    Entry,
    /// A block or flow sequence.
    Sequence,
    /// A `- item` of a block sequence.
    SequenceItem,
    /// A scalar token.
    Scalar,
    /// Everything else.
    Other,
}

impl YamlKind {
    /// Classifies a node.
    #[must_use]
    pub fn of(node: &Node) -> Self {
        if is_entry(node) {
            return Self::Entry;
        }
        if is_scalar(node) {
            return Self::Scalar;
        }
        match node.kind() {
            "document" => Self::Document,
            "block_mapping" | "flow_mapping" => Self::Mapping,
            "block_sequence" | "flow_sequence" => Self::Sequence,
            "block_sequence_item" => Self::SequenceItem,
            _ => Self::Other,
        }
    }
}

/// A visitor over YAML trees.
pub trait YamlVisitor: Send {
    /// Returns a stable name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Returns whether the visitor should run on `file`.
    fn is_acceptable(&self, file: &SourceFile, ctx: &ExecutionContext) -> bool {
        let _ = ctx;
        file.language() == Language::Yaml
    }

    /// Visits a document.
    fn visit_document(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        visit_children(self, cursor, ctx)
    }

    /// Visits a mapping.
    fn visit_mapping(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        visit_children(self, cursor, ctx)
    }

    /// Visits a mapping entry.
    fn visit_entry(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        visit_children(self, cursor, ctx)
    }

    /// Visits a sequence.
    fn visit_sequence(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        visit_children(self, cursor, ctx)
    }

    /// Visits a block sequence item.
    fn visit_sequence_item(
        &mut self,
        cursor: &Cursor<'_>,
        ctx: &mut ExecutionContext,
    ) -> Arc<Node> {
        visit_children(self, cursor, ctx)
    }

    /// Visits a scalar.
    fn visit_scalar(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        let _ = ctx;
        Arc::clone(cursor.value())
    }

    /// Visits any node without a dedicated hook.
    fn visit_other(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        visit_children(self, cursor, ctx)
    }
}

/// Routes the node under `cursor` to the matching hook of `visitor`.
pub fn dispatch<V: YamlVisitor + ?Sized>(
    visitor: &mut V,
    cursor: &Cursor<'_>,
    ctx: &mut ExecutionContext,
) -> Arc<Node> {
    match YamlKind::of(cursor.value()) {
        YamlKind::Document => visitor.visit_document(cursor, ctx),
        YamlKind::Mapping => visitor.visit_mapping(cursor, ctx),
        YamlKind::Entry => visitor.visit_entry(cursor, ctx),
        YamlKind::Sequence => visitor.visit_sequence(cursor, ctx),
        YamlKind::SequenceItem => visitor.visit_sequence_item(cursor, ctx),
        YamlKind::Scalar => visitor.visit_scalar(cursor, ctx),
        YamlKind::Other => visitor.visit_other(cursor, ctx),
    }
}

/// Dispatches every child of the node under `cursor`.
pub fn visit_children<V: YamlVisitor + ?Sized>(
    visitor: &mut V,
    cursor: &Cursor<'_>,
    ctx: &mut ExecutionContext,
) -> Arc<Node> {
    walk_children_with(cursor, |child| dispatch(visitor, child, ctx))
}

/// Adapts a [`YamlVisitor`] into a [`TreeVisitor`].
#[derive(Debug, Clone, Default)]
pub struct Yaml<V>(pub V);

impl<V: YamlVisitor> TreeVisitor for Yaml<V> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn is_acceptable(&self, file: &SourceFile, ctx: &ExecutionContext) -> bool {
        self.0.is_acceptable(file, ctx)
    }

    fn visit(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        dispatch(&mut self.0, cursor, ctx)
    }
}

/// Boxes `visitor` as a [`TreeVisitor`].
pub fn yaml<'a, V: YamlVisitor + 'a>(visitor: V) -> Box<dyn TreeVisitor + 'a> {
    Box::new(Yaml(visitor))
}
