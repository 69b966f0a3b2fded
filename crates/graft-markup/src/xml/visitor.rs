//! XML visitors with per-construct hooks.

use std::sync::Arc;

use graft_core::{Cursor, ExecutionContext, Language, Node, SourceFile, TreeVisitor, walk_children_with};

use super::tags::{ATTRIBUTE, ELEMENT};

/// Coarse classification of XML node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlKind {
    /// The document root.
    Document,
    /// An element, from start tag to end tag.
    Tag,
    /// A `name="value"` attribute.
    Attribute,
    /// Character data or a CDATA section.
    Text,
    /// Everything else.
    Other,
}

impl XmlKind {
    /// Classifies a grammar kind.
    #[must_use]
    pub fn of(kind: &str) -> Self {
        match kind {
            "document" => Self::Document,
            ELEMENT => Self::Tag,
            ATTRIBUTE => Self::Attribute,
            "CharData" | "CDSect" => Self::Text,
            _ => Self::Other,
        }
    }
}

/// A visitor over XML trees.
pub trait XmlVisitor: Send {
    /// Returns a stable name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Returns whether the visitor should run on `file`.
    fn is_acceptable(&self, file: &SourceFile, ctx: &ExecutionContext) -> bool {
        let _ = ctx;
        file.language() == Language::Xml
    }

    /// Visits the document root.
    fn visit_document(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        visit_children(self, cursor, ctx)
    }

    /// Visits an element.
    fn visit_tag(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        visit_children(self, cursor, ctx)
    }

    /// Visits an attribute.
    fn visit_attribute(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        visit_children(self, cursor, ctx)
    }

    /// Visits character data.
    fn visit_text(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        visit_children(self, cursor, ctx)
    }

    /// Visits any node without a dedicated hook.
    fn visit_other(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        visit_children(self, cursor, ctx)
    }
}

/// Routes the node under `cursor` to the matching hook of `visitor`.
pub fn dispatch<V: XmlVisitor + ?Sized>(
    visitor: &mut V,
    cursor: &Cursor<'_>,
    ctx: &mut ExecutionContext,
) -> Arc<Node> {
    match XmlKind::of(cursor.value().kind()) {
        XmlKind::Document => visitor.visit_document(cursor, ctx),
        XmlKind::Tag => visitor.visit_tag(cursor, ctx),
        XmlKind::Attribute => visitor.visit_attribute(cursor, ctx),
        XmlKind::Text => visitor.visit_text(cursor, ctx),
        XmlKind::Other => visitor.visit_other(cursor, ctx),
    }
}

/// Dispatches every child of the node under `cursor`.
pub fn visit_children<V: XmlVisitor + ?Sized>(
    visitor: &mut V,
    cursor: &Cursor<'_>,
    ctx: &mut ExecutionContext,
) -> Arc<Node> {
    walk_children_with(cursor, |child| dispatch(visitor, child, ctx))
}

/// Adapts an [`XmlVisitor`] into a [`TreeVisitor`].
#[derive(Debug, Clone, Default)]
pub struct Xml<V>(pub V);

impl<V: XmlVisitor> TreeVisitor for Xml<V> {
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
pub fn xml<'a, V: XmlVisitor + 'a>(visitor: V) -> Box<dyn TreeVisitor + 'a> {
    Box::new(Xml(visitor))
}
