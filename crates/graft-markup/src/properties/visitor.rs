//! Properties visitors.

use std::sync::Arc;

use graft_core::{Cursor, ExecutionContext, Language, Node, SourceFile, TreeVisitor, walk_children_with};

use super::entries::is_property;
use super::parser::PROPERTIES;

/// A visitor over properties files.
pub trait PropertiesVisitor: Send {
    /// Returns a stable name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Returns whether the visitor should run on `file`.
    fn is_acceptable(&self, file: &SourceFile, ctx: &ExecutionContext) -> bool {
        let _ = ctx;
        file.language() == Language::Properties
    }

    /// Visits the file root.
    fn visit_document(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        visit_children(self, cursor, ctx)
    }

    /// Visits an entry.
    fn visit_entry(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        let _ = ctx;
        Arc::clone(cursor.value())
    }
}

/// Routes the node under `cursor` to the matching hook of `visitor`.
pub fn dispatch<V: PropertiesVisitor + ?Sized>(
    visitor: &mut V,
    cursor: &Cursor<'_>,
    ctx: &mut ExecutionContext,
) -> Arc<Node> {
    let node = cursor.value();
    if node.is(PROPERTIES) {
        visitor.visit_document(cursor, ctx)
    } else if is_property(node) {
        visitor.visit_entry(cursor, ctx)
    } else {
        Arc::clone(node)
    }
}

/// Dispatches every child of the node under `cursor`.
pub fn visit_children<V: PropertiesVisitor + ?Sized>(
    visitor: &mut V,
    cursor: &Cursor<'_>,
    ctx: &mut ExecutionContext,
) -> Arc<Node> {
    walk_children_with(cursor, |child| dispatch(visitor, child, ctx))
}

/// Adapts a [`PropertiesVisitor`] into a [`TreeVisitor`].
#[derive(Debug, Clone, Default)]
pub struct Properties<V>(pub V);

impl<V: PropertiesVisitor> TreeVisitor for Properties<V> {
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
pub fn properties<'a, V: PropertiesVisitor + 'a>(visitor: V) -> Box<dyn TreeVisitor + 'a> {
    Box::new(Properties(visitor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::properties::{entry_key, parse_properties, with_value};
    use graft_core::visit_file;

    struct Upper;

    impl PropertiesVisitor for Upper {
        fn visit_entry(&mut self, cursor: &Cursor<'_>, _ctx: &mut ExecutionContext) -> Arc<Node> {
            let entry = cursor.value();
            if entry_key(entry).as_deref() == Some("name") {
                Arc::new(with_value(entry, "GRAFT"))
            } else {
                Arc::clone(entry)
            }
        }
    }

    #[test]
    fn rewrites_only_the_visited_entry() {
        let file = Arc::new(parse_properties("a.properties", "port=1\nname=graft\n").expect("parse"));
        let mut ctx = ExecutionContext::for_file(&file, 1);
        let after = visit_file(&mut Properties(Upper), &file, &mut ctx);
        assert_eq!(after.print(), "port=1\nname=GRAFT\n");
        let untouched = |f: &SourceFile| Arc::clone(f.root().children().first().expect("first"));
        assert!(Arc::ptr_eq(&untouched(&file), &untouched(&after)));
    }
}
