//! Tree visitors and the default recursive walk.
//!
//! A visitor receives a [`Cursor`] positioned on the node being visited and
//! returns the node that should take its place. Returning the same
//! [`Arc`] signals "no change"; [`walk_children`] rebuilds a parent only
//! when at least one child pointer differs, so untouched subtrees stay
//! shared with the input.

use std::sync::Arc;

use crate::context::ExecutionContext;
use crate::cursor::Cursor;
use crate::tree::{Node, NodeId, SourceFile};

/// A tree-rewriting visitor.
pub trait TreeVisitor: Send {
    /// Returns a stable name used in logs and deduplication keys.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Returns whether the visitor should run on `file` at all.
    fn is_acceptable(&self, file: &SourceFile, ctx: &ExecutionContext) -> bool {
        let _ = (file, ctx);
        true
    }

    /// Visits the node under `cursor` and returns its replacement.
    fn visit(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        walk_children(self, cursor, ctx)
    }
}

/// Visits every child of the node under `cursor` with `visitor` and returns
/// the node, rebuilt only if a child changed.
pub fn walk_children<V: TreeVisitor + ?Sized>(
    visitor: &mut V,
    cursor: &Cursor<'_>,
    ctx: &mut ExecutionContext,
) -> Arc<Node> {
    walk_children_with(cursor, |child| visitor.visit(child, ctx))
}

/// Rebuilds the node under `cursor` from the results of `visit` applied to
/// each child cursor, sharing the node when nothing changed.
pub fn walk_children_with(
    cursor: &Cursor<'_>,
    mut visit: impl FnMut(&Cursor<'_>) -> Arc<Node>,
) -> Arc<Node> {
    let node = cursor.value();
    let mut changed = false;
    let mut children = Vec::with_capacity(node.children().len());
    for child in node.children() {
        let child_cursor = cursor.child(Arc::clone(child));
        let visited = visit(&child_cursor);
        changed |= !Arc::ptr_eq(child, &visited);
        children.push(visited);
    }
    if changed {
        Arc::new(node.with_children(children))
    } else {
        Arc::clone(node)
    }
}

/// Runs `visitor` over the whole tree of `file`.
///
/// Returns `file` itself when the visitor made no change.
pub fn visit_file<V: TreeVisitor + ?Sized>(
    visitor: &mut V,
    file: &Arc<SourceFile>,
    ctx: &mut ExecutionContext,
) -> Arc<SourceFile> {
    let cursor = Cursor::root(Arc::clone(file.root()));
    let root = visitor.visit(&cursor, ctx);
    if Arc::ptr_eq(&root, file.root()) {
        Arc::clone(file)
    } else {
        Arc::new(file.with_root(root))
    }
}

/// Restricts a visitor to the subtree rooted at one node.
///
/// Nodes outside the scope are returned untouched; the inner visitor sees a
/// cursor with the full ancestor chain of the scope node.
pub struct ScopedVisitor {
    scope: NodeId,
    inner: Box<dyn TreeVisitor>,
}

impl ScopedVisitor {
    /// Scopes `inner` to the node with identity `scope`.
    #[must_use]
    pub fn new(scope: NodeId, inner: Box<dyn TreeVisitor>) -> Self {
        Self { scope, inner }
    }
}

impl TreeVisitor for ScopedVisitor {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn visit(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        let node = cursor.value();
        if node.id() == self.scope {
            return self.inner.visit(cursor, ctx);
        }
        if node.contains(self.scope) {
            return walk_children(self, cursor, ctx);
        }
        Arc::clone(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;

    struct Rename {
        from: &'static str,
        to: &'static str,
    }

    impl TreeVisitor for Rename {
        fn visit(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
            let node = walk_children(self, cursor, ctx);
            if node.text() == Some(self.from) {
                Arc::new(node.with_text(self.to))
            } else {
                node
            }
        }
    }

    fn file() -> Arc<SourceFile> {
        let a = Arc::new(Node::token("identifier", "a"));
        let b = Arc::new(Node::token("identifier", "b").with_prefix(" "));
        let left = Arc::new(Node::branch("pair", vec![a]));
        let right = Arc::new(Node::branch("pair", vec![b]));
        let root = Arc::new(Node::branch("program", vec![left, right]));
        Arc::new(SourceFile::new("x.txt", Language::Java, root, "\n"))
    }

    #[test]
    fn unchanged_tree_is_shared() {
        let source = file();
        let mut ctx = ExecutionContext::for_file(&source, 1);
        let mut visitor = Rename { from: "z", to: "y" };
        let out = visit_file(&mut visitor, &source, &mut ctx);
        assert!(Arc::ptr_eq(&out, &source));
    }

    #[test]
    fn changed_path_is_rebuilt_and_siblings_shared() {
        let source = file();
        let mut ctx = ExecutionContext::for_file(&source, 1);
        let mut visitor = Rename { from: "b", to: "c" };
        let out = visit_file(&mut visitor, &source, &mut ctx);

        assert_eq!(out.print(), "a c\n");
        let before = source.root().children();
        let after = out.root().children();
        assert!(Arc::ptr_eq(&before[0], &after[0]));
        assert!(!Arc::ptr_eq(&before[1], &after[1]));
        assert_eq!(before[1].id(), after[1].id());
    }

    #[test]
    fn scoped_visitor_ignores_nodes_outside_scope() {
        let source = file();
        let scope = source.root().children()[1].id();
        let mut ctx = ExecutionContext::for_file(&source, 1);
        let mut visitor = ScopedVisitor::new(scope, Box::new(Rename { from: "a", to: "z" }));
        let out = visit_file(&mut visitor, &source, &mut ctx);
        assert!(Arc::ptr_eq(&out, &source));

        let mut visitor = ScopedVisitor::new(scope, Box::new(Rename { from: "b", to: "z" }));
        let out = visit_file(&mut visitor, &source, &mut ctx);
        assert_eq!(out.print(), "a z\n");
    }
}
