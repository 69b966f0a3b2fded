//! Java visitors with per-construct hooks.
//!
//! [`JavaVisitor`] dispatches every node to the hook for its [`JavaKind`].
//! Hooks default to visiting children, so an implementation overrides only
//! the constructs it cares about. Wrap it in [`Java`] to obtain a
//! [`TreeVisitor`] the runtime can drive.

use std::sync::Arc;

use graft_core::{Cursor, ExecutionContext, Language, Node, SourceFile, TreeVisitor, walk_children_with};

use crate::kind::JavaKind;

/// A visitor over Java trees.
pub trait JavaVisitor: Send {
    /// Returns a stable name used in logs and deduplication keys.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Returns whether the visitor should run on `file`.
    fn is_acceptable(&self, file: &SourceFile, ctx: &ExecutionContext) -> bool {
        let _ = ctx;
        file.language() == Language::Java
    }

    /// Visits the compilation unit.
    fn visit_compilation_unit(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        visit_children(self, cursor, ctx)
    }

    /// Visits an import declaration.
    fn visit_import(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        visit_children(self, cursor, ctx)
    }

    /// Visits a class-like declaration.
    fn visit_class_declaration(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        visit_children(self, cursor, ctx)
    }

    /// Visits a method or constructor declaration.
    fn visit_method_declaration(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        visit_children(self, cursor, ctx)
    }

    /// Visits a field or local variable declaration.
    fn visit_variable_declaration(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        visit_children(self, cursor, ctx)
    }

    /// Visits a block.
    fn visit_block(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        visit_children(self, cursor, ctx)
    }

    /// Visits a method invocation.
    fn visit_method_invocation(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        visit_children(self, cursor, ctx)
    }

    /// Visits an instance creation expression.
    fn visit_new_class(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        visit_children(self, cursor, ctx)
    }

    /// Visits a field access.
    fn visit_field_access(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        visit_children(self, cursor, ctx)
    }

    /// Visits an identifier or type identifier.
    fn visit_identifier(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        visit_children(self, cursor, ctx)
    }

    /// Visits an annotation.
    fn visit_annotation(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        visit_children(self, cursor, ctx)
    }

    /// Visits a literal.
    fn visit_literal(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        visit_children(self, cursor, ctx)
    }

    /// Visits any node without a dedicated hook.
    fn visit_other(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        visit_children(self, cursor, ctx)
    }
}

/// Routes the node under `cursor` to the matching hook of `visitor`.
pub fn dispatch<V: JavaVisitor + ?Sized>(
    visitor: &mut V,
    cursor: &Cursor<'_>,
    ctx: &mut ExecutionContext,
) -> Arc<Node> {
    match JavaKind::of(cursor.value().kind()) {
        JavaKind::CompilationUnit => visitor.visit_compilation_unit(cursor, ctx),
        JavaKind::Import => visitor.visit_import(cursor, ctx),
        JavaKind::ClassDeclaration => visitor.visit_class_declaration(cursor, ctx),
        JavaKind::MethodDeclaration => visitor.visit_method_declaration(cursor, ctx),
        JavaKind::VariableDeclaration => visitor.visit_variable_declaration(cursor, ctx),
        JavaKind::Block => visitor.visit_block(cursor, ctx),
        JavaKind::MethodInvocation => visitor.visit_method_invocation(cursor, ctx),
        JavaKind::NewClass => visitor.visit_new_class(cursor, ctx),
        JavaKind::FieldAccess => visitor.visit_field_access(cursor, ctx),
        JavaKind::Identifier => visitor.visit_identifier(cursor, ctx),
        JavaKind::Annotation => visitor.visit_annotation(cursor, ctx),
        JavaKind::Literal => visitor.visit_literal(cursor, ctx),
        JavaKind::Other => visitor.visit_other(cursor, ctx),
    }
}

/// Dispatches every child of the node under `cursor` and rebuilds the node
/// only when a child changed.
pub fn visit_children<V: JavaVisitor + ?Sized>(
    visitor: &mut V,
    cursor: &Cursor<'_>,
    ctx: &mut ExecutionContext,
) -> Arc<Node> {
    walk_children_with(cursor, |child| dispatch(visitor, child, ctx))
}

/// Adapts a [`JavaVisitor`] into a [`TreeVisitor`].
#[derive(Debug, Clone, Default)]
pub struct Java<V>(pub V);

impl<V: JavaVisitor> TreeVisitor for Java<V> {
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
pub fn java<'a, V: JavaVisitor + 'a>(visitor: V) -> Box<dyn TreeVisitor + 'a> {
    Box::new(Java(visitor))
}
