//! Replaces references to one type with another.

use std::sync::Arc;

use graft_core::{
    Accumulator, AllPreconditions, Cursor, ExecutionContext, Node, Recipe, RecipeError,
    TreeVisitor, TypeAttribution, TypeHandle, check, simple_name,
};
use graft_java::{
    JavaVisitor, UsesType, java, maybe_add_import, maybe_remove_import, syntax, visit_children,
};
use serde::{Deserialize, Serialize};

use super::invalid_pattern;

/// Options for [`ChangeType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChangeTypeOptions {
    /// Required. The type to replace, e.g. `org.junit.Assert`.
    pub old_fully_qualified_type_name: String,
    /// Required. The replacement, e.g. `org.junit.jupiter.api.Assertions`.
    pub new_fully_qualified_type_name: String,
}

/// Rewrites every reference to the old type, simple or qualified, and
/// swaps the import.
pub struct ChangeType {
    options: ChangeTypeOptions,
    uses: UsesType,
}

impl ChangeType {
    /// Registered recipe name.
    pub const NAME: &'static str = "graft.java.ChangeType";

    /// Builds the recipe.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::InvalidOption`] when either name is malformed
    /// or both are the same.
    pub fn new(options: ChangeTypeOptions) -> Result<Self, RecipeError> {
        for (option, value) in [
            ("oldFullyQualifiedTypeName", &options.old_fully_qualified_type_name),
            ("newFullyQualifiedTypeName", &options.new_fully_qualified_type_name),
        ] {
            if value.is_empty() || value.contains(['*', ' ']) || value.contains("..") {
                return Err(RecipeError::invalid_option(
                    Self::NAME,
                    option,
                    format!("`{value}` is not a fully-qualified type name"),
                ));
            }
        }
        if options.old_fully_qualified_type_name == options.new_fully_qualified_type_name {
            return Err(RecipeError::invalid_option(
                Self::NAME,
                "newFullyQualifiedTypeName",
                "the new type equals the old type",
            ));
        }
        let uses = UsesType::new(&options.old_fully_qualified_type_name)
            .map_err(|err| invalid_pattern(Self::NAME, "oldFullyQualifiedTypeName", &err))?;
        Ok(Self { options, uses })
    }

    fn old(&self) -> &str {
        &self.options.old_fully_qualified_type_name
    }

    fn new_name(&self) -> &str {
        &self.options.new_fully_qualified_type_name
    }
}

impl Recipe for ChangeType {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "Change type"
    }

    fn description(&self) -> &str {
        "Changes every reference to a type, updating imports."
    }

    fn editor<'a>(&'a self, _acc: Option<&'a Accumulator>) -> Option<Box<dyn TreeVisitor + 'a>> {
        let uses = AllPreconditions::new(vec![Box::new(self.uses.clone())]);
        Some(check(
            uses,
            java(Retype {
                recipe: self,
                changed: false,
            }),
        ))
    }
}

struct Retype<'a> {
    recipe: &'a ChangeType,
    changed: bool,
}

impl Retype<'_> {
    fn refers_to_old(&self, node: &Node) -> bool {
        node.text() == Some(simple_name(self.recipe.old()))
            && node
                .type_handle()
                .is_some_and(|handle| handle.fqn().trim_end_matches("[]") == self.recipe.old())
    }
}

fn in_import(cursor: &Cursor<'_>) -> bool {
    cursor
        .ancestors()
        .any(|ancestor| ancestor.value().is("import_declaration"))
}

fn is_member_name(cursor: &Cursor<'_>) -> bool {
    let node = cursor.value();
    cursor.parent_value().is_some_and(|parent| {
        parent.is("scoped_type_identifier")
            || parent.is("scoped_identifier")
            || (parent.is("field_access") && node.field() == Some("field"))
    })
}

impl JavaVisitor for Retype<'_> {
    fn name(&self) -> &str {
        ChangeType::NAME
    }

    fn visit_compilation_unit(
        &mut self,
        cursor: &Cursor<'_>,
        ctx: &mut ExecutionContext,
    ) -> Arc<Node> {
        self.changed = false;
        let visited = visit_children(self, cursor, ctx);
        if self.changed {
            maybe_remove_import(ctx, self.recipe.old());
            maybe_add_import(ctx, self.recipe.new_name());
        }
        visited
    }

    fn visit_identifier(&mut self, cursor: &Cursor<'_>, _ctx: &mut ExecutionContext) -> Arc<Node> {
        let node = cursor.value();
        if in_import(cursor) || is_member_name(cursor) || !self.refers_to_old(node) {
            return Arc::clone(node);
        }
        let kind = node.type_handle().map(TypeHandle::kind);
        let attribution = kind.map(|kind| {
            TypeAttribution::Type(TypeHandle::new(self.recipe.new_name(), kind))
        });
        self.changed = true;
        Arc::new(
            node.with_text(simple_name(self.recipe.new_name()))
                .with_attribution(attribution),
        )
    }

    fn visit_other(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        let node = cursor.value();
        if node.is("scoped_type_identifier")
            && !in_import(cursor)
            && syntax::type_text(node) == self.recipe.old()
        {
            self.changed = true;
            let qualified = Node::token("type_identifier", self.recipe.new_name())
                .with_prefix(node.prefix())
                .with_field(node.field());
            return Arc::new(qualified);
        }
        visit_children(self, cursor, ctx)
    }
}
