//! Renames methods at their declarations and call sites.

use std::sync::Arc;

use graft_core::{
    Accumulator, AllPreconditions, Cursor, ExecutionContext, Node, Recipe, RecipeError,
    TreeVisitor, check,
};
use graft_java::{JavaVisitor, MethodMatcher, UsesMethod, java, visit_children};
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::invalid_pattern;

/// Options for [`ChangeMethodName`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChangeMethodNameOptions {
    /// Required. Methods to rename, e.g. `com.acme.Client send(..)`.
    pub method_pattern: String,
    /// Required. The new simple name, e.g. `dispatch`.
    pub new_method_name: String,
}

/// Renames every matching method invocation and declaration.
pub struct ChangeMethodName {
    options: ChangeMethodNameOptions,
    matcher: MethodMatcher,
}

impl ChangeMethodName {
    /// Registered recipe name.
    pub const NAME: &'static str = "graft.java.ChangeMethodName";

    /// Builds the recipe.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::InvalidOption`] for a malformed pattern or a
    /// new name that is not a Java identifier.
    pub fn new(options: ChangeMethodNameOptions) -> Result<Self, RecipeError> {
        let matcher = MethodMatcher::new(&options.method_pattern)
            .map_err(|err| invalid_pattern(Self::NAME, "methodPattern", &err))?;
        if !is_identifier(&options.new_method_name) {
            return Err(RecipeError::invalid_option(
                Self::NAME,
                "newMethodName",
                format!("`{}` is not a Java identifier", options.new_method_name),
            ));
        }
        Ok(Self { options, matcher })
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|first| first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

impl Recipe for ChangeMethodName {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "Change method name"
    }

    fn description(&self) -> &str {
        "Renames a method at its declaration and every call site."
    }

    fn editor<'a>(&'a self, _acc: Option<&'a Accumulator>) -> Option<Box<dyn TreeVisitor + 'a>> {
        let uses = AllPreconditions::new(vec![Box::new(UsesMethod::new(self.matcher.clone()))]);
        Some(check(uses, java(Rename { recipe: self })))
    }
}

struct Rename<'a> {
    recipe: &'a ChangeMethodName,
}

impl Rename<'_> {
    fn rename(&self, original: &Node, visited: Arc<Node>) -> Arc<Node> {
        let new_name = self.recipe.options.new_method_name.as_str();
        if !self.recipe.matcher.matches_node(original) {
            return visited;
        }
        let Some(name) = visited.child_by_field("name") else {
            return visited;
        };
        if name.text() == Some(new_name) {
            return visited;
        }
        trace!(from = ?name.text(), to = new_name, "renaming method");
        let renamed = Arc::new(name.with_text(new_name).with_attribution(None));
        visited
            .position_of(name.id())
            .map_or_else(
                || Arc::clone(&visited),
                |index| Arc::new(visited.with_child(index, renamed)),
            )
    }
}

impl JavaVisitor for Rename<'_> {
    fn name(&self) -> &str {
        ChangeMethodName::NAME
    }

    fn visit_method_invocation(
        &mut self,
        cursor: &Cursor<'_>,
        ctx: &mut ExecutionContext,
    ) -> Arc<Node> {
        let visited = visit_children(self, cursor, ctx);
        self.rename(cursor.value(), visited)
    }

    fn visit_method_declaration(
        &mut self,
        cursor: &Cursor<'_>,
        ctx: &mut ExecutionContext,
    ) -> Arc<Node> {
        let visited = visit_children(self, cursor, ctx);
        if cursor.value().is("constructor_declaration") {
            return visited;
        }
        self.rename(cursor.value(), visited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RewriteTest, after};
    use rstest::rstest;

    const CLIENT: &str = "package com.acme;\npublic class Client {\n    public void send(int timeout) {}\n    public void send(String body) {}\n}\n";

    fn rename(pattern: &str) -> RewriteTest {
        let recipe = ChangeMethodName::new(ChangeMethodNameOptions {
            method_pattern: pattern.to_owned(),
            new_method_name: "dispatch".to_owned(),
        })
        .expect("recipe");
        RewriteTest::new(Arc::new(recipe)).with_stubs(&[CLIENT])
    }

    #[test]
    fn renames_only_the_matching_overload() {
        rename("com.acme.Client send(int)").rewrite_run(&[after(
            "src/Job.java",
            "import com.acme.Client;\n\nclass Job {\n    void run(Client client) {\n        client.send(1);\n        client.send(\"x\");\n    }\n}\n",
            "import com.acme.Client;\n\nclass Job {\n    void run(Client client) {\n        client.dispatch(1);\n        client.send(\"x\");\n    }\n}\n",
        )]);
    }

    #[test]
    fn renames_declarations_in_the_matched_type() {
        rename("com.acme.Worker work(..)").rewrite_run(&[after(
            "src/com/acme/Worker.java",
            "package com.acme;\n\nclass Worker {\n    void work() {\n        work();\n    }\n}\n",
            "package com.acme;\n\nclass Worker {\n    void dispatch() {\n        dispatch();\n    }\n}\n",
        )]);
    }

    #[rstest]
    #[case("1abc")]
    #[case("")]
    #[case("has space")]
    fn rejects_names_that_are_not_identifiers(#[case] name: &str) {
        let err = ChangeMethodName::new(ChangeMethodNameOptions {
            method_pattern: "com.acme.Client send(..)".to_owned(),
            new_method_name: name.to_owned(),
        })
        .err()
        .expect("invalid name");
        assert!(matches!(err, RecipeError::InvalidOption { .. }));
    }
}
