//! Marks calls to matching methods with search results.

use std::sync::Arc;

use graft_core::{
    Accumulator, AllPreconditions, Cursor, ExecutionContext, Marker, Node, Recipe, RecipeError,
    TreeVisitor, check,
};
use graft_java::{JavaVisitor, MethodMatcher, UsesMethod, java, visit_children};
use serde::{Deserialize, Serialize};

use super::invalid_pattern;

/// Options for [`FindMethods`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FindMethodsOptions {
    /// Required. Calls to find, e.g. `java.util.List add(..)`.
    pub method_pattern: String,
}

/// Attaches a search result marker to every matching invocation and
/// instance creation. The printed source does not change.
pub struct FindMethods {
    options: FindMethodsOptions,
    matcher: MethodMatcher,
}

impl FindMethods {
    /// Registered recipe name.
    pub const NAME: &'static str = "graft.java.search.FindMethods";

    /// Builds the recipe.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::InvalidOption`] for a malformed pattern.
    pub fn new(options: FindMethodsOptions) -> Result<Self, RecipeError> {
        let matcher = MethodMatcher::new(&options.method_pattern)
            .map_err(|err| invalid_pattern(Self::NAME, "methodPattern", &err))?;
        Ok(Self { options, matcher })
    }
}

impl Recipe for FindMethods {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "Find method usages"
    }

    fn editor<'a>(&'a self, _acc: Option<&'a Accumulator>) -> Option<Box<dyn TreeVisitor + 'a>> {
        let uses = AllPreconditions::new(vec![Box::new(UsesMethod::new(self.matcher.clone()))]);
        Some(check(uses, java(MarkCalls { recipe: self })))
    }
}

struct MarkCalls<'a> {
    recipe: &'a FindMethods,
}

impl MarkCalls<'_> {
    fn mark(&self, original: &Node, visited: Arc<Node>) -> Arc<Node> {
        if visited.markers().has_search_result() || !self.recipe.matcher.matches_node(original) {
            return visited;
        }
        let marker = Marker::search_result(Some(self.recipe.options.method_pattern.clone()));
        Arc::new(visited.with_marker(marker))
    }
}

impl JavaVisitor for MarkCalls<'_> {
    fn name(&self) -> &str {
        FindMethods::NAME
    }

    fn visit_method_invocation(
        &mut self,
        cursor: &Cursor<'_>,
        ctx: &mut ExecutionContext,
    ) -> Arc<Node> {
        let visited = visit_children(self, cursor, ctx);
        self.mark(cursor.value(), visited)
    }

    fn visit_new_class(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        let visited = visit_children(self, cursor, ctx);
        self.mark(cursor.value(), visited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RewriteTest;

    #[test]
    fn marks_each_matching_call_once() {
        let recipe = FindMethods::new(FindMethodsOptions {
            method_pattern: "java.util.Collection add(..)".to_owned(),
        })
        .expect("recipe");
        let source = "import java.util.List;\n\nclass Job {\n    void run(List<String> names) {\n        names.add(\"a\");\n        names.size();\n        names.add(\"b\");\n    }\n}\n";
        let run = RewriteTest::new(Arc::new(recipe)).run(&[("src/Job.java", source)]);

        let result = run.results().first().expect("one result");
        assert!(result.has_changes());
        assert_eq!(result.after().print(), source);
        assert_eq!(result.after().search_results(), 2);
        assert!(run.is_converged());
    }
}
