//! Appends a `java.util.concurrent.TimeUnit` argument to matching calls.

use std::sync::Arc;

use graft_core::{
    Accumulator, AllPreconditions, Cursor, ExecutionContext, Node, Recipe, RecipeError,
    TreeVisitor, check,
};
use graft_java::{
    Coordinates, JavaTemplate, JavaVisitor, MethodMatcher, SnippetContext, TemplateArg, UsesMethod,
    java, visit_children,
};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::{invalid_pattern, skip_edit};

/// Constants of `java.util.concurrent.TimeUnit`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeUnit {
    /// `NANOSECONDS`
    Nanoseconds,
    /// `MICROSECONDS`
    Microseconds,
    /// `MILLISECONDS`
    #[default]
    Milliseconds,
    /// `SECONDS`
    Seconds,
    /// `MINUTES`
    Minutes,
    /// `HOURS`
    Hours,
    /// `DAYS`
    Days,
}

/// Options for [`AddTimeUnitArgument`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddTimeUnitArgumentOptions {
    /// Required. Single-argument calls to extend, e.g.
    /// `com.acme.Client send(int)`.
    pub method_pattern: String,
    /// Optional, default `MILLISECONDS`. The unit appended, e.g. `SECONDS`.
    #[serde(default)]
    pub time_unit: TimeUnit,
}

/// Turns `client.send(100)` into `client.send(100, TimeUnit.MILLISECONDS)`.
///
/// Only calls resolving to the matched overload change. Once rewritten, a
/// call resolves to the two-argument overload and no longer matches, which
/// makes the recipe idempotent.
pub struct AddTimeUnitArgument {
    options: AddTimeUnitArgumentOptions,
    matcher: MethodMatcher,
    template: JavaTemplate,
}

impl AddTimeUnitArgument {
    /// Registered recipe name.
    pub const NAME: &'static str = "graft.java.AddTimeUnitArgument";

    /// Builds the recipe.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::InvalidOption`] for a malformed method pattern.
    pub fn new(options: AddTimeUnitArgumentOptions) -> Result<Self, RecipeError> {
        let matcher = MethodMatcher::new(&options.method_pattern)
            .map_err(|err| invalid_pattern(Self::NAME, "methodPattern", &err))?;
        let template = JavaTemplate::builder("#{any(long)}, TimeUnit.#{}")
            .context(SnippetContext::Arguments)
            .imports(["java.util.concurrent.TimeUnit"])
            .build()
            .map_err(|err| RecipeError::configuration(Self::NAME, err.to_string()))?;
        Ok(Self {
            options,
            matcher,
            template,
        })
    }

    /// Returns the options the recipe was built from.
    #[must_use]
    pub const fn options(&self) -> &AddTimeUnitArgumentOptions {
        &self.options
    }
}

impl Recipe for AddTimeUnitArgument {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "Add a TimeUnit argument"
    }

    fn description(&self) -> &str {
        "Appends a TimeUnit constant to single-argument calls of a method whose \
         two-argument overload takes an explicit unit."
    }

    fn editor<'a>(&'a self, _acc: Option<&'a Accumulator>) -> Option<Box<dyn TreeVisitor + 'a>> {
        let uses = AllPreconditions::new(vec![Box::new(UsesMethod::new(self.matcher.clone()))]);
        Some(check(uses, java(AppendUnit { recipe: self })))
    }
}

struct AppendUnit<'a> {
    recipe: &'a AddTimeUnitArgument,
}

impl JavaVisitor for AppendUnit<'_> {
    fn name(&self) -> &str {
        AddTimeUnitArgument::NAME
    }

    fn visit_method_invocation(
        &mut self,
        cursor: &Cursor<'_>,
        ctx: &mut ExecutionContext,
    ) -> Arc<Node> {
        let visited = visit_children(self, cursor, ctx);
        if !self.recipe.matcher.matches_node(cursor.value()) {
            return visited;
        }
        let Some(argument) = only_argument(&visited) else {
            return visited;
        };
        let unit = self.recipe.options.time_unit.to_string();
        let args = [TemplateArg::from(argument), TemplateArg::from(unit)];
        let target = cursor.with_value(Arc::clone(&visited));
        match self
            .recipe
            .template
            .apply(&target, Coordinates::ReplaceArguments, &args, ctx)
        {
            Ok(rewritten) => rewritten,
            Err(err) => {
                skip_edit(ctx, AddTimeUnitArgument::NAME, &err);
                visited
            }
        }
    }
}

fn only_argument(invocation: &Node) -> Option<Arc<Node>> {
    let mut arguments = invocation.child_by_field("arguments")?.named_children();
    let first = arguments.next()?;
    arguments.next().is_none().then(|| Arc::clone(first))
}
