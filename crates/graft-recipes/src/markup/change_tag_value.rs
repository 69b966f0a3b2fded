//! Sets the text of XML elements selected by an XPath.

use std::sync::Arc;

use graft_core::{
    Accumulator, Cursor, ExecutionContext, Node, Recipe, RecipeError, TreeMatcher, TreeVisitor,
};
use graft_markup::xml::{self, XPathMatcher, XmlVisitor};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::invalid_path;

/// Options for [`ChangeTagValue`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChangeTagValueOptions {
    /// Required. XPath of the elements, e.g. `/project/properties/java.version`.
    pub element_name: String,
    /// Required. The text to set.
    pub new_value: String,
    /// Optional. Only elements currently holding this text change.
    #[serde(default)]
    pub old_value: Option<String>,
}

/// Replaces the character data of matching elements.
pub struct ChangeTagValue {
    options: ChangeTagValueOptions,
    matcher: XPathMatcher,
}

impl ChangeTagValue {
    /// Registered recipe name.
    pub const NAME: &'static str = "graft.xml.ChangeTagValue";

    /// Builds the recipe.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::InvalidOption`] for an unsupported XPath.
    pub fn new(options: ChangeTagValueOptions) -> Result<Self, RecipeError> {
        let matcher = XPathMatcher::new(&options.element_name)
            .map_err(|err| invalid_path(Self::NAME, "elementName", &err))?;
        Ok(Self { options, matcher })
    }
}

impl Recipe for ChangeTagValue {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "Change XML tag value"
    }

    fn description(&self) -> &str {
        "Sets the text of every element an XPath selects."
    }

    fn editor<'a>(&'a self, _acc: Option<&'a Accumulator>) -> Option<Box<dyn TreeVisitor + 'a>> {
        Some(xml::xml(SetText { recipe: self }))
    }
}

struct SetText<'a> {
    recipe: &'a ChangeTagValue,
}

impl XmlVisitor for SetText<'_> {
    fn name(&self) -> &str {
        ChangeTagValue::NAME
    }

    fn visit_tag(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        let options = &self.recipe.options;
        if !self.recipe.matcher.matches(cursor) {
            return xml::visit_children(self, cursor, ctx);
        }
        let element = cursor.value();
        let current = xml::text(element);
        let expected = options.old_value.as_ref().is_none_or(|old| *old == current);
        if !expected || current == options.new_value {
            return Arc::clone(element);
        }
        debug!(
            path = %ctx.source_path(),
            from = %current,
            to = %options.new_value,
            "changing tag value"
        );
        Arc::new(xml::with_text(element, &options.new_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RewriteTest, after, unchanged};
    use rstest::rstest;

    const POM: &str = "<project>\n  <properties>\n    <java.version>17</java.version>\n  </properties>\n  <version/>\n</project>\n";

    fn change(element: &str, new_value: &str, old_value: Option<&str>) -> RewriteTest {
        let recipe = ChangeTagValue::new(ChangeTagValueOptions {
            element_name: element.to_owned(),
            new_value: new_value.to_owned(),
            old_value: old_value.map(str::to_owned),
        })
        .expect("recipe");
        RewriteTest::new(Arc::new(recipe))
    }

    #[rstest]
    #[case::any_value(None)]
    #[case::expected_value(Some("17"))]
    fn sets_the_text(#[case] old_value: Option<&str>) {
        change("/project/properties/java.version", "21", old_value).rewrite_run(&[after(
            "pom.xml",
            POM,
            "<project>\n  <properties>\n    <java.version>21</java.version>\n  </properties>\n  <version/>\n</project>\n",
        )]);
    }

    #[test]
    fn expands_self_closing_elements() {
        change("/project/version", "1.0", None).rewrite_run(&[after(
            "pom.xml",
            POM,
            "<project>\n  <properties>\n    <java.version>17</java.version>\n  </properties>\n  <version>1.0</version>\n</project>\n",
        )]);
    }

    #[rstest]
    #[case::other_old_value("/project/properties/java.version", Some("11"))]
    #[case::no_such_element("/project/name", None)]
    fn leaves_unmatched_documents_alone(#[case] element: &str, #[case] old_value: Option<&str>) {
        change(element, "21", old_value).rewrite_run(&[unchanged("pom.xml", POM)]);
    }
}
