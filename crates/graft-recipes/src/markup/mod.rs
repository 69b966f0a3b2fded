//! Recipes for XML, YAML and properties files.

mod change_property;
mod change_tag_value;

pub use change_property::{
    ChangePropertyKey, ChangePropertyKeyOptions, ChangePropertyValue, ChangePropertyValueOptions,
};
pub use change_tag_value::{ChangeTagValue, ChangeTagValueOptions};

use std::sync::Arc;

use graft_core::{Cursor, ExecutionContext, Language, Node, RecipeError, SourceFile, TreeVisitor};
use graft_markup::MarkupError;

/// Routes each file to the visitor for its format.
struct PerFormat<'a> {
    name: &'a str,
    yaml: Box<dyn TreeVisitor + 'a>,
    properties: Box<dyn TreeVisitor + 'a>,
}

impl TreeVisitor for PerFormat<'_> {
    fn name(&self) -> &str {
        self.name
    }

    fn is_acceptable(&self, file: &SourceFile, ctx: &ExecutionContext) -> bool {
        self.yaml.is_acceptable(file, ctx) || self.properties.is_acceptable(file, ctx)
    }

    fn visit(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        match ctx.language() {
            Language::Yaml => self.yaml.visit(cursor, ctx),
            Language::Properties => self.properties.visit(cursor, ctx),
            Language::Java | Language::Xml => Arc::clone(cursor.value()),
        }
    }
}

fn invalid_path(recipe: &str, option: &str, err: &MarkupError) -> RecipeError {
    RecipeError::invalid_option(recipe, option, err.to_string())
}

/// Rejects keys that are empty or hold glob characters.
fn literal_key(recipe: &str, option: &str, key: &str) -> Result<(), RecipeError> {
    if key.trim().is_empty() || key.contains('*') {
        return Err(RecipeError::invalid_option(
            recipe,
            option,
            format!("`{key}` must be a literal property key"),
        ));
    }
    Ok(())
}
