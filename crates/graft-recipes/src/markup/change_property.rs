//! Renames Spring-style property keys and changes their values in YAML and
//! properties files.

use std::sync::Arc;

use graft_core::{
    Accumulator, Cursor, ExecutionContext, Node, Recipe, RecipeError, TreeMatcher, TreeVisitor,
};
use graft_markup::PropertyKeyMatcher;
use graft_markup::properties::{self, PropertiesVisitor};
use graft_markup::yaml::{self, YamlVisitor};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{PerFormat, invalid_path, literal_key};

const fn relaxed_by_default() -> bool {
    true
}

/// Options for [`ChangePropertyKey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChangePropertyKeyOptions {
    /// Required. The key to rename, e.g. `management.metrics.binders.files.enabled`.
    pub old_property_key: String,
    /// Required. The new key, e.g. `management.metrics.enable.process.files`.
    pub new_property_key: String,
    /// Optional, default `true`. Compare keys ignoring case, dashes and
    /// underscores.
    #[serde(default = "relaxed_by_default")]
    pub relaxed_binding: bool,
}

/// Renames a property key.
///
/// In YAML only the last segment of the key can move: a nested entry whose
/// parent path differs from the new key's prefix is left alone with a
/// warning.
pub struct ChangePropertyKey {
    options: ChangePropertyKeyOptions,
    matcher: PropertyKeyMatcher,
}

impl ChangePropertyKey {
    /// Registered recipe name.
    pub const NAME: &'static str = "graft.properties.ChangePropertyKey";

    /// Builds the recipe.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::InvalidOption`] for empty or glob keys, or
    /// when both keys are equal.
    pub fn new(options: ChangePropertyKeyOptions) -> Result<Self, RecipeError> {
        literal_key(Self::NAME, "oldPropertyKey", &options.old_property_key)?;
        literal_key(Self::NAME, "newPropertyKey", &options.new_property_key)?;
        if options.old_property_key == options.new_property_key {
            return Err(RecipeError::invalid_option(
                Self::NAME,
                "newPropertyKey",
                "the new key equals the old key",
            ));
        }
        let matcher = PropertyKeyMatcher::with_relaxed_binding(
            &options.old_property_key,
            options.relaxed_binding,
        )
        .map_err(|err| invalid_path(Self::NAME, "oldPropertyKey", &err))?;
        Ok(Self { options, matcher })
    }

    /// Returns the part of the new key written under `parent`, the dotted
    /// path of the mapping holding the entry.
    fn relative_key(&self, parent: &str) -> Option<String> {
        let new_key = self.options.new_property_key.as_str();
        if parent.is_empty() {
            return Some(new_key.to_owned());
        }
        new_key
            .char_indices()
            .filter(|(_, c)| *c == '.')
            .find_map(|(at, _)| {
                let prefix = new_key.get(..at)?;
                let rest = new_key.get(at + 1..)?;
                PropertyKeyMatcher::with_relaxed_binding(prefix, self.options.relaxed_binding)
                    .ok()
                    .filter(|matcher| matcher.matches_key(parent))
                    .map(|_| rest.to_owned())
            })
    }
}

impl Recipe for ChangePropertyKey {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "Change property key"
    }

    fn description(&self) -> &str {
        "Renames a property key in YAML and properties files."
    }

    fn editor<'a>(&'a self, _acc: Option<&'a Accumulator>) -> Option<Box<dyn TreeVisitor + 'a>> {
        Some(Box::new(PerFormat {
            name: Self::NAME,
            yaml: yaml::yaml(RenameKey { recipe: self }),
            properties: properties::properties(RenameKey { recipe: self }),
        }))
    }
}

struct RenameKey<'a> {
    recipe: &'a ChangePropertyKey,
}

impl YamlVisitor for RenameKey<'_> {
    fn name(&self) -> &str {
        ChangePropertyKey::NAME
    }

    fn visit_entry(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        let visited = yaml::visit_children(self, cursor, ctx);
        if !self.recipe.matcher.matches(cursor) {
            return visited;
        }
        let path = yaml::path_of(cursor);
        let parent = yaml::dotted_key(path.get(..path.len().saturating_sub(1)).unwrap_or_default());
        let Some(relative) = self.recipe.relative_key(&parent) else {
            ctx.warn(format!(
                "{} cannot move `{}` out of `{parent}`; rename it by hand",
                ChangePropertyKey::NAME,
                yaml::dotted_key(&path),
            ));
            return visited;
        };
        if yaml::entry_key(&visited).as_deref() == Some(relative.as_str()) {
            return visited;
        }
        debug!(path = %ctx.source_path(), key = %relative, "renaming yaml key");
        Arc::new(yaml::with_entry_key(&visited, &relative))
    }
}

impl PropertiesVisitor for RenameKey<'_> {
    fn name(&self) -> &str {
        ChangePropertyKey::NAME
    }

    fn visit_entry(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        let entry = cursor.value();
        let new_key = self.recipe.options.new_property_key.as_str();
        if !self.recipe.matcher.matches(cursor)
            || properties::entry_key(entry).as_deref() == Some(new_key)
        {
            return Arc::clone(entry);
        }
        debug!(path = %ctx.source_path(), key = new_key, "renaming property");
        Arc::new(properties::with_key(entry, new_key))
    }
}

/// Options for [`ChangePropertyValue`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ChangePropertyValueOptions {
    /// Required. Key pattern, e.g. `server.port` or `logging.level.*`.
    pub property_key: String,
    /// Required. The value to set.
    pub new_value: String,
    /// Optional. Only entries currently holding this value change.
    #[serde(default)]
    pub old_value: Option<String>,
    /// Optional, default `true`. Compare keys ignoring case, dashes and
    /// underscores.
    #[serde(default = "relaxed_by_default")]
    pub relaxed_binding: bool,
}

/// Sets the scalar value of matching keys, keeping quoting and comments.
pub struct ChangePropertyValue {
    options: ChangePropertyValueOptions,
    matcher: PropertyKeyMatcher,
}

impl ChangePropertyValue {
    /// Registered recipe name.
    pub const NAME: &'static str = "graft.properties.ChangePropertyValue";

    /// Builds the recipe.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::InvalidOption`] for an empty key pattern.
    pub fn new(options: ChangePropertyValueOptions) -> Result<Self, RecipeError> {
        let matcher =
            PropertyKeyMatcher::with_relaxed_binding(&options.property_key, options.relaxed_binding)
                .map_err(|err| invalid_path(Self::NAME, "propertyKey", &err))?;
        Ok(Self { options, matcher })
    }

    fn wants(&self, current: Option<&str>) -> bool {
        let Some(current) = current else {
            return false;
        };
        current != self.options.new_value
            && self
                .options
                .old_value
                .as_deref()
                .is_none_or(|old| old == current)
    }
}

impl Recipe for ChangePropertyValue {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn display_name(&self) -> &str {
        "Change property value"
    }

    fn description(&self) -> &str {
        "Sets the value of matching keys in YAML and properties files."
    }

    fn editor<'a>(&'a self, _acc: Option<&'a Accumulator>) -> Option<Box<dyn TreeVisitor + 'a>> {
        Some(Box::new(PerFormat {
            name: Self::NAME,
            yaml: yaml::yaml(SetValue { recipe: self }),
            properties: properties::properties(SetValue { recipe: self }),
        }))
    }
}

struct SetValue<'a> {
    recipe: &'a ChangePropertyValue,
}

impl YamlVisitor for SetValue<'_> {
    fn name(&self) -> &str {
        ChangePropertyValue::NAME
    }

    fn visit_entry(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        let entry = cursor.value();
        if !self.recipe.matcher.matches(cursor) {
            return yaml::visit_children(self, cursor, ctx);
        }
        if !self.recipe.wants(yaml::entry_scalar(entry).as_deref()) {
            return Arc::clone(entry);
        }
        Arc::new(yaml::with_entry_value(entry, &self.recipe.options.new_value))
    }
}

impl PropertiesVisitor for SetValue<'_> {
    fn name(&self) -> &str {
        ChangePropertyValue::NAME
    }

    fn visit_entry(&mut self, cursor: &Cursor<'_>, _ctx: &mut ExecutionContext) -> Arc<Node> {
        let entry = cursor.value();
        if !self.recipe.matcher.matches(cursor)
            || !self.recipe.wants(properties::entry_value(entry).as_deref())
        {
            return Arc::clone(entry);
        }
        Arc::new(properties::with_value(entry, &self.recipe.options.new_value))
    }
}
