//! Recipe registry: building recipes from names and options.
//!
//! The [`RecipeRegistry`] maps recipe names to factories that deserialise
//! an options object into a configured recipe. Composite recipes loaded
//! from YAML documents are registered alongside and can refer to built-in
//! recipes and to each other. Duplicate names are rejected.

mod declarative;

pub use declarative::{DeclarativeRecipe, RECIPE_DOCUMENT_TYPE};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use graft_core::{Recipe, RecipeError, RunConfig, Scanning};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::CatalogError;
use crate::java::{
    AddAutoConfigureTestRestTemplate, AddClassAnnotation, AddTimeUnitArgument, ChangeMethodName,
    ChangeType, FindMethods,
};
use crate::markup::{ChangePropertyKey, ChangePropertyValue, ChangeTagValue};
use crate::maven::{
    CachedMetadataSource, MetadataSource, StaticMetadataSource, UpgradeDependencyVersion,
    UpgradeDependencyVersionOptions,
};
use declarative::{RecipeDocument, parse_documents};

/// Builds a recipe from its options.
pub type RecipeFactory = fn(Value, &RecipeRegistry) -> Result<Arc<dyn Recipe>, CatalogError>;

/// Registry of recipe factories and declared composites.
///
/// # Example
///
/// ```
/// use graft_recipes::RecipeRegistry;
/// use serde_json::json;
///
/// let registry = RecipeRegistry::with_catalog();
/// let recipe = registry
///     .create(
///         "graft.java.AddTimeUnitArgument",
///         json!({ "methodPattern": "com.acme.Client send(int)" }),
///     )
///     .expect("valid options");
/// assert_eq!(recipe.name(), "graft.java.AddTimeUnitArgument");
/// ```
pub struct RecipeRegistry {
    factories: HashMap<String, RecipeFactory>,
    declared: HashMap<String, Arc<DeclarativeRecipe>>,
    metadata: Arc<dyn MetadataSource>,
    scan_retries: u32,
}

impl fmt::Debug for RecipeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut factories: Vec<&String> = self.factories.keys().collect();
        factories.sort();
        let mut declared: Vec<&String> = self.declared.keys().collect();
        declared.sort();
        f.debug_struct("RecipeRegistry")
            .field("factories", &factories)
            .field("declared", &declared)
            .finish_non_exhaustive()
    }
}

impl Default for RecipeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn options<T: DeserializeOwned>(name: &str, value: Value) -> Result<T, CatalogError> {
    let object = if value.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        value
    };
    serde_json::from_value(object).map_err(|err| CatalogError::options(name, err.to_string()))
}

fn no_options(name: &str, value: &Value) -> Result<(), CatalogError> {
    let empty = value.is_null() || value.as_object().is_some_and(serde_json::Map::is_empty);
    if empty {
        Ok(())
    } else {
        Err(CatalogError::options(name, "this recipe takes no options"))
    }
}

impl RecipeRegistry {
    /// Creates an empty registry whose metadata source knows no artifacts.
    #[must_use]
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
            declared: HashMap::new(),
            metadata: Arc::new(StaticMetadataSource::new()),
            scan_retries: RunConfig::default().scan_retries(),
        }
    }

    /// Creates a registry holding every built-in recipe.
    #[must_use]
    pub fn with_catalog() -> Self {
        let mut registry = Self::new();
        let built_in: [(&str, RecipeFactory); 10] = [
            (AddTimeUnitArgument::NAME, |value, _| {
                let recipe = AddTimeUnitArgument::new(options(AddTimeUnitArgument::NAME, value)?)?;
                Ok(Arc::new(recipe))
            }),
            (AddClassAnnotation::NAME, |value, _| {
                let recipe = AddClassAnnotation::new(options(AddClassAnnotation::NAME, value)?)?;
                Ok(Arc::new(recipe))
            }),
            (AddAutoConfigureTestRestTemplate::NAME, |value, _| {
                no_options(AddAutoConfigureTestRestTemplate::NAME, &value)?;
                Ok(Arc::new(AddAutoConfigureTestRestTemplate::recipe()?))
            }),
            (ChangeMethodName::NAME, |value, _| {
                let recipe = ChangeMethodName::new(options(ChangeMethodName::NAME, value)?)?;
                Ok(Arc::new(recipe))
            }),
            (ChangeType::NAME, |value, _| {
                Ok(Arc::new(ChangeType::new(options(ChangeType::NAME, value)?)?))
            }),
            (FindMethods::NAME, |value, _| {
                Ok(Arc::new(FindMethods::new(options(FindMethods::NAME, value)?)?))
            }),
            (ChangeTagValue::NAME, |value, _| {
                Ok(Arc::new(ChangeTagValue::new(options(ChangeTagValue::NAME, value)?)?))
            }),
            (ChangePropertyKey::NAME, |value, _| {
                let recipe = ChangePropertyKey::new(options(ChangePropertyKey::NAME, value)?)?;
                Ok(Arc::new(recipe))
            }),
            (ChangePropertyValue::NAME, |value, _| {
                let recipe = ChangePropertyValue::new(options(ChangePropertyValue::NAME, value)?)?;
                Ok(Arc::new(recipe))
            }),
            (UpgradeDependencyVersion::NAME, |value, registry| {
                let mut configured: UpgradeDependencyVersionOptions =
                    options(UpgradeDependencyVersion::NAME, value)?;
                configured.retries = configured.retries.or(Some(registry.scan_retries));
                let recipe = UpgradeDependencyVersion::new(configured, registry.metadata())?;
                Ok(Arc::new(Scanning(recipe)))
            }),
        ];
        for (name, factory) in built_in {
            registry.factories.insert(name.to_owned(), factory);
        }
        registry
    }

    /// Replaces the metadata source handed to dependency recipes. Successful
    /// lookups are cached for the life of the registry.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Arc<dyn MetadataSource>) -> Self {
        self.metadata = Arc::new(CachedMetadataSource::new(metadata));
        self
    }

    /// Takes the default metadata retry count from `config`.
    #[must_use]
    pub const fn with_run_config(mut self, config: &RunConfig) -> Self {
        self.scan_retries = config.scan_retries();
        self
    }

    /// Returns the metadata source handed to dependency recipes.
    #[must_use]
    pub fn metadata(&self) -> Arc<dyn MetadataSource> {
        Arc::clone(&self.metadata)
    }

    /// Registers a factory under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Duplicate`] when `name` is taken.
    pub fn register(&mut self, name: &str, factory: RecipeFactory) -> Result<(), CatalogError> {
        if self.contains(name) {
            return Err(CatalogError::Duplicate {
                name: name.to_owned(),
            });
        }
        self.factories.insert(name.to_owned(), factory);
        Ok(())
    }

    /// Returns whether a recipe called `name` is known.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name) || self.declared.contains_key(name)
    }

    /// Builds the recipe called `name` from `options`. Declared composites
    /// take no options; pass `Value::Null`.
    ///
    /// # Errors
    ///
    /// Returns [`RecipeError::UnknownRecipe`] (wrapped) for unknown names,
    /// [`CatalogError::Options`] when the options do not fit and the
    /// recipe's own error when it rejects them.
    pub fn create(&self, name: &str, options: Value) -> Result<Arc<dyn Recipe>, CatalogError> {
        if let Some(declared) = self.declared.get(name) {
            no_options(name, &options)?;
            return Ok(Arc::clone(declared) as Arc<dyn Recipe>);
        }
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| RecipeError::unknown_recipe(name))?;
        debug!(recipe = name, "building recipe");
        factory(options, self)
    }

    /// Loads every recipe document in a YAML stream and registers the
    /// composites. Documents may refer to each other in any order.
    ///
    /// Returns the names of the new recipes in document order.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] for malformed documents, duplicate names,
    /// reference cycles and entries that fail to build. Nothing is
    /// registered when any document fails.
    pub fn load_declarative(&mut self, yaml: &str) -> Result<Vec<String>, CatalogError> {
        let documents = parse_documents(yaml)?;
        let mut pending: HashMap<String, RecipeDocument> = HashMap::new();
        let mut order = Vec::with_capacity(documents.len());
        for document in documents {
            if self.contains(&document.name) || pending.contains_key(&document.name) {
                return Err(CatalogError::Duplicate {
                    name: document.name,
                });
            }
            order.push(document.name.clone());
            pending.insert(document.name.clone(), document);
        }

        let mut built: HashMap<String, Arc<DeclarativeRecipe>> = HashMap::new();
        for name in &order {
            self.build_declared(name, &pending, &mut built, &mut Vec::new())?;
        }
        self.declared.extend(built);
        debug!(recipes = ?order, "loaded declarative recipes");
        Ok(order)
    }

    fn build_declared(
        &self,
        name: &str,
        pending: &HashMap<String, RecipeDocument>,
        built: &mut HashMap<String, Arc<DeclarativeRecipe>>,
        stack: &mut Vec<String>,
    ) -> Result<Arc<DeclarativeRecipe>, CatalogError> {
        if let Some(done) = built.get(name) {
            return Ok(Arc::clone(done));
        }
        let Some(document) = pending.get(name) else {
            return Err(RecipeError::unknown_recipe(name).into());
        };
        if stack.iter().any(|entered| entered == name) {
            return Err(CatalogError::document(format!(
                "recipe {name} refers to itself through {}",
                stack.join(" -> ")
            )));
        }
        stack.push(name.to_owned());

        let mut recipes: Vec<Arc<dyn Recipe>> = Vec::with_capacity(document.recipe_list.len());
        for entry in document.recipe_list.clone() {
            let (child, child_options) = entry.into_parts()?;
            let recipe: Arc<dyn Recipe> = if pending.contains_key(&child) {
                no_options(&child, &child_options)?;
                self.build_declared(&child, pending, built, stack)?
            } else {
                self.create(&child, child_options)?
            };
            recipes.push(recipe);
        }
        stack.pop();

        let recipe = Arc::new(DeclarativeRecipe::new(
            name,
            document.display_name.clone().unwrap_or_else(|| name.to_owned()),
            document.description.clone().unwrap_or_default(),
            recipes,
        ));
        built.insert(name.to_owned(), Arc::clone(&recipe));
        Ok(recipe)
    }

    /// Returns the number of known recipes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len() + self.declared.len()
    }

    /// Returns `true` when no recipes are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty() && self.declared.is_empty()
    }

    /// Returns every known recipe name, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .factories
            .keys()
            .chain(self.declared.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests;
