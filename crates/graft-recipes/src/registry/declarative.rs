//! Composite recipes declared in YAML.
//!
//! ```yaml
//! type: specs.openrewrite.org/v1beta/recipe
//! name: com.acme.UpgradeClients
//! displayName: Upgrade clients
//! recipeList:
//!   - graft.java.AddTimeUnitArgument:
//!       methodPattern: com.acme.Client send(int)
//!   - com.acme.OtherComposite
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use graft_core::Recipe;
use serde::Deserialize;

use crate::error::CatalogError;

/// The only document type accepted.
pub const RECIPE_DOCUMENT_TYPE: &str = "specs.openrewrite.org/v1beta/recipe";

/// A named list of recipes applied in order.
pub struct DeclarativeRecipe {
    name: String,
    display_name: String,
    description: String,
    recipes: Vec<Arc<dyn Recipe>>,
}

impl DeclarativeRecipe {
    /// Creates a composite from already-built recipes.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
        recipes: Vec<Arc<dyn Recipe>>,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            description: description.into(),
            recipes,
        }
    }
}

impl Recipe for DeclarativeRecipe {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn recipe_list(&self) -> Vec<Arc<dyn Recipe>> {
        self.recipes.clone()
    }
}

/// One YAML recipe document before its references are resolved.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct RecipeDocument {
    #[serde(rename = "type")]
    pub(crate) kind: String,
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) display_name: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) recipe_list: Vec<RecipeEntry>,
}

/// A `recipeList` item: a bare name or a single-key map of options.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum RecipeEntry {
    Name(String),
    Configured(HashMap<String, serde_json::Value>),
}

impl RecipeEntry {
    pub(crate) fn into_parts(self) -> Result<(String, serde_json::Value), CatalogError> {
        match self {
            Self::Name(name) => Ok((name, serde_json::Value::Null)),
            Self::Configured(map) => {
                let mut entries = map.into_iter();
                match (entries.next(), entries.next()) {
                    (Some((name, options)), None) => Ok((name, options)),
                    _ => Err(CatalogError::document(
                        "a configured recipeList entry must have exactly one key",
                    )),
                }
            }
        }
    }
}

/// Splits a multi-document YAML stream on `---` lines and parses each
/// non-empty document.
pub(crate) fn parse_documents(yaml: &str) -> Result<Vec<RecipeDocument>, CatalogError> {
    let mut chunks = vec![String::new()];
    for line in yaml.split_inclusive('\n') {
        if line.trim_end() == "---" {
            chunks.push(String::new());
        } else if let Some(current) = chunks.last_mut() {
            current.push_str(line);
        }
    }
    chunks
        .iter()
        .filter(|chunk| {
            chunk
                .lines()
                .any(|line| !line.trim().is_empty() && !line.trim_start().starts_with('#'))
        })
        .map(|chunk| {
            let document: RecipeDocument = serde_saphyr::from_str(chunk)
                .map_err(|err| CatalogError::document(err.to_string()))?;
            if document.kind != RECIPE_DOCUMENT_TYPE {
                return Err(CatalogError::document(format!(
                    "unsupported document type `{}` for {}",
                    document.kind, document.name
                )));
            }
            Ok(document)
        })
        .collect()
}
