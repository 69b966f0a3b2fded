//! Built-in recipes and the catalog that configures them.
//!
//! The recipes cover Java sources ([`java`]), XML, YAML and properties
//! files ([`markup`]) and Maven builds ([`maven`]). [`RecipeRegistry`]
//! builds any of them from a name and a JSON options object and loads
//! composite recipes declared in YAML. [`parse_source`] turns file text
//! into a [`graft_core::SourceFile`] for the runner.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use camino::Utf8Path;
//! use graft_core::{RecipeRunner, RunConfig};
//! use graft_java::{Classpath, JavaAttributor};
//! use graft_recipes::{RecipeRegistry, parse_sources};
//! use serde_json::json;
//!
//! let classpath = Arc::new(Classpath::jdk());
//! let recipe = RecipeRegistry::with_catalog()
//!     .create("graft.java.ChangeType", json!({
//!         "oldFullyQualifiedTypeName": "com.acme.OldClient",
//!         "newFullyQualifiedTypeName": "com.acme.NewClient",
//!     }))
//!     .expect("valid options");
//! let (files, _skipped) = parse_sources(
//!     [(Utf8Path::new("src/Job.java"), "class Job {}\n")],
//!     &classpath,
//! );
//! let run = RecipeRunner::new(RunConfig::default())
//!     .with_attributor(Arc::new(JavaAttributor::new(classpath)))
//!     .run(&recipe, files)
//!     .expect("recipe validates");
//! assert_eq!(run.changed().count(), 0);
//! ```

mod error;
pub mod java;
pub mod markup;
pub mod maven;
mod registry;
mod sources;
#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use error::{CatalogError, MetadataError, SourceError};
pub use registry::{DeclarativeRecipe, RECIPE_DOCUMENT_TYPE, RecipeFactory, RecipeRegistry};
pub use sources::{parse_source, parse_sources};

#[cfg(test)]
mod tests;
