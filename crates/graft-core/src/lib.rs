//! Core of the graft rewrite engine.
//!
//! This crate holds everything that does not depend on a particular
//! language:
//!
//! - the immutable, lossless syntax tree ([`Node`], [`SourceFile`]) and its
//!   conversion from Tree-sitter ([`lossless`])
//! - traversal [`Cursor`]s and the [`TreeVisitor`] trait
//! - matcher and precondition traits ([`TreeMatcher`], [`Precondition`])
//! - recipes ([`Recipe`], [`ScanningRecipe`]) and the [`RecipeRunner`] that
//!   drives scan, generate and edit cycles to a fixed point
//! - diagnostics, configuration and telemetry
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use graft_core::{Recipe, RecipeRunner, RunConfig};
//!
//! fn run(recipe: Arc<dyn Recipe>, files: Vec<Arc<graft_core::SourceFile>>) {
//!     let runner = RecipeRunner::new(RunConfig::default());
//!     let run = runner.run(&recipe, files).expect("valid recipe");
//!     for result in run.changed() {
//!         let _ = result.after().print();
//!     }
//! }
//! ```

mod config;
mod context;
mod cursor;
mod diagnostic;
mod error;
mod language;
pub mod lossless;
mod matcher;
pub mod position;
mod recipe;
mod runtime;
pub mod telemetry;
mod tree;
mod visitor;

pub use config::{ConfigError, GraftConfig, LogFormat, LoggingConfig, RunConfig};
pub use context::{AfterVisit, ExecutionContext};
pub use cursor::Cursor;
pub use diagnostic::{Diagnostic, DiagnosticCode, DiagnosticReport, SourceLocation};
pub use error::{ParseError, RecipeError};
pub use language::{Language, LanguageParseError};
pub use matcher::{
    AllOf, AllPreconditions, AnyOf, AnyPrecondition, Checked, Not, NotPrecondition, Precondition,
    TreeMatcher, all_of, any_node_matches, any_of, check, not,
};
pub use recipe::{Accumulator, Recipe, Scanning, ScanningRecipe};
pub use runtime::{FileResult, RecipeRun, RecipeRunner, TypeAttributor};
pub use tree::{
    Body, Descendants, Marker, Markers, MethodType, Node, NodeId, SourceFile, TypeAttribution,
    TypeHandle, TypeKind, simple_name,
};
pub use visitor::{ScopedVisitor, TreeVisitor, visit_file, walk_children, walk_children_with};

#[cfg(test)]
mod tests;
