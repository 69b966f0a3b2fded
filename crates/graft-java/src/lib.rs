//! Java support for the graft rewrite engine.
//!
//! Parsing goes through Tree-sitter into graft's lossless tree. On top of
//! that this crate provides:
//!
//! - a [`Classpath`] model and [`JavaAttributor`], which resolve names,
//!   expression types and method overloads
//! - matchers: [`MethodMatcher`], [`AnnotationMatcher`], [`TypePattern`],
//!   and the [`UsesType`] and [`UsesMethod`] preconditions
//! - [`JavaVisitor`] with one hook per construct
//! - [`JavaTemplate`] for splicing snippets into trees
//! - import maintenance: [`AddImport`], [`RemoveImport`] and the
//!   `maybe_*` helpers that queue them as follow-up visits

pub mod attribution;
pub mod classpath;
mod error;
pub mod format;
mod imports;
mod kind;
pub mod matchers;
mod names;
mod parser;
pub mod syntax;
mod template;
mod visitor;

pub use attribution::{JavaAttributor, value_type};
pub use classpath::{ClassInfo, ClassLookup, Classpath, FieldInfo, MethodInfo};
pub use error::{JavaError, TemplateError};
pub use imports::{
    AddImport, RemoveImport, maybe_add_import, maybe_add_static_import, maybe_remove_import,
};
pub use kind::{JavaKind, is_literal, is_type_declaration, is_type_node};
pub use matchers::{AnnotationMatcher, MethodMatcher, TypePattern, UsesMethod, UsesType};
pub use names::{ImportScope, is_primitive};
pub use parser::{COLLAPSED_KINDS, JavaParser, parse_java};
pub use template::{Coordinates, JavaTemplate, JavaTemplateBuilder, SnippetContext, TemplateArg};
pub use visitor::{Java, JavaVisitor, dispatch, java, visit_children};

#[cfg(test)]
mod tests;
