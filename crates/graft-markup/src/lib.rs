//! Markup and configuration formats for the graft rewrite engine.
//!
//! Each format lives in its own module with a parser producing lossless
//! [`graft_core::SourceFile`]s, a visitor trait with per-construct hooks,
//! helpers for reading and editing nodes, and a path matcher:
//!
//! - [`xml`]: elements, attributes and [`xml::XPathMatcher`]
//! - [`yaml`]: mappings, sequences, scalars and [`yaml::JsonPathMatcher`]
//! - [`properties`]: Java properties entries
//!
//! [`PropertyKeyMatcher`] selects Spring-style keys in both YAML and
//! properties files.

mod error;
mod key;
pub mod properties;
pub mod xml;
pub mod yaml;

pub use error::MarkupError;
pub use key::PropertyKeyMatcher;

#[cfg(test)]
mod tests;
