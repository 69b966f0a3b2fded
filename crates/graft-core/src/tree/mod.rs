//! Immutable, lossless syntax tree shared by every language.
//!
//! A tree is made of [`Node`]s held behind [`Arc`](std::sync::Arc)s. Every
//! node owns the whitespace and comments that precede it (its *prefix*), so
//! printing a tree reproduces the original text byte for byte. Edits are
//! pure: `with_*` methods return a new node that shares untouched children
//! with the original and keeps its [`NodeId`].

mod markers;
mod node;
mod source_file;
mod types;

pub use markers::{Marker, Markers};
pub use node::{Body, Descendants, Node, NodeId};
pub use source_file::SourceFile;
pub use types::{MethodType, TypeAttribution, TypeHandle, TypeKind, simple_name};
