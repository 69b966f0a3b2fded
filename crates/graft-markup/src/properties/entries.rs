//! Reading and editing properties entries.

use std::sync::Arc;

use graft_core::Node;

use super::escape::{escape_key, escape_value, unescape};
use super::parser::ENTRY;

/// Returns whether `node` is a properties entry.
#[must_use]
pub fn is_property(node: &Node) -> bool {
    node.is(ENTRY) && node.child_by_field("separator").is_some()
}

fn field_text<'a>(entry: &'a Node, field: &str) -> Option<&'a str> {
    entry.child_by_field(field).and_then(|token| token.text())
}

/// Returns the decoded key of an entry.
#[must_use]
pub fn entry_key(entry: &Node) -> Option<String> {
    field_text(entry, "key").and_then(|raw| unescape(raw).ok())
}

/// Returns the decoded value of an entry.
#[must_use]
pub fn entry_value(entry: &Node) -> Option<String> {
    field_text(entry, "value").and_then(|raw| unescape(raw).ok())
}

fn with_field_text(entry: &Node, field: &str, text: String) -> Node {
    let Some(index) = entry
        .children()
        .iter()
        .position(|child| child.field() == Some(field))
    else {
        return entry.clone();
    };
    let Some(token) = entry.children().get(index) else {
        return entry.clone();
    };
    entry.with_child(index, Arc::new(token.with_text(text)))
}

/// Returns a copy of `entry` holding `value`.
#[must_use]
pub fn with_value(entry: &Node, value: &str) -> Node {
    with_field_text(entry, "value", escape_value(value))
}

/// Returns a copy of `entry` renamed to `key`.
#[must_use]
pub fn with_key(entry: &Node, key: &str) -> Node {
    with_field_text(entry, "key", escape_key(key))
}
