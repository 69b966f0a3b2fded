//! Reading and editing YAML mappings, sequences and scalars.

use std::fmt;
use std::sync::Arc;

use graft_core::{Cursor, Node};

/// Grammar kinds of mapping entries.
pub const ENTRY_KINDS: &[&str] = &["block_mapping_pair", "flow_pair"];

const SCALAR_KINDS: &[&str] = &[
    "plain_scalar",
    "double_quote_scalar",
    "single_quote_scalar",
    "block_scalar",
];

/// One step of the path from a document to a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A mapping key.
    Key(String),
    /// A zero-based sequence index.
    Index(usize),
}

/// Returns whether `node` is a mapping entry.
#[must_use]
pub fn is_entry(node: &Node) -> bool {
    ENTRY_KINDS.contains(&node.kind())
}

/// Returns whether `node` is a scalar token.
#[must_use]
pub fn is_scalar(node: &Node) -> bool {
    SCALAR_KINDS.contains(&node.kind())
}

/// Returns the scalar a node holds, looking through node wrappers.
///
/// Mappings and sequences hold no scalar.
#[must_use]
pub fn scalar_in(node: &Node) -> Option<&Node> {
    if is_scalar(node) {
        return Some(node);
    }
    if node.is("flow_node") || node.is("block_node") {
        return node.named_children().find_map(|child| scalar_in(child));
    }
    None
}

/// Returns the decoded key of a mapping entry.
#[must_use]
pub fn entry_key(entry: &Node) -> Option<String> {
    entry
        .child_by_field("key")
        .and_then(|key| scalar_in(key))
        .map(scalar_value)
}

/// Returns the value node of a mapping entry.
#[must_use]
pub fn entry_value(entry: &Node) -> Option<&Arc<Node>> {
    entry.child_by_field("value")
}

/// Returns the decoded scalar value of a mapping entry, if it is a scalar.
#[must_use]
pub fn entry_scalar(entry: &Node) -> Option<String> {
    entry_value(entry)
        .and_then(|value| scalar_in(value))
        .map(scalar_value)
}

/// Decodes a scalar token into its value.
#[must_use]
pub fn scalar_value(scalar: &Node) -> String {
    let raw = scalar.print_trimmed();
    match scalar.kind() {
        "double_quote_scalar" => unescape_double(strip_pair(&raw, '"')),
        "single_quote_scalar" => strip_pair(&raw, '\'').replace("''", "'"),
        "block_scalar" => block_value(&raw),
        _ => raw.trim().to_owned(),
    }
}

fn strip_pair(raw: &str, quote: char) -> &str {
    raw.strip_prefix(quote)
        .and_then(|rest| rest.strip_suffix(quote))
        .unwrap_or(raw)
}

fn unescape_double(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn block_value(raw: &str) -> String {
    let mut lines = raw.lines();
    let _header = lines.next();
    let body: Vec<&str> = lines.collect();
    let indent = body
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start().len())
        .min()
        .unwrap_or(0);
    body.iter()
        .map(|line| line.get(indent..).unwrap_or_default())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Returns whether a value must be quoted to stay a plain string.
fn needs_quotes(value: &str) -> bool {
    value.is_empty()
        || value.trim() != value
        || value.starts_with(|c: char| "-?:,[]{}#&*!|>'\"%@`".contains(c))
        || value.contains(": ")
        || value.contains(" #")
        || value.contains('\n')
}

fn escape_double(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Returns a scalar token holding `value`, keeping the quoting style where
/// the value allows it.
#[must_use]
pub fn with_scalar_value(scalar: &Node, value: &str) -> Node {
    let (kind, text) = match scalar.kind() {
        "single_quote_scalar" => (
            "single_quote_scalar",
            format!("'{}'", value.replace('\'', "''")),
        ),
        "plain_scalar" if !needs_quotes(value) => ("plain_scalar", value.to_owned()),
        _ => ("double_quote_scalar", escape_double(value)),
    };
    if kind == scalar.kind() {
        return scalar.with_text(text);
    }
    Node::token(kind, text)
        .with_prefix(scalar.prefix())
        .with_field(scalar.field())
}

/// Returns a copy of `entry` whose scalar value is `value`.
///
/// Entries holding mappings or sequences are returned unchanged.
#[must_use]
pub fn with_entry_value(entry: &Node, value: &str) -> Node {
    replace_scalar(entry, "value", value)
}

/// Returns a copy of `entry` with its key renamed.
#[must_use]
pub fn with_entry_key(entry: &Node, key: &str) -> Node {
    replace_scalar(entry, "key", key)
}

fn replace_scalar(entry: &Node, field: &str, value: &str) -> Node {
    let Some(scalar) = entry
        .child_by_field(field)
        .and_then(|node| scalar_in(node))
    else {
        return entry.clone();
    };
    let replacement = Arc::new(with_scalar_value(scalar, value));
    entry
        .replace_descendant(scalar.id(), &replacement)
        .unwrap_or_else(|| entry.clone())
}

/// Returns the path from the document to the node under `cursor`.
#[must_use]
pub fn path_of(cursor: &Cursor<'_>) -> Vec<PathSegment> {
    let mut chain: Vec<&Cursor<'_>> = cursor.ancestors().collect();
    chain.reverse();
    let mut path = Vec::new();
    for step in chain {
        let node = step.value();
        if is_entry(node) {
            path.push(PathSegment::Key(entry_key(node).unwrap_or_default()));
            continue;
        }
        let Some(parent) = step.parent_value() else {
            continue;
        };
        if node.is("block_sequence_item") || (parent.is("flow_sequence") && node.is("flow_node")) {
            let index = parent
                .children()
                .iter()
                .filter(|sibling| sibling.kind() == node.kind())
                .position(|sibling| sibling.id() == node.id())
                .unwrap_or_default();
            path.push(PathSegment::Index(index));
        }
    }
    path
}

/// Joins a path Spring style: keys with dots, indices in brackets.
#[must_use]
pub fn dotted_key(path: &[PathSegment]) -> String {
    let mut out = String::new();
    for segment in path {
        match segment {
            PathSegment::Key(key) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(key);
            }
            PathSegment::Index(index) => {
                out.push('[');
                out.push_str(&index.to_string());
                out.push(']');
            }
        }
    }
    out
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "[{index}]"),
        }
    }
}
