//! A JsonPath subset for locating YAML entries and sequence items.
//!
//! Supported: the root `$`, child keys (`.key`, `['dotted.key']`), the
//! recursive descent `..key`, the key wildcard `.*`, indices `[n]` and the
//! any-member wildcard `[*]`.

use std::fmt;
use std::sync::Arc;

use graft_core::{Cursor, Node, TreeMatcher};

use super::entries::{PathSegment, is_entry, path_of};
use crate::error::MarkupError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Selector {
    Key(String),
    AnyKey,
    Index(usize),
    Any,
}

impl Selector {
    fn accepts(&self, segment: &PathSegment) -> bool {
        match (self, segment) {
            (Self::Key(wanted), PathSegment::Key(key)) => wanted == key,
            (Self::AnyKey, PathSegment::Key(_)) | (Self::Any, _) => true,
            (Self::Index(wanted), PathSegment::Index(index)) => wanted == index,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    descendant: bool,
    selector: Selector,
}

/// Matches YAML entries and sequence items by their path from the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPathMatcher {
    expression: String,
    segments: Vec<Segment>,
}

impl JsonPathMatcher {
    /// Parses an expression.
    ///
    /// # Errors
    ///
    /// Returns [`MarkupError::InvalidPath`] when the expression does not
    /// start at `$` or a segment is malformed.
    pub fn new(expression: &str) -> Result<Self, MarkupError> {
        let invalid = |message: &str| MarkupError::invalid_path(expression, message);
        let Some(mut rest) = expression.trim().strip_prefix('$') else {
            return Err(invalid("paths start at `$`"));
        };
        let mut segments = Vec::new();
        while !rest.is_empty() {
            let (descendant, after_dots) = if let Some(tail) = rest.strip_prefix("..") {
                (true, tail)
            } else if let Some(tail) = rest.strip_prefix('.') {
                (false, tail)
            } else if rest.starts_with('[') {
                (false, rest)
            } else {
                return Err(invalid("expected `.` or `[`"));
            };
            let (selector, tail) = if let Some(bracketed) = after_dots.strip_prefix('[') {
                parse_bracket(bracketed).map_err(|message| invalid(&message))?
            } else {
                parse_name(after_dots).map_err(|message| invalid(&message))?
            };
            segments.push(Segment {
                descendant,
                selector,
            });
            rest = tail;
        }
        if segments.is_empty() {
            return Err(invalid("no segment after `$`"));
        }
        Ok(Self {
            expression: expression.to_owned(),
            segments,
        })
    }

    /// Returns the expression as written.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Returns whether a document path matches the expression.
    #[must_use]
    pub fn matches_path(&self, path: &[PathSegment]) -> bool {
        match_segments(&self.segments, path)
    }
}

fn parse_name(input: &str) -> Result<(Selector, &str), String> {
    let end = input.find(['.', '[']).unwrap_or(input.len());
    let (name, tail) = input.split_at(end);
    match name {
        "" => Err("empty key".to_owned()),
        "*" => Ok((Selector::AnyKey, tail)),
        _ => Ok((Selector::Key(name.to_owned()), tail)),
    }
}

fn parse_bracket(input: &str) -> Result<(Selector, &str), String> {
    let Some(close) = input.find(']') else {
        return Err("unclosed `[`".to_owned());
    };
    let (inner, tail) = input.split_at(close);
    let tail = tail.get(1..).unwrap_or_default();
    let inner = inner.trim();
    if inner == "*" {
        return Ok((Selector::Any, tail));
    }
    for quote in ['\'', '"'] {
        if let Some(key) = inner
            .strip_prefix(quote)
            .and_then(|body| body.strip_suffix(quote))
        {
            return Ok((Selector::Key(key.to_owned()), tail));
        }
    }
    inner
        .parse::<usize>()
        .map(|index| (Selector::Index(index), tail))
        .map_err(|_| format!("`[{inner}]` is neither an index nor a quoted key"))
}

fn match_segments(segments: &[Segment], path: &[PathSegment]) -> bool {
    let Some((segment, rest)) = segments.split_first() else {
        return path.is_empty();
    };
    let reach = if segment.descendant { path.len() } else { 1.min(path.len()) };
    (0..reach).any(|skip| {
        path.get(skip)
            .is_some_and(|step| segment.selector.accepts(step))
            && match_segments(rest, path.get(skip + 1..).unwrap_or_default())
    })
}

fn is_member(cursor: &Cursor<'_>) -> bool {
    let node = cursor.value();
    is_entry(node)
        || node.is("block_sequence_item")
        || (node.is("flow_node") && cursor.parent_value().is_some_and(|p| p.is("flow_sequence")))
}

impl TreeMatcher for JsonPathMatcher {
    fn matches(&self, cursor: &Cursor<'_>) -> bool {
        is_member(cursor) && self.matches_path(&path_of(cursor))
    }
}

impl fmt::Display for JsonPathMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

/// Returns the entries and items under `root` matching `matcher`, in
/// document order.
#[must_use]
pub fn find_members(root: &Arc<Node>, matcher: &JsonPathMatcher) -> Vec<Arc<Node>> {
    fn walk(cursor: &Cursor<'_>, matcher: &JsonPathMatcher, out: &mut Vec<Arc<Node>>) {
        if matcher.matches(cursor) {
            out.push(Arc::clone(cursor.value()));
        }
        for child in cursor.value().children() {
            walk(&cursor.child(Arc::clone(child)), matcher, out);
        }
    }
    let mut out = Vec::new();
    walk(&Cursor::root(Arc::clone(root)), matcher, &mut out);
    out
}
