//! Tree nodes and their identities.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::markers::{Marker, Markers};
use super::types::{MethodType, TypeAttribution, TypeHandle};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque, process-unique node identity.
///
/// Identity survives every `with_*` edit, so a visitor can tell whether a
/// node it saw earlier is still part of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocates a fresh identity.
    #[must_use]
    pub fn fresh() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw identity value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Content of a node: either source text or child nodes.
#[derive(Debug, Clone)]
pub enum Body {
    /// A leaf holding its exact source text.
    Token(Arc<str>),
    /// An interior node.
    Branch(Vec<Arc<Node>>),
}

/// A node of the lossless syntax tree.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    kind: &'static str,
    field: Option<&'static str>,
    named: bool,
    prefix: String,
    body: Body,
    attribution: Option<TypeAttribution>,
    markers: Markers,
}

impl Node {
    /// Creates a named leaf node with a fresh identity.
    #[must_use]
    pub fn token(kind: &'static str, text: impl Into<Arc<str>>) -> Self {
        Self::new(kind, true, Body::Token(text.into()))
    }

    /// Creates an anonymous leaf whose text is its kind, such as `;`.
    #[must_use]
    pub fn punctuation(kind: &'static str) -> Self {
        Self::new(kind, false, Body::Token(Arc::from(kind)))
    }

    /// Creates a named interior node with a fresh identity.
    #[must_use]
    pub fn branch(kind: &'static str, children: Vec<Arc<Self>>) -> Self {
        Self::new(kind, true, Body::Branch(children))
    }

    pub(crate) fn from_parts(
        kind: &'static str,
        field: Option<&'static str>,
        named: bool,
        prefix: String,
        body: Body,
    ) -> Self {
        Self {
            field,
            prefix,
            ..Self::new(kind, named, body)
        }
    }

    fn new(kind: &'static str, named: bool, body: Body) -> Self {
        Self {
            id: NodeId::fresh(),
            kind,
            field: None,
            named,
            prefix: String::new(),
            body,
            attribution: None,
            markers: Markers::new(),
        }
    }

    /// Returns the node identity.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the grammar kind, e.g. `method_invocation`.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    /// Returns whether the node has the given grammar kind.
    #[must_use]
    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// Returns the field label the parent gives this node, if any.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        self.field
    }

    /// Returns whether the grammar names this node (as opposed to
    /// punctuation and keywords).
    #[must_use]
    pub const fn is_named(&self) -> bool {
        self.named
    }

    /// Returns the whitespace and comments preceding the node.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns the node body.
    #[must_use]
    pub const fn body(&self) -> &Body {
        &self.body
    }

    /// Returns the source text of a leaf node.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            Body::Token(text) => Some(text),
            Body::Branch(_) => None,
        }
    }

    /// Returns whether this is a leaf node.
    #[must_use]
    pub const fn is_token(&self) -> bool {
        matches!(self.body, Body::Token(_))
    }

    /// Returns the children of an interior node, or an empty slice.
    #[must_use]
    pub fn children(&self) -> &[Arc<Self>] {
        match &self.body {
            Body::Token(_) => &[],
            Body::Branch(children) => children,
        }
    }

    /// Iterates over the named children.
    pub fn named_children(&self) -> impl Iterator<Item = &Arc<Self>> {
        self.children().iter().filter(|child| child.named)
    }

    /// Returns the first child carrying the given field label.
    #[must_use]
    pub fn child_by_field(&self, field: &str) -> Option<&Arc<Self>> {
        self.children()
            .iter()
            .find(|child| child.field == Some(field))
    }

    /// Iterates over the children carrying the given field label.
    pub fn children_by_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Arc<Self>> {
        self.children()
            .iter()
            .filter(move |child| child.field == Some(field))
    }

    /// Returns the first child of the given kind.
    #[must_use]
    pub fn child_of_kind(&self, kind: &str) -> Option<&Arc<Self>> {
        self.children().iter().find(|child| child.kind == kind)
    }

    /// Returns the position of the child with identity `id`.
    #[must_use]
    pub fn position_of(&self, id: NodeId) -> Option<usize> {
        self.children().iter().position(|child| child.id == id)
    }

    /// Returns the attached type information.
    #[must_use]
    pub const fn attribution(&self) -> Option<&TypeAttribution> {
        self.attribution.as_ref()
    }

    /// Returns the type this node evaluates to, if resolved.
    #[must_use]
    pub fn type_handle(&self) -> Option<&TypeHandle> {
        self.attribution.as_ref().and_then(TypeAttribution::value_type)
    }

    /// Returns the resolved method for invocations and declarations.
    #[must_use]
    pub fn method_type(&self) -> Option<&Arc<MethodType>> {
        match &self.attribution {
            Some(TypeAttribution::Method(method)) => Some(method),
            _ => None,
        }
    }

    /// Returns the attached markers.
    #[must_use]
    pub const fn markers(&self) -> &Markers {
        &self.markers
    }

    /// Returns a copy with a new prefix.
    #[must_use]
    pub fn with_prefix(&self, prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            ..self.clone()
        }
    }

    /// Returns a copy with new children. Leaf nodes become interior nodes.
    #[must_use]
    pub fn with_children(&self, children: Vec<Arc<Self>>) -> Self {
        Self {
            body: Body::Branch(children),
            ..self.clone()
        }
    }

    /// Returns a copy holding `text` as a leaf.
    #[must_use]
    pub fn with_text(&self, text: impl Into<Arc<str>>) -> Self {
        Self {
            body: Body::Token(text.into()),
            ..self.clone()
        }
    }

    /// Returns a copy with the given field label.
    #[must_use]
    pub fn with_field(&self, field: Option<&'static str>) -> Self {
        Self {
            field,
            ..self.clone()
        }
    }

    /// Returns a copy with new type information.
    #[must_use]
    pub fn with_attribution(&self, attribution: Option<TypeAttribution>) -> Self {
        Self {
            attribution,
            ..self.clone()
        }
    }

    /// Returns a copy with `marker` attached.
    #[must_use]
    pub fn with_marker(&self, marker: Marker) -> Self {
        Self {
            markers: self.markers.with(marker),
            ..self.clone()
        }
    }

    /// Returns a copy with child `index` replaced.
    ///
    /// Out-of-range indices leave the children untouched.
    #[must_use]
    pub fn with_child(&self, index: usize, child: Arc<Self>) -> Self {
        let mut children = self.children().to_vec();
        if let Some(slot) = children.get_mut(index) {
            *slot = child;
        }
        self.with_children(children)
    }

    /// Returns a copy with `child` inserted at `index` (clamped to the end).
    #[must_use]
    pub fn with_inserted_child(&self, index: usize, child: Arc<Self>) -> Self {
        let mut children = self.children().to_vec();
        children.insert(index.min(children.len()), child);
        self.with_children(children)
    }

    /// Returns a copy without child `index`.
    #[must_use]
    pub fn without_child(&self, index: usize) -> Self {
        let mut children = self.children().to_vec();
        if index < children.len() {
            children.remove(index);
        }
        self.with_children(children)
    }

    /// Returns a structurally equal copy in which every node has a fresh
    /// identity.
    #[must_use]
    pub fn with_fresh_ids(&self) -> Self {
        let body = match &self.body {
            Body::Token(text) => Body::Token(Arc::clone(text)),
            Body::Branch(children) => Body::Branch(
                children
                    .iter()
                    .map(|child| Arc::new(child.with_fresh_ids()))
                    .collect(),
            ),
        };
        Self {
            id: NodeId::fresh(),
            body,
            ..self.clone()
        }
    }

    /// Replaces the descendant with identity `id`, copying only the path to
    /// it. Returns `None` when no such descendant exists.
    #[must_use]
    pub fn replace_descendant(&self, id: NodeId, replacement: &Arc<Self>) -> Option<Self> {
        for (index, child) in self.children().iter().enumerate() {
            if child.id == id {
                return Some(self.with_child(index, Arc::clone(replacement)));
            }
            if let Some(updated) = child.replace_descendant(id, replacement) {
                return Some(self.with_child(index, Arc::new(updated)));
            }
        }
        None
    }

    /// Iterates over this node and its descendants in pre-order.
    #[must_use]
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Returns the descendant (or self) with identity `id`.
    #[must_use]
    pub fn find(&self, id: NodeId) -> Option<&Self> {
        self.descendants().find(|node| node.id == id)
    }

    /// Returns whether this node or a descendant has identity `id`.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.find(id).is_some()
    }

    /// Prints the node, prefix included.
    #[must_use]
    pub fn print(&self) -> String {
        let mut out = String::new();
        self.write_into(&mut out);
        out
    }

    /// Prints the node without its own prefix.
    #[must_use]
    pub fn print_trimmed(&self) -> String {
        let mut out = String::new();
        self.write_body(&mut out);
        out
    }

    /// Appends the printed node to `out`.
    pub fn write_into(&self, out: &mut String) {
        out.push_str(&self.prefix);
        self.write_body(out);
    }

    fn write_body(&self, out: &mut String) {
        match &self.body {
            Body::Token(text) => out.push_str(text),
            Body::Branch(children) => {
                for child in children {
                    child.write_into(out);
                }
            }
        }
    }
}

/// Pre-order iterator over a subtree.
#[derive(Debug)]
pub struct Descendants<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack
            .extend(node.children().iter().rev().map(AsRef::as_ref));
        Some(node)
    }
}
