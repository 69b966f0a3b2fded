//! Placing a compiled fragment relative to the cursor's node.

use std::fmt;
use std::sync::Arc;

use graft_core::{Node, NodeId, simple_name};

use crate::error::TemplateError;
use crate::format::{IndentStyle, indent_of, line_indent};
use crate::syntax::annotation_name;

/// Where a template's fragment goes, relative to the node under the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coordinates {
    /// Replace the node itself. The fragment must be a single node.
    Replace,
    /// Replace the argument list contents of an invocation or creation.
    ReplaceArguments,
    /// Insert before the given child of the node, on its own line.
    Before(NodeId),
    /// Insert after the given child of the node, on its own line.
    After(NodeId),
    /// Add annotations to a declaration, keeping them sorted by simple name.
    AddAnnotation,
    /// Append members to a type declaration's body.
    AddMember,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => f.write_str("replace"),
            Self::ReplaceArguments => f.write_str("replace arguments"),
            Self::Before(id) => write!(f, "before node {}", id.get()),
            Self::After(id) => write!(f, "after node {}", id.get()),
            Self::AddAnnotation => f.write_str("add annotation"),
            Self::AddMember => f.write_str("add member"),
        }
    }
}

impl Coordinates {
    /// Returns the indentation fragment lines should start at.
    pub(crate) fn base_indent(self, target: &Node, root: &Node, style: IndentStyle) -> String {
        let indent_at = |node: &Node| {
            line_indent(root, node.id()).unwrap_or_else(|| indent_of(node.prefix()).to_owned())
        };
        match self {
            Self::Replace | Self::ReplaceArguments | Self::AddAnnotation => indent_at(target),
            Self::Before(anchor) | Self::After(anchor) => target
                .children()
                .iter()
                .find(|child| child.id() == anchor)
                .map_or_else(|| indent_at(target), |child| indent_at(child)),
            Self::AddMember => {
                let mut indent = indent_at(target);
                indent.push_str(&style.unit());
                indent
            }
        }
    }

    /// Splices `fragment` into `target` and returns the replacement for
    /// `target`.
    pub(crate) fn splice(
        self,
        target: &Arc<Node>,
        fragment: Vec<Arc<Node>>,
        base: &str,
        style: IndentStyle,
    ) -> Result<Arc<Node>, TemplateError> {
        match self {
            Self::Replace => replace(self, target, fragment),
            Self::ReplaceArguments => replace_arguments(self, target, fragment),
            Self::Before(anchor) => insert_around(self, target, anchor, fragment, base, false),
            Self::After(anchor) => insert_around(self, target, anchor, fragment, base, true),
            Self::AddAnnotation => fragment.iter().try_fold(Arc::clone(target), |current, annotation| {
                add_annotation(self, &current, annotation, base).map(Arc::new)
            }),
            Self::AddMember => add_members(self, target, fragment, base, style),
        }
    }
}

fn replace(
    coordinates: Coordinates,
    target: &Node,
    fragment: Vec<Arc<Node>>,
) -> Result<Arc<Node>, TemplateError> {
    let mut nodes = fragment.into_iter();
    let (Some(node), None) = (nodes.next(), nodes.next()) else {
        return Err(TemplateError::coordinates(
            coordinates,
            "the fragment must be exactly one node",
        ));
    };
    let prefix = format!("{}{}", target.prefix(), node.prefix());
    Ok(Arc::new(node.with_prefix(prefix).with_field(target.field())))
}

fn replace_arguments(
    coordinates: Coordinates,
    target: &Node,
    fragment: Vec<Arc<Node>>,
) -> Result<Arc<Node>, TemplateError> {
    let (index, list) = target
        .children()
        .iter()
        .enumerate()
        .find(|(_, child)| child.field() == Some("arguments"))
        .ok_or_else(|| TemplateError::coordinates(coordinates, "the node takes no arguments"))?;
    let (Some(open), Some(close)) = (list.children().first(), list.children().last()) else {
        return Err(TemplateError::coordinates(coordinates, "malformed argument list"));
    };
    let mut children = Vec::with_capacity(fragment.len() + 2);
    children.push(Arc::clone(open));
    children.extend(fragment);
    children.push(if close.prefix().contains('\n') {
        Arc::clone(close)
    } else {
        Arc::new(close.with_prefix(""))
    });
    Ok(Arc::new(target.with_child(index, Arc::new(list.with_children(children)))))
}

fn insert_around(
    coordinates: Coordinates,
    target: &Node,
    anchor: NodeId,
    fragment: Vec<Arc<Node>>,
    base: &str,
    after: bool,
) -> Result<Arc<Node>, TemplateError> {
    let position = target
        .position_of(anchor)
        .ok_or_else(|| TemplateError::coordinates(coordinates, "the anchor is not a child"))?;
    let Some(anchor_node) = target.children().get(position) else {
        return Err(TemplateError::coordinates(coordinates, "the anchor is not a child"));
    };
    let separator = if anchor_node.prefix().contains('\n') {
        format!("\n{base}")
    } else {
        " ".to_owned()
    };

    let mut children = target.children().to_vec();
    let mut inserted = fragment;
    let at = if after {
        if let Some(first) = inserted.first_mut() {
            *first = Arc::new(first.with_prefix(format!("{separator}{}", first.prefix())));
        }
        position + 1
    } else {
        if let Some(first) = inserted.first_mut() {
            *first = Arc::new(first.with_prefix(format!("{}{}", anchor_node.prefix(), first.prefix())));
        }
        if let Some(slot) = children.get_mut(position) {
            *slot = Arc::new(anchor_node.with_prefix(separator));
        }
        position
    };
    let tail = children.split_off(at);
    children.extend(inserted);
    children.extend(tail);
    Ok(Arc::new(target.with_children(children)))
}

fn is_annotation(node: &Node) -> bool {
    node.is("marker_annotation") || node.is("annotation")
}

fn sort_key(annotation: &Node) -> String {
    annotation_name(annotation)
        .map(|name| simple_name(&name).to_owned())
        .unwrap_or_default()
}

/// Annotations go on their own lines when the declaration already does so,
/// or when it has none and is a type, method or field.
fn annotations_on_own_lines(declaration: &Node) -> bool {
    let Some(modifiers) = declaration.child_of_kind("modifiers") else {
        return own_line_by_default(declaration);
    };
    let mods = modifiers.children();
    let Some(last) = mods.iter().rposition(|child| is_annotation(child)) else {
        return own_line_by_default(declaration);
    };
    let following = mods.get(last + 1).or_else(|| {
        declaration
            .position_of(modifiers.id())
            .and_then(|index| declaration.children().get(index + 1))
    });
    following.is_some_and(|next| next.prefix().contains('\n'))
}

fn own_line_by_default(declaration: &Node) -> bool {
    !matches!(
        declaration.kind(),
        "formal_parameter" | "local_variable_declaration" | "spread_parameter"
    )
}

fn add_annotation(
    coordinates: Coordinates,
    declaration: &Node,
    annotation: &Node,
    base: &str,
) -> Result<Node, TemplateError> {
    if !is_annotation(annotation) {
        return Err(TemplateError::coordinates(
            coordinates,
            "the fragment is not an annotation",
        ));
    }
    let separator = if annotations_on_own_lines(declaration) {
        format!("\n{base}")
    } else {
        " ".to_owned()
    };
    let key = sort_key(annotation);

    let Some(index) = declaration
        .children()
        .iter()
        .position(|child| child.is("modifiers"))
    else {
        let Some(first) = declaration.children().first() else {
            return Err(TemplateError::coordinates(coordinates, "empty declaration"));
        };
        let modifiers = Node::branch("modifiers", vec![Arc::new(annotation.with_prefix(""))]);
        let moved = declaration.with_child(0, Arc::new(first.with_prefix(separator)));
        return Ok(moved.with_inserted_child(0, Arc::new(modifiers)));
    };
    let Some(modifiers) = declaration.children().get(index) else {
        return Err(TemplateError::coordinates(coordinates, "missing modifiers"));
    };

    let mods = modifiers.children();
    let at = mods
        .iter()
        .position(|child| is_annotation(child) && sort_key(child) > key)
        .unwrap_or_else(|| {
            mods.iter()
                .rposition(|child| is_annotation(child))
                .map_or(0, |last| last + 1)
        });
    let updated = if at == 0 {
        let lead = mods.first().map_or("", |first| first.prefix());
        let inserted = modifiers.with_inserted_child(0, Arc::new(annotation.with_prefix(lead)));
        match inserted.children().get(1) {
            Some(next) => inserted.with_child(1, Arc::new(next.with_prefix(separator))),
            None => inserted,
        }
    } else {
        modifiers.with_inserted_child(at, Arc::new(annotation.with_prefix(separator)))
    };
    Ok(declaration.with_child(index, Arc::new(updated)))
}

fn add_members(
    coordinates: Coordinates,
    target: &Node,
    fragment: Vec<Arc<Node>>,
    base: &str,
    style: IndentStyle,
) -> Result<Arc<Node>, TemplateError> {
    let (body_index, body) = if target.kind().ends_with("_body") {
        (None, target)
    } else {
        let index = target
            .children()
            .iter()
            .position(|child| child.field() == Some("body"))
            .ok_or_else(|| TemplateError::coordinates(coordinates, "the node has no body"))?;
        let body = target
            .children()
            .get(index)
            .ok_or_else(|| TemplateError::coordinates(coordinates, "the node has no body"))?;
        (Some(index), body.as_ref())
    };
    if !matches!(
        body.kind(),
        "class_body" | "interface_body" | "annotation_type_body"
    ) {
        return Err(TemplateError::coordinates(
            coordinates,
            format!("cannot add members to {}", body.kind()),
        ));
    }

    let mut children = body.children().to_vec();
    let close = children
        .iter()
        .rposition(|child| child.is("}"))
        .ok_or_else(|| TemplateError::coordinates(coordinates, "unterminated body"))?;
    let has_members = children.iter().any(|child| child.is_named());
    let outer = base.strip_suffix(style.unit().as_str()).unwrap_or_default();

    let mut inserted = fragment;
    if let Some(first) = inserted.first_mut() {
        let gap = if has_members { "\n\n" } else { "\n" };
        *first = Arc::new(first.with_prefix(format!("{gap}{base}{}", first.prefix())));
    }
    if let Some(brace) = children.get_mut(close) {
        if !brace.prefix().contains('\n') {
            *brace = Arc::new(brace.with_prefix(format!("\n{outer}")));
        }
    }
    let tail = children.split_off(close);
    children.extend(inserted);
    children.extend(tail);
    let rebuilt = body.with_children(children);
    Ok(Arc::new(match body_index {
        Some(index) => target.with_child(index, Arc::new(rebuilt)),
        None => rebuilt,
    }))
}
