//! Read-only helpers over Java trees.

use std::sync::Arc;

use graft_core::Node;

use crate::kind::is_type_declaration;

/// One import declaration, as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// Imported name without `.*`; for static imports the member is the last
    /// segment.
    pub name: String,
    /// `import static`.
    pub is_static: bool,
    /// Ends in `.*`.
    pub is_wildcard: bool,
}

impl ImportDecl {
    /// Returns the declaration as it prints after `import `.
    #[must_use]
    pub fn render(&self) -> String {
        let keyword = if self.is_static { "static " } else { "" };
        let star = if self.is_wildcard { ".*" } else { "" };
        format!("{keyword}{}{star}", self.name)
    }
}

/// Reads an `import_declaration` node.
#[must_use]
pub fn import_of(node: &Node) -> Option<ImportDecl> {
    if !node.is("import_declaration") {
        return None;
    }
    let name = node
        .children()
        .iter()
        .find(|child| child.is("scoped_identifier") || child.is("identifier"))?;
    Some(ImportDecl {
        name: compact(&name.print_trimmed()),
        is_static: node.children().iter().any(|child| child.is("static")),
        is_wildcard: node.children().iter().any(|child| child.is("asterisk")),
    })
}

/// Returns every import of a compilation unit in source order.
#[must_use]
pub fn imports(root: &Node) -> Vec<ImportDecl> {
    root.children()
        .iter()
        .filter_map(|child| import_of(child))
        .collect()
}

/// Returns the declared package, if any.
#[must_use]
pub fn package_name(root: &Node) -> Option<String> {
    let decl = root.child_of_kind("package_declaration")?;
    decl.children()
        .iter()
        .find(|child| child.is("scoped_identifier") || child.is("identifier"))
        .map(|name| compact(&name.print_trimmed()))
}

/// Removes all whitespace from `text`.
#[must_use]
pub fn compact(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Renders a type node as a name: generics erased, array brackets kept and
/// annotations dropped.
#[must_use]
pub fn type_text(node: &Node) -> String {
    match node.kind() {
        "generic_type" => node
            .named_children()
            .next()
            .map(|base| type_text(base))
            .unwrap_or_default(),
        "array_type" => {
            let element = node
                .child_by_field("element")
                .map(|element| type_text(element))
                .unwrap_or_default();
            let dims = node
                .child_by_field("dimensions")
                .map_or(1, |dims| dims.print_trimmed().matches('[').count());
            format!("{element}{}", "[]".repeat(dims))
        }
        "scoped_type_identifier" => node
            .children()
            .iter()
            .filter(|child| child.is("type_identifier") || child.is("scoped_type_identifier"))
            .map(|child| type_text(child))
            .collect::<Vec<_>>()
            .join("."),
        _ => compact(&node.print_trimmed()),
    }
}

/// Returns the `modifiers` child of a declaration.
#[must_use]
pub fn modifiers(declaration: &Node) -> Option<&Arc<Node>> {
    declaration.child_of_kind("modifiers")
}

/// Returns whether `declaration` carries the keyword modifier `keyword`.
#[must_use]
pub fn has_modifier(declaration: &Node, keyword: &str) -> bool {
    modifiers(declaration).is_some_and(|mods| mods.children().iter().any(|m| m.is(keyword)))
}

/// Returns the annotations on a declaration, in source order.
pub fn annotations(declaration: &Node) -> impl Iterator<Item = &Arc<Node>> {
    modifiers(declaration)
        .into_iter()
        .flat_map(|mods| mods.children().iter())
        .filter(|child| child.is("annotation") || child.is("marker_annotation"))
}

/// Returns the name of an annotation as written, without `@`.
#[must_use]
pub fn annotation_name(annotation: &Node) -> Option<String> {
    annotation
        .child_by_field("name")
        .map(|name| compact(&name.print_trimmed()))
}

/// Returns the top-level type declarations of a compilation unit.
pub fn type_declarations(root: &Node) -> impl Iterator<Item = &Arc<Node>> {
    root.children()
        .iter()
        .filter(|child| is_type_declaration(child.kind()))
}

/// Returns the type declarations nested directly in `declaration`'s body.
pub fn member_types(declaration: &Node) -> impl Iterator<Item = &Arc<Node>> {
    body_members(declaration).filter(|child| is_type_declaration(child.kind()))
}

/// Returns the members of a type declaration's body, looking through an
/// enum's body declarations.
pub fn body_members(declaration: &Node) -> impl Iterator<Item = &Arc<Node>> {
    declaration
        .child_by_field("body")
        .into_iter()
        .flat_map(|body| body.children().iter())
        .flat_map(|member| {
            if member.is("enum_body_declarations") {
                member.children().iter().collect::<Vec<_>>()
            } else {
                vec![member]
            }
        })
}

/// Returns the declared name of a declaration.
#[must_use]
pub fn declared_name(declaration: &Node) -> Option<String> {
    declaration
        .child_by_field("name")
        .map(|name| name.print_trimmed())
}

/// Returns `(type, name)` pairs for each parameter of a method declaration,
/// plus whether the last one is variable-arity.
#[must_use]
pub fn parameters(declaration: &Node) -> (Vec<(String, String)>, bool) {
    let Some(params) = declaration.child_by_field("parameters") else {
        return (Vec::new(), false);
    };
    let mut out = Vec::new();
    let mut varargs = false;
    for param in params.named_children() {
        match param.kind() {
            "formal_parameter" => {
                let ty = param.child_by_field("type").map(|t| type_text(t));
                let name = param.child_by_field("name").map(|n| n.print_trimmed());
                if let (Some(ty), Some(name)) = (ty, name) {
                    out.push((ty, name));
                }
            }
            "spread_parameter" => {
                varargs = true;
                let ty = param
                    .named_children()
                    .find(|child| crate::kind::is_type_node(child.kind()))
                    .map(|t| format!("{}[]", type_text(t)));
                let name = param
                    .child_of_kind("variable_declarator")
                    .and_then(|decl| decl.child_by_field("name"))
                    .map(|n| n.print_trimmed());
                if let (Some(ty), Some(name)) = (ty, name) {
                    out.push((ty, name));
                }
            }
            _ => {}
        }
    }
    (out, varargs)
}

/// Returns the variable names declared by a field or local declaration.
pub fn declarator_names(declaration: &Node) -> impl Iterator<Item = String> + '_ {
    declaration
        .children_by_field("declarator")
        .filter_map(|decl| decl.child_by_field("name"))
        .map(|name| name.print_trimmed())
}
