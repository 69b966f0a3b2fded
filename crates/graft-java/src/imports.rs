//! Import reconciliation.
//!
//! [`AddImport`] and [`RemoveImport`] are whole-file Java visitors. They are
//! normally queued through [`maybe_add_import`] and [`maybe_remove_import`],
//! which key the request by fully-qualified name so each import is
//! reconciled once per cycle no matter how many edits asked for it.
//!
//! Imports are laid out in three groups separated by a blank line: other
//! packages, then `java.*` and `javax.*`, then static imports. Names sort
//! lexicographically within a group.

use std::sync::Arc;

use graft_core::{AfterVisit, Cursor, ExecutionContext, Node, simple_name};
use tracing::debug;

use crate::parser::parse_import;
use crate::syntax::{self, ImportDecl};
use crate::visitor::{JavaVisitor, java};

/// Adds an import when the file needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddImport {
    fqn: String,
    member: Option<String>,
    only_if_referenced: bool,
}

impl AddImport {
    /// Imports the type `fqn`.
    #[must_use]
    pub fn new(fqn: impl Into<String>) -> Self {
        Self {
            fqn: fqn.into(),
            member: None,
            only_if_referenced: true,
        }
    }

    /// Statically imports `member` (or `*`) of the type `fqn`.
    #[must_use]
    pub fn static_member(fqn: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            fqn: fqn.into(),
            member: Some(member.into()),
            only_if_referenced: true,
        }
    }

    /// Whether the import is skipped when nothing in the file refers to it.
    #[must_use]
    pub const fn only_if_referenced(mut self, only_if_referenced: bool) -> Self {
        self.only_if_referenced = only_if_referenced;
        self
    }

    fn decl(&self) -> ImportDecl {
        match &self.member {
            Some(member) if member == "*" => ImportDecl {
                name: self.fqn.clone(),
                is_static: true,
                is_wildcard: true,
            },
            Some(member) => ImportDecl {
                name: format!("{}.{member}", self.fqn),
                is_static: true,
                is_wildcard: false,
            },
            None => ImportDecl {
                name: self.fqn.clone(),
                is_static: false,
                is_wildcard: false,
            },
        }
    }

    fn is_needed(&self, root: &Node) -> bool {
        let existing = syntax::imports(root);
        let package = owner_of(&self.fqn);
        match &self.member {
            None => {
                if package.is_empty() || package == "java.lang" {
                    return false;
                }
                if syntax::package_name(root).as_deref() == Some(package) {
                    return false;
                }
                if existing.iter().any(|decl| {
                    !decl.is_static
                        && (decl.name == self.fqn || (decl.is_wildcard && decl.name == package))
                }) {
                    return false;
                }
                let simple = simple_name(&self.fqn);
                if let Some(conflict) = conflicting_import(&existing, &self.fqn) {
                    debug!(
                        import = %self.fqn,
                        existing = %conflict.name,
                        "skipping import that conflicts with an existing simple name"
                    );
                    return false;
                }
                if declares_type(root, simple) {
                    debug!(import = %self.fqn, "skipping import shadowed by a declared type");
                    return false;
                }
                !self.only_if_referenced || references_type(root, &self.fqn)
            }
            Some(member) => {
                let wanted = self.decl();
                if existing.iter().any(|decl| {
                    decl.is_static
                        && (decl.name == wanted.name || (decl.is_wildcard && decl.name == self.fqn))
                }) {
                    return false;
                }
                !self.only_if_referenced || member == "*" || references_member(root, member)
            }
        }
    }
}

impl JavaVisitor for AddImport {
    fn name(&self) -> &str {
        "add-import"
    }

    fn visit_compilation_unit(&mut self, cursor: &Cursor<'_>, _ctx: &mut ExecutionContext) -> Arc<Node> {
        let root = cursor.value();
        if !self.is_needed(root) {
            return Arc::clone(root);
        }
        let decl = self.decl();
        match parse_import(&decl) {
            Ok(import) => {
                debug!(import = %decl.render(), "adding import");
                Arc::new(insert_import(root, &decl, import))
            }
            Err(err) => {
                debug!(import = %decl.render(), error = %err, "could not build import");
                Arc::clone(root)
            }
        }
    }
}

/// Removes a type import once nothing in the file refers to the type.
///
/// Removal is conservative: any attributed reference to the type, or any
/// unattributed identifier spelling its simple name, keeps the import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveImport {
    fqn: String,
}

impl RemoveImport {
    /// Removes the import of `fqn`.
    #[must_use]
    pub fn new(fqn: impl Into<String>) -> Self {
        Self { fqn: fqn.into() }
    }
}

impl JavaVisitor for RemoveImport {
    fn name(&self) -> &str {
        "remove-import"
    }

    fn visit_compilation_unit(&mut self, cursor: &Cursor<'_>, _ctx: &mut ExecutionContext) -> Arc<Node> {
        let root = cursor.value();
        let Some(index) = root.children().iter().position(|child| {
            syntax::import_of(child)
                .is_some_and(|decl| !decl.is_static && !decl.is_wildcard && decl.name == self.fqn)
        }) else {
            return Arc::clone(root);
        };
        if references_type(root, &self.fqn) {
            debug!(import = %self.fqn, "keeping import that is still referenced");
            return Arc::clone(root);
        }
        debug!(import = %self.fqn, "removing unused import");
        Arc::new(remove_child(root, index))
    }
}

/// Queues an [`AddImport`] for `fqn`, added only if the file refers to it.
pub fn maybe_add_import(ctx: &mut ExecutionContext, fqn: &str) {
    ctx.do_after_visit(AfterVisit::new(
        format!("add-import:{fqn}"),
        java(AddImport::new(fqn)),
    ));
}

/// Queues a static [`AddImport`] of `member` from `fqn`.
pub fn maybe_add_static_import(ctx: &mut ExecutionContext, fqn: &str, member: &str) {
    ctx.do_after_visit(AfterVisit::new(
        format!("add-import:static:{fqn}.{member}"),
        java(AddImport::static_member(fqn, member)),
    ));
}

/// Queues a [`RemoveImport`] for `fqn`.
pub fn maybe_remove_import(ctx: &mut ExecutionContext, fqn: &str) {
    ctx.do_after_visit(AfterVisit::new(
        format!("remove-import:{fqn}"),
        java(RemoveImport::new(fqn)),
    ));
}

fn owner_of(fqn: &str) -> &str {
    fqn.rsplit_once('.').map_or("", |(owner, _)| owner)
}

fn group(decl: &ImportDecl) -> u8 {
    if decl.is_static {
        2
    } else if decl.name.starts_with("java.") || decl.name.starts_with("javax.") {
        1
    } else {
        0
    }
}

fn sort_key(decl: &ImportDecl) -> (u8, String) {
    (group(decl), decl.render())
}

fn separator(same_group: bool) -> &'static str {
    if same_group { "\n" } else { "\n\n" }
}

/// Makes `prefix` start with a blank line, keeping any comments it holds.
fn with_blank_line(prefix: &str) -> String {
    let rest = prefix.trim_start_matches(['\n', '\r', ' ', '\t']);
    format!("\n\n{rest}")
}

fn insert_import(root: &Node, decl: &ImportDecl, import: Arc<Node>) -> Node {
    let children = root.children();
    let existing: Vec<(usize, ImportDecl)> = children
        .iter()
        .enumerate()
        .filter_map(|(index, child)| syntax::import_of(child).map(|found| (index, found)))
        .collect();
    let key = sort_key(decl);

    let Some((last_index, last_decl)) = existing.last() else {
        return insert_first_import(root, import);
    };

    let following = existing
        .iter()
        .position(|(_, found)| sort_key(found) > key);
    match following {
        None => {
            let prefix = separator(group(last_decl) == group(decl));
            root.with_inserted_child(*last_index + 1, Arc::new(import.with_prefix(prefix)))
        }
        Some(position) => {
            let Some((next_index, next_decl)) = existing.get(position) else {
                return root.clone();
            };
            let Some(next) = children.get(*next_index) else {
                return root.clone();
            };
            let new_prefix = match position.checked_sub(1).and_then(|p| existing.get(p)) {
                Some((_, previous)) => separator(group(previous) == group(decl)).to_owned(),
                None => next.prefix().to_owned(),
            };
            let next_prefix = separator(group(next_decl) == group(decl));
            let updated = root.with_child(*next_index, Arc::new(next.with_prefix(next_prefix)));
            updated.with_inserted_child(*next_index, Arc::new(import.with_prefix(new_prefix)))
        }
    }
}

fn insert_first_import(root: &Node, import: Arc<Node>) -> Node {
    let children = root.children();
    let package = children.iter().position(|child| child.is("package_declaration"));
    let at = package.map_or(0, |index| index + 1);
    let import_prefix = match package {
        Some(_) => "\n\n".to_owned(),
        None => children
            .first()
            .map(|first| first.prefix().to_owned())
            .unwrap_or_default(),
    };
    let updated = match children.get(at) {
        Some(next) => root.with_child(at, Arc::new(next.with_prefix(with_blank_line(next.prefix())))),
        None => root.clone(),
    };
    updated.with_inserted_child(at, Arc::new(import.with_prefix(import_prefix)))
}

fn remove_child(root: &Node, index: usize) -> Node {
    let children = root.children();
    let (Some(removed), next) = (children.get(index), children.get(index + 1)) else {
        return root.clone();
    };
    let updated = match next {
        Some(next) if newlines(removed.prefix()) > newlines(next.prefix()) => {
            root.with_child(index + 1, Arc::new(next.with_prefix(removed.prefix())))
        }
        _ => root.clone(),
    };
    updated.without_child(index)
}

fn newlines(prefix: &str) -> usize {
    prefix.matches('\n').count()
}

fn conflicting_import<'a>(existing: &'a [ImportDecl], fqn: &str) -> Option<&'a ImportDecl> {
    let simple = simple_name(fqn);
    existing.iter().find(|decl| {
        !decl.is_static && !decl.is_wildcard && decl.name != fqn && simple_name(&decl.name) == simple
    })
}

/// Returns whether the simple name of `fqn` already means something else in
/// the file, through another explicit import or a declared type.
pub(crate) fn simple_name_taken(root: &Node, fqn: &str) -> bool {
    conflicting_import(&syntax::imports(root), fqn).is_some()
        || declares_type(root, simple_name(fqn))
}

fn declares_type(root: &Node, simple: &str) -> bool {
    root.descendants().any(|node| {
        crate::kind::is_type_declaration(node.kind())
            && syntax::declared_name(node).as_deref() == Some(simple)
    })
}

/// Returns whether anything outside the import section refers to `fqn` by
/// its simple name. Fully-qualified references do not need an import.
pub(crate) fn references_type(root: &Node, fqn: &str) -> bool {
    let simple = simple_name(fqn);
    code_nodes(root).any(|(node, parent)| {
        is_simple_reference(node, parent, simple)
            && node
                .type_handle()
                .is_none_or(|handle| handle.fqn().trim_end_matches("[]") == fqn)
    })
}

fn references_member(root: &Node, member: &str) -> bool {
    code_nodes(root).any(|(node, parent)| {
        node.is("identifier")
            && node.text() == Some(member)
            && match (parent, node.field()) {
                (Some("method_invocation"), Some("name")) => true,
                (_, Some("name" | "field")) => false,
                _ => true,
            }
    })
}

/// An identifier that could only bind through an import: the first segment
/// of a name, never a member selected from something else.
fn is_simple_reference(node: &Node, parent: Option<&'static str>, simple: &str) -> bool {
    if !(node.is("identifier") || node.is("type_identifier")) || node.text() != Some(simple) {
        return false;
    }
    match (parent, node.field()) {
        (Some("scoped_type_identifier" | "scoped_identifier"), _)
        | (Some("field_access"), Some("field")) => false,
        (Some("marker_annotation" | "annotation"), Some("name")) => true,
        (_, Some("name")) => false,
        _ => true,
    }
}

/// Walks every node outside the package and import declarations, paired
/// with its parent's kind.
fn code_nodes(root: &Node) -> impl Iterator<Item = (&Node, Option<&'static str>)> {
    let mut stack: Vec<(&Node, Option<&'static str>)> = root
        .children()
        .iter()
        .rev()
        .filter(|child| !child.is("import_declaration") && !child.is("package_declaration"))
        .map(|child| (child.as_ref(), Some(root.kind())))
        .collect();
    std::iter::from_fn(move || {
        let (node, parent) = stack.pop()?;
        stack.extend(
            node.children()
                .iter()
                .rev()
                .map(|child| (child.as_ref(), Some(node.kind()))),
        );
        Some((node, parent))
    })
}
