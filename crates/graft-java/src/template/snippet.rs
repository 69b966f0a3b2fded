//! Parsing snippets inside synthetic compilation units.

use std::fmt;
use std::sync::Arc;

use graft_core::Node;

use crate::parser::JavaParser;
use crate::syntax::{compact, declared_name};

const CLASS: &str = "__GraftTemplate";
const METHOD: &str = "__graft_method";
const CALL: &str = "__graft_call";
const VALUE: &str = "__graft_value";

/// Where a snippet's code is meant to sit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SnippetContext {
    /// A single expression.
    #[default]
    Expression,
    /// The contents of an argument list, commas included.
    Arguments,
    /// One or more block statements.
    Statement,
    /// One or more annotations.
    Annotation,
    /// Class members such as fields, methods and nested types.
    Member,
}

impl fmt::Display for SnippetContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Expression => "expression",
            Self::Arguments => "arguments",
            Self::Statement => "statement",
            Self::Annotation => "annotation",
            Self::Member => "member",
        })
    }
}

impl SnippetContext {
    fn wrap(self, code: &str, imports: &[String]) -> String {
        let mut unit: String = imports
            .iter()
            .map(|fqn| format!("import {fqn};\n"))
            .collect();
        unit.push_str(&match self {
            Self::Expression => format!("class {CLASS} {{ Object {VALUE} = {code}; }}\n"),
            Self::Arguments => {
                format!("class {CLASS} {{ void {METHOD}() {{ {CALL}({code}); }} }}\n")
            }
            Self::Statement => format!("class {CLASS} {{ void {METHOD}() {{\n{code}\n}} }}\n"),
            Self::Annotation => format!("{code}\nclass {CLASS} {{}}\n"),
            Self::Member => format!("class {CLASS} {{\n{code}\n}}\n"),
        });
        unit
    }

    fn extract(self, root: &Node) -> Option<Vec<Arc<Node>>> {
        let class = root
            .named_children()
            .find(|node| declared_name(node).as_deref() == Some(CLASS))?;
        match self {
            Self::Expression => class
                .descendants()
                .find(|node| {
                    node.is("variable_declarator")
                        && node
                            .child_by_field("name")
                            .is_some_and(|name| name.text() == Some(VALUE))
                })
                .and_then(|declarator| declarator.child_by_field("value"))
                .map(|value| vec![Arc::clone(value)]),
            Self::Arguments => class
                .descendants()
                .find(|node| {
                    node.is("method_invocation")
                        && node
                            .child_by_field("name")
                            .is_some_and(|name| name.text() == Some(CALL))
                })
                .and_then(|call| call.child_by_field("arguments"))
                .map(|arguments| inner_children(arguments, "(", ")")),
            Self::Statement => class
                .descendants()
                .find(|node| node.is("method_declaration"))
                .and_then(|method| method.child_by_field("body"))
                .map(|block| inner_children(block, "{", "}")),
            Self::Annotation => {
                let modifiers = class.child_of_kind("modifiers")?;
                let annotations = modifiers.children().to_vec();
                annotations
                    .iter()
                    .all(|node| node.is("marker_annotation") || node.is("annotation"))
                    .then_some(annotations)
            }
            Self::Member => class
                .child_by_field("body")
                .map(|body| inner_children(body, "{", "}")),
        }
    }
}

fn inner_children(node: &Node, open: &str, close: &str) -> Vec<Arc<Node>> {
    node.children()
        .iter()
        .filter(|child| !(child.is(open) || child.is(close)) || child.is_named())
        .cloned()
        .collect()
}

/// Parses `code` in `context` and returns its detached top-level nodes.
///
/// The first node's prefix loses the line break the wrapper put before it.
/// Everything in `code` must land in the fragment.
pub(crate) fn parse(
    context: SnippetContext,
    code: &str,
    imports: &[String],
) -> Result<Vec<Arc<Node>>, String> {
    let unit = context.wrap(code, imports);
    let mut parser = JavaParser::new().map_err(|err| err.to_string())?;
    let (root, _) = parser
        .parse_root(&unit)
        .map_err(|err| err.message().to_owned())?;
    let mut nodes = context
        .extract(&root)
        .ok_or_else(|| format!("not a valid {context}"))?;

    let printed: String = nodes.iter().map(|node| node.print()).collect();
    if compact(&printed) != compact(code) {
        return Err(format!("not a single {context} snippet"));
    }
    if let Some(first) = nodes.first_mut() {
        let prefix = first.prefix();
        let lead = match context {
            SnippetContext::Expression | SnippetContext::Arguments => prefix.trim_start(),
            _ => prefix.strip_prefix('\n').unwrap_or(prefix),
        };
        *first = Arc::new(first.with_prefix(lead).with_field(None));
    }
    Ok(nodes)
}
