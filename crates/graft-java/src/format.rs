//! Indentation utilities for inserted code.

use graft_core::{Body, Node, NodeId};

/// The indentation unit a file uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentStyle {
    /// Indent with this many spaces per level.
    Spaces(usize),
    /// Indent with one tab per level.
    Tabs,
}

impl Default for IndentStyle {
    fn default() -> Self {
        Self::Spaces(4)
    }
}

impl IndentStyle {
    /// Detects the style from the line indentation found in `root`.
    ///
    /// Tabs win when any line starts with one; otherwise the smallest
    /// non-zero space indent is the unit. Defaults to four spaces.
    #[must_use]
    pub fn detect(root: &Node) -> Self {
        let mut smallest: Option<usize> = None;
        for node in root.descendants() {
            let indent = indent_of(node.prefix());
            if indent.starts_with('\t') {
                return Self::Tabs;
            }
            if !indent.is_empty() && node.prefix().contains('\n') {
                let width = indent.len();
                smallest = Some(smallest.map_or(width, |current| current.min(width)));
            }
        }
        smallest.map_or_else(Self::default, Self::Spaces)
    }

    /// Returns one level of indentation.
    #[must_use]
    pub fn unit(self) -> String {
        match self {
            Self::Spaces(width) => " ".repeat(width),
            Self::Tabs => "\t".to_owned(),
        }
    }
}

/// Returns the indentation after the last line break of `prefix`, or `""`
/// when the prefix has no line break.
#[must_use]
pub fn indent_of(prefix: &str) -> &str {
    prefix
        .rsplit_once('\n')
        .map_or("", |(_, last)| {
            let end = last
                .char_indices()
                .find(|(_, c)| !matches!(c, ' ' | '\t'))
                .map_or(last.len(), |(index, _)| index);
            last.get(..end).unwrap_or_default()
        })
}

/// Returns the indentation of the line on which the node `target` starts.
#[must_use]
pub fn line_indent(root: &Node, target: NodeId) -> Option<String> {
    let mut printed = String::new();
    if !print_until(root, target, &mut printed) {
        return None;
    }
    let line = printed.rsplit('\n').next().unwrap_or_default();
    Some(
        line.chars()
            .take_while(|c| matches!(c, ' ' | '\t'))
            .collect(),
    )
}

fn print_until(node: &Node, target: NodeId, out: &mut String) -> bool {
    out.push_str(node.prefix());
    if node.id() == target {
        return true;
    }
    match node.body() {
        Body::Token(text) => {
            out.push_str(text);
            false
        }
        Body::Branch(children) => children.iter().any(|child| print_until(child, target, out)),
    }
}

/// Shifts every line of a freshly parsed fragment onto `base`, converting
/// its four-space levels into `style`.
///
/// Only prefixes are rewritten; token text such as text blocks is kept.
#[must_use]
pub fn reindent(node: &Node, base: &str, style: IndentStyle) -> Node {
    let prefix = shift_lines(node.prefix(), base, style);
    match node.body() {
        Body::Token(_) => node.with_prefix(prefix),
        Body::Branch(children) => node
            .with_children(
                children
                    .iter()
                    .map(|child| std::sync::Arc::new(reindent(child, base, style)))
                    .collect(),
            )
            .with_prefix(prefix),
    }
}

fn shift_lines(prefix: &str, base: &str, style: IndentStyle) -> String {
    let mut lines = prefix.split('\n').peekable();
    let mut out = lines.next().unwrap_or_default().to_owned();
    let unit = style.unit();
    while let Some(line) = lines.next() {
        out.push('\n');
        // Blank lines inside the prefix stay free of trailing whitespace.
        if line.is_empty() && lines.peek().is_some() {
            continue;
        }
        let mut rest = line;
        let mut levels = 0;
        loop {
            if let Some(tail) = rest.strip_prefix("    ") {
                rest = tail;
            } else if let Some(tail) = rest.strip_prefix('\t') {
                rest = tail;
            } else {
                break;
            }
            levels += 1;
        }
        out.push_str(base);
        out.push_str(&unit.repeat(levels));
        out.push_str(rest);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_java;
    use rstest::rstest;

    #[rstest]
    #[case("class A {\n    int x;\n}\n", IndentStyle::Spaces(4))]
    #[case("class A {\n  int x;\n  void f() {\n    g();\n  }\n}\n", IndentStyle::Spaces(2))]
    #[case("class A {\n\tint x;\n}\n", IndentStyle::Tabs)]
    #[case("class A {}", IndentStyle::Spaces(4))]
    fn detects_indent_style(#[case] text: &str, #[case] expected: IndentStyle) {
        let file = parse_java("A.java", text).expect("parse");
        assert_eq!(IndentStyle::detect(file.root()), expected);
    }

    #[rstest]
    #[case("\n    ", "    ")]
    #[case("\n\n  // note\n  ", "  ")]
    #[case(" ", "")]
    fn reads_indent_of_prefix(#[case] prefix: &str, #[case] expected: &str) {
        assert_eq!(indent_of(prefix), expected);
    }

    #[test]
    fn finds_line_indent_of_nested_node() {
        let file = parse_java("A.java", "class A {\n    void f() { g(); }\n}\n").expect("parse");
        let call = file
            .root()
            .descendants()
            .find(|node| node.is("method_invocation"))
            .expect("call");
        assert_eq!(line_indent(file.root(), call.id()).as_deref(), Some("    "));
    }

    #[test]
    fn shifts_fragment_lines_onto_base() {
        assert_eq!(
            shift_lines("\n    x", "  ", IndentStyle::Spaces(2)),
            "\n    x"
        );
        assert_eq!(shift_lines("\n\tx", "\t", IndentStyle::Tabs), "\n\t\tx");
        assert_eq!(shift_lines(" ", "    ", IndentStyle::Spaces(4)), " ");
    }
}
