//! A small XPath subset for locating elements and attributes.
//!
//! Supported: absolute (`/a/b`) and relative (`b/c`, matched at any depth)
//! paths, the descendant axis `//`, the `*` wildcard, a trailing attribute
//! step `@name`, and predicates `[child='v']`, `[@attr='v']` and
//! `[text()='v']`.

use std::fmt;
use std::sync::Arc;

use graft_core::{Cursor, Node, TreeMatcher};

use super::tags::{ATTRIBUTE, ELEMENT, attribute, attribute_name, child_text, tag_name, text};
use crate::error::MarkupError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Predicate {
    Attribute { name: String, value: String },
    Child { name: String, value: String },
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    /// `None` for `*`.
    name: Option<String>,
    predicates: Vec<Predicate>,
}

impl Step {
    fn accepts_name(&self, name: Option<&str>) -> bool {
        self.name.as_deref().is_none_or(|wanted| Some(wanted) == name)
    }

    fn accepts(&self, element: &Node) -> bool {
        self.accepts_name(tag_name(element))
            && self.predicates.iter().all(|predicate| match predicate {
                Predicate::Attribute { name, value } => {
                    attribute(element, name).as_deref() == Some(value.as_str())
                }
                Predicate::Child { name, value } => {
                    child_text(element, name).as_deref() == Some(value.as_str())
                }
                Predicate::Text(value) => text(element) == *value,
            })
    }
}

/// Matches elements or attributes by their position in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XPathMatcher {
    expression: String,
    steps: Vec<Step>,
    attribute: Option<Step>,
}

impl XPathMatcher {
    /// Parses an expression.
    ///
    /// # Errors
    ///
    /// Returns [`MarkupError::InvalidPath`] for empty steps, unbalanced
    /// predicates or attribute steps that are not last.
    pub fn new(expression: &str) -> Result<Self, MarkupError> {
        let invalid = |message: &str| MarkupError::invalid_path(expression, message);
        let trimmed = expression.trim();
        if trimmed.is_empty() {
            return Err(invalid("empty expression"));
        }
        let (absolute, body) = trimmed
            .strip_prefix('/')
            .map_or((false, trimmed), |rest| (true, rest));

        let mut steps = Vec::new();
        let mut attribute_step = None;
        let mut axis = if absolute { Axis::Child } else { Axis::Descendant };
        let raw_steps = split_steps(body).map_err(|message| invalid(&message))?;
        let count = raw_steps.len();
        for (index, raw) in raw_steps.into_iter().enumerate() {
            if raw.is_empty() {
                // An empty step between two slashes is the `//` axis.
                if index + 1 == count {
                    return Err(invalid("trailing slash"));
                }
                axis = Axis::Descendant;
                continue;
            }
            let step = parse_step(&raw, axis).map_err(|message| invalid(&message))?;
            axis = Axis::Child;
            if let Some(name) = raw.strip_prefix('@') {
                if index + 1 != count {
                    return Err(invalid("attribute steps must come last"));
                }
                attribute_step = Some(Step {
                    name: (name != "*").then(|| name.to_owned()),
                    ..step
                });
            } else {
                steps.push(step);
            }
        }
        if steps.is_empty() {
            return Err(invalid("no element step"));
        }
        Ok(Self {
            expression: expression.to_owned(),
            steps,
            attribute: attribute_step,
        })
    }

    /// Returns the expression as written.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Returns whether the element path (root first) and optional attribute
    /// match the expression.
    #[must_use]
    pub fn matches_path(&self, elements: &[&Node], attribute_node: Option<&Node>) -> bool {
        match (&self.attribute, attribute_node) {
            (Some(step), Some(attr)) => {
                if !step.accepts_name(attribute_name(attr)) {
                    return false;
                }
            }
            (None, None) => {}
            _ => return false,
        }
        match_steps(&self.steps, elements, 0)
    }
}

fn match_steps(steps: &[Step], elements: &[&Node], from: usize) -> bool {
    let Some((step, rest)) = steps.split_first() else {
        return from == elements.len();
    };
    let candidates = match step.axis {
        Axis::Child => from..(from + 1).min(elements.len()),
        Axis::Descendant => from..elements.len(),
    };
    candidates.into_iter().any(|index| {
        elements
            .get(index)
            .is_some_and(|element| step.accepts(element))
            && match_steps(rest, elements, index + 1)
    })
}

impl TreeMatcher for XPathMatcher {
    fn matches(&self, cursor: &Cursor<'_>) -> bool {
        let node = cursor.value();
        let attribute_node = node.is(ATTRIBUTE).then_some(node.as_ref());
        if attribute_node.is_none() && !node.is(ELEMENT) {
            return false;
        }
        let mut elements: Vec<&Node> = cursor
            .ancestors()
            .map(|ancestor| ancestor.value().as_ref())
            .filter(|ancestor| ancestor.is(ELEMENT))
            .collect();
        elements.reverse();
        self.matches_path(&elements, attribute_node)
    }
}

impl fmt::Display for XPathMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expression)
    }
}

/// Splits on `/` outside predicates and quotes.
fn split_steps(body: &str) -> Result<Vec<String>, String> {
    let mut steps = Vec::new();
    let mut current = String::new();
    let mut depth = 0_usize;
    let mut quote: Option<char> = None;
    for c in body.chars() {
        match (c, quote) {
            ('\'' | '"', None) => quote = Some(c),
            (q, Some(open)) if q == open => quote = None,
            ('[', None) => depth += 1,
            (']', None) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| "unbalanced `]`".to_owned())?;
            }
            ('/', None) if depth == 0 => {
                steps.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }
    if depth != 0 || quote.is_some() {
        return Err("unterminated predicate".to_owned());
    }
    steps.push(current);
    Ok(steps)
}

fn parse_step(raw: &str, axis: Axis) -> Result<Step, String> {
    let (head, mut rest) = raw.find('[').map_or((raw, ""), |at| {
        (raw.get(..at).unwrap_or_default(), raw.get(at..).unwrap_or_default())
    });
    let name = head.trim_start_matches('@').trim();
    if name.is_empty() {
        return Err(format!("missing name in step `{raw}`"));
    }
    let mut predicates = Vec::new();
    while let Some(open) = rest.strip_prefix('[') {
        let close = open
            .find(']')
            .ok_or_else(|| format!("unterminated predicate in `{raw}`"))?;
        predicates.push(parse_predicate(open.get(..close).unwrap_or_default())?);
        rest = open.get(close + 1..).unwrap_or_default();
    }
    if !rest.is_empty() {
        return Err(format!("unexpected `{rest}` in step `{raw}`"));
    }
    Ok(Step {
        axis,
        name: (name != "*").then(|| name.to_owned()),
        predicates,
    })
}

fn parse_predicate(body: &str) -> Result<Predicate, String> {
    let (left, right) = body
        .split_once('=')
        .ok_or_else(|| format!("predicate `{body}` must compare with `=`"))?;
    let value = right
        .trim()
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .or_else(|| right.trim().strip_prefix('"').and_then(|v| v.strip_suffix('"')))
        .ok_or_else(|| format!("predicate value in `{body}` must be quoted"))?
        .to_owned();
    let subject = left.trim();
    Ok(if subject == "text()" {
        Predicate::Text(value)
    } else if let Some(name) = subject.strip_prefix('@') {
        Predicate::Attribute {
            name: name.to_owned(),
            value,
        }
    } else {
        Predicate::Child {
            name: subject.to_owned(),
            value,
        }
    })
}

/// Returns the nodes under `root` matching `matcher`, in document order.
#[must_use]
pub fn find_all(root: &Arc<Node>, matcher: &XPathMatcher) -> Vec<Arc<Node>> {
    fn walk(cursor: &Cursor<'_>, matcher: &XPathMatcher, out: &mut Vec<Arc<Node>>) {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_xml;
    use rstest::{fixture, rstest};

    const POM: &str = "<project>\n  <properties>\n    <java.version>17</java.version>\n  </properties>\n  <dependencies>\n    <dependency>\n      <groupId>org.acme</groupId>\n      <artifactId>core</artifactId>\n      <version>1.0</version>\n    </dependency>\n    <dependency scope=\"test\">\n      <groupId>org.junit</groupId>\n      <artifactId>junit</artifactId>\n      <version>4.13</version>\n    </dependency>\n  </dependencies>\n</project>\n";

    #[fixture]
    fn pom() -> Arc<Node> {
        Arc::clone(parse_xml("pom.xml", POM).expect("parse").root())
    }

    fn texts(root: &Arc<Node>, expression: &str) -> Vec<String> {
        let matcher = XPathMatcher::new(expression).expect("valid");
        find_all(root, &matcher)
            .iter()
            .map(|node| {
                if node.is(ATTRIBUTE) {
                    node.print_trimmed()
                } else {
                    text(node)
                }
            })
            .collect()
    }

    #[rstest]
    #[case("/project/dependencies/dependency/version", &["1.0", "4.13"])]
    #[case("//version", &["1.0", "4.13"])]
    #[case("dependency/groupId", &["org.acme", "org.junit"])]
    #[case("/project/*/java.version", &["17"])]
    #[case("//dependency[groupId='org.junit']/version", &["4.13"])]
    #[case("//dependency[@scope='test']/artifactId", &["junit"])]
    #[case("//artifactId[text()='core']", &["core"])]
    #[case("//dependency/@scope", &["scope=\"test\""])]
    #[case("/version", &[])]
    #[case("/project/version", &[])]
    fn selects_nodes(pom: Arc<Node>, #[case] expression: &str, #[case] expected: &[&str]) {
        assert_eq!(texts(&pom, expression), expected);
    }

    #[rstest]
    #[case("")]
    #[case("/a/")]
    #[case("/a/@b/c")]
    #[case("/a[b='c'")]
    #[case("/a[b=c]")]
    #[case("/@id")]
    fn rejects_malformed_expressions(#[case] expression: &str) {
        assert!(XPathMatcher::new(expression).is_err());
    }
}
