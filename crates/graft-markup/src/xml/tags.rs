//! Reading and editing XML elements.

use std::sync::Arc;

use graft_core::Node;

/// Grammar kind of an element.
pub const ELEMENT: &str = "element";
/// Grammar kind of an attribute.
pub const ATTRIBUTE: &str = "Attribute";

const START_TAG: &str = "STag";
const END_TAG: &str = "ETag";
const EMPTY_TAG: &str = "EmptyElemTag";
const CONTENT: &str = "content";
const NAME: &str = "Name";
const ATT_VALUE: &str = "AttValue";
const CHAR_DATA: &str = "CharData";

/// Returns the start tag (or the self-closing tag) of an element.
#[must_use]
pub fn start_tag(element: &Node) -> Option<&Arc<Node>> {
    element
        .children()
        .iter()
        .find(|child| child.is(START_TAG) || child.is(EMPTY_TAG))
}

/// Returns the tag name of an element.
#[must_use]
pub fn tag_name(element: &Node) -> Option<&str> {
    start_tag(element)?.child_of_kind(NAME)?.text()
}

/// Iterates over the attributes of an element in source order.
pub fn attributes(element: &Node) -> impl Iterator<Item = &Arc<Node>> {
    start_tag(element)
        .into_iter()
        .flat_map(|tag| tag.children().iter())
        .filter(|child| child.is(ATTRIBUTE))
}

/// Returns the name of an attribute.
#[must_use]
pub fn attribute_name(attribute: &Node) -> Option<&str> {
    attribute.child_of_kind(NAME)?.text()
}

/// Returns the unquoted, unescaped value of an attribute.
#[must_use]
pub fn attribute_value(attribute: &Node) -> Option<String> {
    let raw = attribute.child_of_kind(ATT_VALUE)?.print_trimmed();
    let inner = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .or_else(|| raw.strip_prefix('\'').and_then(|rest| rest.strip_suffix('\'')))
        .unwrap_or(&raw);
    Some(unescape(inner))
}

/// Returns the value of the attribute `name` on `element`.
#[must_use]
pub fn attribute(element: &Node, name: &str) -> Option<String> {
    attributes(element)
        .find(|attr| attribute_name(attr) == Some(name))
        .and_then(|attr| attribute_value(attr))
}

/// Iterates over the child elements of an element.
pub fn child_elements(element: &Node) -> impl Iterator<Item = &Arc<Node>> {
    element
        .child_of_kind(CONTENT)
        .into_iter()
        .flat_map(|content| content.children().iter())
        .filter(|child| child.is(ELEMENT))
}

/// Returns the first child element named `name`.
#[must_use]
pub fn child_element<'a>(element: &'a Node, name: &str) -> Option<&'a Arc<Node>> {
    child_elements(element).find(|child| tag_name(child) == Some(name))
}

/// Returns the trimmed, unescaped character data directly inside an element.
///
/// Self-closing and empty elements yield an empty string.
#[must_use]
pub fn text(element: &Node) -> String {
    let raw: String = element
        .child_of_kind(CONTENT)
        .into_iter()
        .flat_map(|content| content.children().iter())
        .filter(|child| !child.is(ELEMENT) && !child.is("Comment"))
        .map(|child| child.print())
        .collect();
    unescape(raw.trim())
}

/// Returns the text of the first child element named `name`.
#[must_use]
pub fn child_text(element: &Node, name: &str) -> Option<String> {
    child_element(element, name).map(|child| text(child))
}

/// Returns a copy of a leaf element holding `value` as its only content.
///
/// Self-closing elements are expanded into start and end tags.
#[must_use]
pub fn with_text(element: &Node, value: &str) -> Node {
    let content = Arc::new(Node::branch(
        CONTENT,
        vec![Arc::new(Node::token(CHAR_DATA, escape(value, false)))],
    ));
    let children = element.children();
    if let Some(index) = children.iter().position(|child| child.is(CONTENT)) {
        return element.with_child(index, content);
    }
    if let Some(end) = children.iter().position(|child| child.is(END_TAG)) {
        return element.with_inserted_child(end, content);
    }
    let Some((index, empty)) = children
        .iter()
        .enumerate()
        .find(|(_, child)| child.is(EMPTY_TAG))
    else {
        return element.clone();
    };
    let name = tag_name(element).unwrap_or_default();
    let mut open: Vec<Arc<Node>> = empty.children().to_vec();
    if let Some(close) = open.last_mut() {
        if close.is("/>") {
            *close = Arc::new(Node::punctuation(">"));
        }
    }
    let start = Arc::new(Node::branch(START_TAG, open));
    let end = Arc::new(Node::branch(
        END_TAG,
        vec![
            Arc::new(Node::punctuation("</")),
            Arc::new(Node::token(NAME, name)),
            Arc::new(Node::punctuation(">")),
        ],
    ));
    let before = children.get(..index).unwrap_or_default();
    let after = children.get(index + 1..).unwrap_or_default();
    let rebuilt = before
        .iter()
        .cloned()
        .chain([start, content, end])
        .chain(after.iter().cloned())
        .collect();
    element.with_children(rebuilt)
}

/// Returns a copy of an attribute holding `value`, keeping its quote style.
#[must_use]
pub fn with_attribute_value(attribute: &Node, value: &str) -> Node {
    let Some(index) = attribute
        .children()
        .iter()
        .position(|child| child.is(ATT_VALUE))
    else {
        return attribute.clone();
    };
    let quote = attribute
        .children()
        .get(index)
        .and_then(|old| old.print_trimmed().chars().next())
        .filter(|c| *c == '\'')
        .unwrap_or('"');
    let token = Node::token(ATT_VALUE, format!("{quote}{}{quote}", escape(value, true)));
    let prefix = attribute
        .children()
        .get(index)
        .map(|old| old.prefix().to_owned())
        .unwrap_or_default();
    attribute.with_child(index, Arc::new(token.with_prefix(prefix)))
}

/// Escapes markup characters for character data or attribute values.
#[must_use]
pub fn escape(value: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\'' if attribute => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// Resolves the predefined entities and numeric character references.
#[must_use]
pub fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find('&') {
        out.push_str(rest.get(..start).unwrap_or_default());
        let tail = rest.get(start..).unwrap_or_default();
        let Some(end) = tail.find(';') else {
            out.push_str(tail);
            return out;
        };
        let entity = tail.get(1..end).unwrap_or_default();
        match decode_entity(entity) {
            Some(c) => out.push(c),
            None => out.push_str(tail.get(..=end).unwrap_or_default()),
        }
        rest = tail.get(end + 1..).unwrap_or_default();
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let number = entity.strip_prefix('#')?;
            let code = match number.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => number.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_xml;
    use rstest::rstest;

    const POM: &str = "<project>\n  <dependency scope='test'>\n    <groupId>org.acme</groupId>\n    <version>1.0</version>\n    <optional/>\n  </dependency>\n</project>\n";

    fn dependency(root: &Node) -> Node {
        root.descendants()
            .find(|node| node.is(ELEMENT) && tag_name(node) == Some("dependency"))
            .expect("dependency")
            .clone()
    }

    #[test]
    fn reads_names_text_and_attributes() {
        let file = parse_xml("pom.xml", POM).expect("parse");
        let dep = dependency(file.root());
        let names: Vec<&str> = child_elements(&dep).filter_map(|c| tag_name(c)).collect();
        assert_eq!(names, vec!["groupId", "version", "optional"]);
        assert_eq!(child_text(&dep, "groupId").as_deref(), Some("org.acme"));
        assert_eq!(child_text(&dep, "optional").as_deref(), Some(""));
        assert_eq!(attribute(&dep, "scope").as_deref(), Some("test"));
    }

    #[test]
    fn replaces_text_in_place() {
        let file = parse_xml("pom.xml", POM).expect("parse");
        let dep = dependency(file.root());
        let version = child_element(&dep, "version").expect("version");
        let updated = Arc::new(with_text(version, "2.0 & up"));
        let root = file.root().replace_descendant(version.id(), &updated).expect("replaced");
        assert!(root.print().contains("<version>2.0 &amp; up</version>"));
    }

    #[test]
    fn expands_self_closing_elements() {
        let file = parse_xml("pom.xml", POM).expect("parse");
        let dep = dependency(file.root());
        let optional = child_element(&dep, "optional").expect("optional");
        assert_eq!(with_text(optional, "true").print_trimmed(), "<optional>true</optional>");
    }

    #[test]
    fn keeps_attribute_quotes() {
        let file = parse_xml("pom.xml", POM).expect("parse");
        let dep = dependency(file.root());
        let scope = attributes(&dep).next().expect("scope");
        assert_eq!(with_attribute_value(scope, "compile").print_trimmed(), "scope='compile'");
    }

    #[rstest]
    #[case("a &amp; b", "a & b")]
    #[case("&lt;x&gt;", "<x>")]
    #[case("&#65;&#x42;", "AB")]
    #[case("&unknown; &", "&unknown; &")]
    fn unescapes_references(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(unescape(raw), expected);
    }
}
