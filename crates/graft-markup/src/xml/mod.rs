//! XML documents: parsing, visiting, element helpers and XPath matching.

mod parser;
mod tags;
mod visitor;
mod xpath;

pub use parser::{XML_COLLAPSED_KINDS, XmlParser, parse_xml};
pub use tags::{
    ATTRIBUTE, ELEMENT, attribute, attribute_name, attribute_value, attributes, child_element,
    child_elements, child_text, escape, start_tag, tag_name, text, unescape, with_attribute_value,
    with_text,
};
pub use visitor::{Xml, XmlKind, XmlVisitor, dispatch, visit_children, xml};
pub use xpath::{XPathMatcher, find_all};
