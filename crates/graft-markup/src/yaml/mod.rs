//! YAML documents: parsing, visiting, entry helpers and JsonPath matching.

mod entries;
mod json_path;
mod parser;
mod visitor;

pub use entries::{
    ENTRY_KINDS, PathSegment, dotted_key, entry_key, entry_scalar, entry_value, is_entry,
    is_scalar, path_of, scalar_in, scalar_value, with_entry_key, with_entry_value,
    with_scalar_value,
};
pub use json_path::{JsonPathMatcher, find_members};
pub use parser::{YAML_COLLAPSED_KINDS, YamlParser, parse_yaml};
pub use visitor::{Yaml, YamlKind, YamlVisitor, dispatch, visit_children, yaml};
