//! Java properties files.

mod entries;
mod escape;
mod parser;
mod visitor;

pub use entries::{entry_key, entry_value, is_property, with_key, with_value};
pub use escape::{escape_key, escape_value, unescape};
pub use parser::{ENTRY, PROPERTIES, parse_properties};
pub use visitor::{Properties, PropertiesVisitor, dispatch, properties, visit_children};
