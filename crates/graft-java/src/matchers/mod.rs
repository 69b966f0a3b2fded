//! Java matchers and preconditions.

mod annotation;
mod method;
mod type_pattern;
mod uses;

pub use annotation::AnnotationMatcher;
pub use method::MethodMatcher;
pub use type_pattern::TypePattern;
pub use uses::{UsesMethod, UsesType};
