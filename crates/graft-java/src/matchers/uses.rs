//! Preconditions on the types and methods a Java file uses.

use graft_core::{Language, Precondition, SourceFile, TypeAttribution};

use super::{MethodMatcher, TypePattern};
use crate::error::JavaError;

/// Applicable to Java files referring to a matching type anywhere: imports,
/// declarations, casts, generic arguments, expressions and invoked methods'
/// declaring types.
#[derive(Debug, Clone)]
pub struct UsesType {
    pattern: TypePattern,
}

impl UsesType {
    /// Creates the precondition from a [`TypePattern`] string.
    ///
    /// # Errors
    ///
    /// Returns [`JavaError::InvalidPattern`] for malformed patterns.
    pub fn new(pattern: &str) -> Result<Self, JavaError> {
        Ok(Self {
            pattern: TypePattern::new(pattern)?,
        })
    }

    fn references(&self, attribution: &TypeAttribution) -> bool {
        match attribution {
            TypeAttribution::Type(handle) => {
                let element = handle.fqn().trim_end_matches("[]");
                self.pattern.matches(element)
            }
            TypeAttribution::Method(method) => self.pattern.matches(method.declaring().fqn()),
        }
    }
}

impl Precondition for UsesType {
    fn is_applicable(&self, file: &SourceFile) -> bool {
        file.language() == Language::Java
            && file
                .root()
                .descendants()
                .filter_map(|node| node.attribution())
                .any(|attribution| self.references(attribution))
    }

    fn describe(&self) -> String {
        format!("uses type {}", self.pattern)
    }
}

/// Applicable to Java files invoking, creating or declaring a method that
/// satisfies a [`MethodMatcher`].
#[derive(Debug, Clone)]
pub struct UsesMethod {
    matcher: MethodMatcher,
}

impl UsesMethod {
    /// Wraps an existing matcher.
    #[must_use]
    pub const fn new(matcher: MethodMatcher) -> Self {
        Self { matcher }
    }

    /// Compiles a method pattern into the precondition.
    ///
    /// # Errors
    ///
    /// Returns [`JavaError::InvalidPattern`] for malformed patterns.
    pub fn pattern(pattern: &str) -> Result<Self, JavaError> {
        MethodMatcher::new(pattern).map(Self::new)
    }
}

impl Precondition for UsesMethod {
    fn is_applicable(&self, file: &SourceFile) -> bool {
        file.language() == Language::Java
            && file
                .root()
                .descendants()
                .any(|node| self.matcher.matches_node(node))
    }

    fn describe(&self) -> String {
        format!("uses method {}", self.matcher.pattern())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::classpath::Classpath;
    use crate::parser::JavaParser;
    use rstest::rstest;

    fn parse(text: &str) -> SourceFile {
        let classpath = Arc::new(
            Classpath::from_sources(&[
                "package org.acme;\npublic class Client { public void send(int x) {} }",
                "package org.other;\npublic class Client { public void send(int x) {} }",
            ])
            .expect("stubs"),
        );
        JavaParser::new()
            .expect("parser")
            .with_classpath(classpath)
            .parse("T.java", text)
            .expect("parse")
    }

    #[rstest]
    #[case::imported("import org.acme.Client;\nclass T {}", true)]
    #[case::qualified_field("class T { org.acme.Client c; }", true)]
    #[case::same_simple_name("import org.other.Client;\nclass T { Client c; }", false)]
    #[case::cast("class T { Object f(Object o) { return (org.acme.Client) o; } }", true)]
    #[case::unrelated("class T { String s; }", false)]
    fn detects_type_references(#[case] text: &str, #[case] expected: bool) {
        let uses = UsesType::new("org.acme.Client").expect("pattern");
        assert_eq!(uses.is_applicable(&parse(text)), expected);
    }

    #[rstest]
    #[case("import org.acme.Client;\nclass T { Client c; void f() { c.send(1); } }", true)]
    #[case("import org.other.Client;\nclass T { Client c; void f() { c.send(1); } }", false)]
    fn detects_method_usage(#[case] text: &str, #[case] expected: bool) {
        let uses = UsesMethod::pattern("org.acme.Client send(int)").expect("pattern");
        assert_eq!(uses.is_applicable(&parse(text)), expected);
    }

    #[rstest]
    #[case::any_declaring_type("* send(int)")]
    #[case::any_parameter("org.acme.Client send(*)")]
    #[case::any_type_usage("*")]
    fn bare_wildcards_match_qualified_types(#[case] pattern: &str) {
        let file = parse("import org.acme.Client;\nclass T { Client c; void f() { c.send(1); } }");
        let applicable = if pattern.contains('(') {
            UsesMethod::pattern(pattern).expect("pattern").is_applicable(&file)
        } else {
            UsesType::new(pattern).expect("pattern").is_applicable(&file)
        };
        assert!(applicable, "{pattern}");
    }
}
