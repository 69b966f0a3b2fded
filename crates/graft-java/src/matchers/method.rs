//! Method signature matching.

use graft_core::{Cursor, MethodType, Node, TreeMatcher, TypeHandle};
use regex::Regex;

use super::TypePattern;
use crate::error::JavaError;

#[derive(Debug, Clone)]
enum ParameterPattern {
    /// `..`: any number of parameters.
    Rest,
    Type(TypePattern),
}

/// Matches method and constructor invocations or declarations by signature.
///
/// Patterns read `<declaring type> <name>(<parameters>)`, for example
/// `org.acme.Client send(long, java.util.concurrent.TimeUnit)`. The declaring
/// type is a [`TypePattern`], the name may use `*`, constructors are named
/// `<constructor>`, and `..` in the parameter list stands for any number of
/// parameters. Matching uses resolved types only; an unattributed node never
/// matches.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    pattern: String,
    declaring: TypePattern,
    name: Regex,
    parameters: Vec<ParameterPattern>,
    match_overrides: bool,
}

impl MethodMatcher {
    /// Compiles a method pattern.
    ///
    /// # Errors
    ///
    /// Returns [`JavaError::InvalidPattern`] when the pattern is not of the
    /// form `Type name(params)`.
    pub fn new(pattern: &str) -> Result<Self, JavaError> {
        let invalid = |message: &str| JavaError::invalid_pattern(pattern, message);
        let trimmed = pattern.trim();
        let (declaring, signature) = trimmed
            .split_once(char::is_whitespace)
            .ok_or_else(|| invalid("expected `<type> <method>(<parameters>)`"))?;
        let (name, open) = signature
            .trim_start()
            .split_once('(')
            .ok_or_else(|| invalid("missing `(`"))?;
        let params = open
            .strip_suffix(')')
            .ok_or_else(|| invalid("missing closing `)`"))?;
        if name.is_empty() {
            return Err(invalid("missing method name"));
        }

        let parameters = params
            .split(',')
            .map(str::trim)
            .filter(|param| !param.is_empty())
            .map(|param| match param {
                ".." => Ok(ParameterPattern::Rest),
                other => TypePattern::new(other).map(ParameterPattern::Type),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            pattern: trimmed.to_owned(),
            declaring: TypePattern::new(declaring)?,
            name: name_regex(name).map_err(|err| invalid(&err.to_string()))?,
            parameters,
            match_overrides: false,
        })
    }

    /// Also matches methods whose declaration overrides a method of a
    /// matching supertype.
    #[must_use]
    pub const fn with_overrides(mut self, match_overrides: bool) -> Self {
        self.match_overrides = match_overrides;
        self
    }

    /// Returns the pattern text.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the declaring type pattern.
    #[must_use]
    pub const fn declaring_type(&self) -> &TypePattern {
        &self.declaring
    }

    /// Returns whether a resolved method satisfies the pattern.
    #[must_use]
    pub fn matches_method(&self, method: &MethodType) -> bool {
        if !self.name.is_match(method.name()) {
            return false;
        }
        if !parameters_match(&self.parameters, method.parameter_types()) {
            return false;
        }
        self.declaring.matches(method.declaring().fqn())
            || (self.match_overrides
                && method
                    .overrides()
                    .iter()
                    .any(|parent| self.declaring.matches(parent.fqn())))
    }

    /// Returns whether `node` invokes, creates or declares a matching method.
    #[must_use]
    pub fn matches_node(&self, node: &Node) -> bool {
        matches!(
            node.kind(),
            "method_invocation"
                | "object_creation_expression"
                | "method_declaration"
                | "constructor_declaration"
        ) && node
            .method_type()
            .is_some_and(|method| self.matches_method(method))
    }
}

impl TreeMatcher for MethodMatcher {
    fn matches(&self, cursor: &Cursor<'_>) -> bool {
        self.matches_node(cursor.value())
    }
}

fn name_regex(name: &str) -> Result<Regex, regex::Error> {
    let body: String = name
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");
    Regex::new(&format!("^{body}$"))
}

fn parameters_match(patterns: &[ParameterPattern], types: &[TypeHandle]) -> bool {
    match patterns.split_first() {
        None => types.is_empty(),
        Some((ParameterPattern::Rest, rest)) => (0..=types.len())
            .filter_map(|skip| types.get(skip..))
            .any(|tail| parameters_match(rest, tail)),
        Some((ParameterPattern::Type(pattern), rest)) => types
            .split_first()
            .is_some_and(|(head, tail)| pattern.matches(head.fqn()) && parameters_match(rest, tail)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graft_core::TypeHandle;
    use rstest::rstest;

    fn method(declaring: &str, name: &str, params: &[&str]) -> MethodType {
        let types = params
            .iter()
            .map(|p| {
                if p.contains('.') {
                    TypeHandle::class(*p)
                } else {
                    TypeHandle::primitive(*p)
                }
            })
            .collect();
        MethodType::new(TypeHandle::class(declaring), name, types, None)
    }

    #[rstest]
    #[case::exact("pkg.Type foo(int)", "pkg.Type", "foo", &["int"], true)]
    #[case::other_overload("pkg.Type foo(int)", "pkg.Type", "foo", &["long"], false)]
    #[case::other_type("pkg.Type foo(int)", "pkg.OtherType", "foo", &["int"], false)]
    #[case::arity("pkg.Type foo(int)", "pkg.Type", "foo", &["int", "int"], false)]
    #[case::rest("pkg.Type foo(..)", "pkg.Type", "foo", &["int", "java.lang.String"], true)]
    #[case::rest_empty("pkg.Type foo(..)", "pkg.Type", "foo", &[], true)]
    #[case::rest_tail("pkg.Type foo(int, ..)", "pkg.Type", "foo", &["int", "long", "long"], true)]
    #[case::rest_middle("pkg.Type foo(.., long)", "pkg.Type", "foo", &["int", "long"], true)]
    #[case::rest_middle_miss("pkg.Type foo(.., long)", "pkg.Type", "foo", &["long", "int"], false)]
    #[case::wildcard_name("pkg.Type set*(*)", "pkg.Type", "setName", &["java.lang.String"], true)]
    #[case::wildcard_type("pkg.* foo()", "pkg.Type", "foo", &[], true)]
    #[case::any_declaring_type("* foo(..)", "pkg.Type", "foo", &["int"], true)]
    #[case::any_parameter("pkg.Type send(*)", "pkg.Type", "send", &["java.lang.String"], true)]
    #[case::any_parameter_arity("pkg.Type send(*)", "pkg.Type", "send", &[], false)]
    #[case::constructor("pkg.Type <constructor>(int)", "pkg.Type", "<constructor>", &["int"], true)]
    fn matches_signatures(
        #[case] pattern: &str,
        #[case] declaring: &str,
        #[case] name: &str,
        #[case] params: &[&str],
        #[case] expected: bool,
    ) {
        let matcher = MethodMatcher::new(pattern).expect("pattern");
        assert_eq!(matcher.matches_method(&method(declaring, name, params)), expected);
    }

    #[test]
    fn matches_overrides_only_when_enabled() {
        let overriding = method("p.Task", "run", &[])
            .with_overrides(vec![TypeHandle::class("java.lang.Runnable")]);
        let matcher = MethodMatcher::new("java.lang.Runnable run()").expect("pattern");
        assert!(!matcher.matches_method(&overriding));
        assert!(matcher.with_overrides(true).matches_method(&overriding));
    }

    #[rstest]
    #[case("foo(int)")]
    #[case("pkg.Type foo")]
    #[case("pkg.Type foo(int")]
    fn rejects_malformed_patterns(#[case] pattern: &str) {
        assert!(MethodMatcher::new(pattern).is_err());
    }
}
