//! Annotation matching, including meta-annotations.

use std::collections::HashSet;
use std::sync::Arc;

use graft_core::{Cursor, Node, TreeMatcher};

use super::TypePattern;
use crate::classpath::{ClassLookup, Classpath};
use crate::error::JavaError;
use crate::syntax;

/// Matches annotations by fully-qualified type.
///
/// The pattern is a [`TypePattern`], optionally prefixed with `@`. With a
/// classpath attached through [`AnnotationMatcher::with_meta_annotations`],
/// an annotation also matches when its type is itself annotated, directly or
/// transitively, with a matching annotation.
#[derive(Debug, Clone)]
pub struct AnnotationMatcher {
    pattern: TypePattern,
    meta: Option<Arc<Classpath>>,
}

impl AnnotationMatcher {
    /// Compiles an annotation pattern such as `@org.junit.Test`.
    ///
    /// # Errors
    ///
    /// Returns [`JavaError::InvalidPattern`] when the type pattern is
    /// malformed.
    pub fn new(pattern: &str) -> Result<Self, JavaError> {
        let name = pattern.trim();
        let bare = name.strip_prefix('@').unwrap_or(name);
        let without_args = bare.split_once('(').map_or(bare, |(head, _)| head);
        Ok(Self {
            pattern: TypePattern::new(without_args)?,
            meta: None,
        })
    }

    /// Enables matching through meta-annotations recorded on `classpath`.
    #[must_use]
    pub fn with_meta_annotations(mut self, classpath: Arc<Classpath>) -> Self {
        self.meta = Some(classpath);
        self
    }

    /// Returns the annotation type pattern.
    #[must_use]
    pub const fn pattern(&self) -> &TypePattern {
        &self.pattern
    }

    /// Returns whether `fqn` names a matching annotation type.
    #[must_use]
    pub fn matches_type(&self, fqn: &str) -> bool {
        if self.pattern.matches(fqn) {
            return true;
        }
        let Some(classpath) = &self.meta else {
            return false;
        };
        let mut seen = HashSet::new();
        let mut pending = vec![fqn.to_owned()];
        while let Some(current) = pending.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            let Some(info) = classpath.class(&current) else {
                continue;
            };
            for meta in info.annotations() {
                if self.pattern.matches(meta) {
                    return true;
                }
                pending.push(meta.clone());
            }
        }
        false
    }

    /// Returns whether `node` is a matching, attributed annotation.
    #[must_use]
    pub fn matches_node(&self, node: &Node) -> bool {
        (node.is("annotation") || node.is("marker_annotation"))
            && node
                .type_handle()
                .is_some_and(|handle| self.matches_type(handle.fqn()))
    }

    /// Returns whether any annotation on `declaration` matches.
    #[must_use]
    pub fn annotates(&self, declaration: &Node) -> bool {
        syntax::annotations(declaration).any(|annotation| self.matches_node(annotation))
    }
}

impl TreeMatcher for AnnotationMatcher {
    fn matches(&self, cursor: &Cursor<'_>) -> bool {
        self.matches_node(cursor.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classpath::ClassInfo;
    use graft_core::{Cursor, TypeAttribution, TypeHandle, TypeKind};
    use rstest::rstest;

    fn annotation(fqn: &str) -> Node {
        Node::branch("marker_annotation", Vec::new()).with_attribution(Some(
            TypeAttribution::Type(TypeHandle::new(fqn, TypeKind::Annotation)),
        ))
    }

    #[rstest]
    #[case("@org.junit.Test", "org.junit.Test", true)]
    #[case("org.junit.Test", "org.junit.Test", true)]
    #[case("@org.junit.*", "org.junit.Test", true)]
    #[case("@org.junit.Test(timeout = 1)", "org.junit.Test", true)]
    #[case("@org.junit.Test", "org.testng.Test", false)]
    fn matches_by_type(#[case] pattern: &str, #[case] fqn: &str, #[case] expected: bool) {
        let matcher = AnnotationMatcher::new(pattern).expect("pattern");
        let node = Arc::new(annotation(fqn));
        assert_eq!(matcher.matches(&Cursor::root(node)), expected);
    }

    #[test]
    fn unattributed_annotations_never_match() {
        let matcher = AnnotationMatcher::new("@*..*").expect("pattern");
        assert!(!matcher.matches_node(&Node::branch("marker_annotation", Vec::new())));
    }

    #[test]
    fn follows_meta_annotations_when_enabled() {
        let classpath = Arc::new(
            Classpath::jdk()
                .with(ClassInfo::annotation("org.acme.Transactional"))
                .with(ClassInfo::annotation("org.acme.Service").annotated("org.acme.Transactional"))
                .with(ClassInfo::annotation("org.acme.Repository").annotated("org.acme.Service")),
        );
        let matcher = AnnotationMatcher::new("@org.acme.Transactional").expect("pattern");
        assert!(!matcher.matches_type("org.acme.Repository"));
        let meta = matcher.with_meta_annotations(classpath);
        assert!(meta.matches_type("org.acme.Repository"));
        assert!(!meta.matches_type("java.lang.Override"));
    }
}
