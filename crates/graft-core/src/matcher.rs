//! Matcher and precondition abstractions shared by every language.
//!
//! A [`TreeMatcher`] is a pure predicate over a cursor: it never mutates the
//! tree and answers the same way for the same input. A [`Precondition`] is
//! the file-level counterpart, used to skip whole files before any visitor
//! runs on them.

use std::sync::Arc;

use crate::context::ExecutionContext;
use crate::cursor::Cursor;
use crate::tree::{Node, SourceFile};
use crate::visitor::TreeVisitor;

/// A side-effect-free predicate over a node and its ancestors.
pub trait TreeMatcher: Send + Sync {
    /// Returns whether the node under `cursor` matches.
    fn matches(&self, cursor: &Cursor<'_>) -> bool;
}

impl<F> TreeMatcher for F
where
    F: Fn(&Cursor<'_>) -> bool + Send + Sync,
{
    fn matches(&self, cursor: &Cursor<'_>) -> bool {
        self(cursor)
    }
}

/// Matches when every inner matcher matches.
pub struct AllOf(Vec<Box<dyn TreeMatcher>>);

/// Matches when at least one inner matcher matches.
pub struct AnyOf(Vec<Box<dyn TreeMatcher>>);

/// Inverts an inner matcher.
pub struct Not(Box<dyn TreeMatcher>);

/// Combines matchers with logical AND.
#[must_use]
pub fn all_of(matchers: Vec<Box<dyn TreeMatcher>>) -> AllOf {
    AllOf(matchers)
}

/// Combines matchers with logical OR.
#[must_use]
pub fn any_of(matchers: Vec<Box<dyn TreeMatcher>>) -> AnyOf {
    AnyOf(matchers)
}

/// Negates a matcher.
#[must_use]
pub fn not(matcher: Box<dyn TreeMatcher>) -> Not {
    Not(matcher)
}

impl TreeMatcher for AllOf {
    fn matches(&self, cursor: &Cursor<'_>) -> bool {
        self.0.iter().all(|matcher| matcher.matches(cursor))
    }
}

impl TreeMatcher for AnyOf {
    fn matches(&self, cursor: &Cursor<'_>) -> bool {
        self.0.iter().any(|matcher| matcher.matches(cursor))
    }
}

impl TreeMatcher for Not {
    fn matches(&self, cursor: &Cursor<'_>) -> bool {
        !self.0.matches(cursor)
    }
}

/// Returns whether any node of `root` matches, visiting with full cursors.
#[must_use]
pub fn any_node_matches(root: &Arc<Node>, matcher: &dyn TreeMatcher) -> bool {
    fn walk(cursor: &Cursor<'_>, matcher: &dyn TreeMatcher) -> bool {
        matcher.matches(cursor)
            || cursor
                .value()
                .children()
                .iter()
                .any(|child| walk(&cursor.child(Arc::clone(child)), matcher))
    }
    walk(&Cursor::root(Arc::clone(root)), matcher)
}

/// A cheap file-level guard deciding whether a recipe may touch a file.
pub trait Precondition: Send + Sync {
    /// Returns whether the file may be edited.
    fn is_applicable(&self, file: &SourceFile) -> bool;

    /// Describes the guard for logs.
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_owned()
    }
}

/// Applicable when every inner precondition is.
pub struct AllPreconditions(Vec<Box<dyn Precondition>>);

/// Applicable when at least one inner precondition is.
pub struct AnyPrecondition(Vec<Box<dyn Precondition>>);

/// Applicable when the inner precondition is not.
pub struct NotPrecondition(Box<dyn Precondition>);

impl AllPreconditions {
    /// Combines preconditions with logical AND.
    #[must_use]
    pub fn new(preconditions: Vec<Box<dyn Precondition>>) -> Self {
        Self(preconditions)
    }
}

impl AnyPrecondition {
    /// Combines preconditions with logical OR.
    #[must_use]
    pub fn new(preconditions: Vec<Box<dyn Precondition>>) -> Self {
        Self(preconditions)
    }
}

impl NotPrecondition {
    /// Negates a precondition.
    #[must_use]
    pub fn new(precondition: Box<dyn Precondition>) -> Self {
        Self(precondition)
    }
}

impl Precondition for AllPreconditions {
    fn is_applicable(&self, file: &SourceFile) -> bool {
        self.0.iter().all(|pre| pre.is_applicable(file))
    }

    fn describe(&self) -> String {
        describe_all(&self.0, " and ")
    }
}

impl Precondition for AnyPrecondition {
    fn is_applicable(&self, file: &SourceFile) -> bool {
        self.0.iter().any(|pre| pre.is_applicable(file))
    }

    fn describe(&self) -> String {
        describe_all(&self.0, " or ")
    }
}

impl Precondition for NotPrecondition {
    fn is_applicable(&self, file: &SourceFile) -> bool {
        !self.0.is_applicable(file)
    }

    fn describe(&self) -> String {
        format!("not({})", self.0.describe())
    }
}

fn describe_all(preconditions: &[Box<dyn Precondition>], separator: &str) -> String {
    let parts: Vec<_> = preconditions.iter().map(|pre| pre.describe()).collect();
    format!("({})", parts.join(separator))
}

/// A visitor that only runs on files accepted by a precondition.
pub struct Checked<'a> {
    precondition: Box<dyn Precondition + 'a>,
    inner: Box<dyn TreeVisitor + 'a>,
}

/// Guards `visitor` with `precondition`.
#[must_use]
pub fn check<'a>(
    precondition: impl Precondition + 'a,
    visitor: Box<dyn TreeVisitor + 'a>,
) -> Box<dyn TreeVisitor + 'a> {
    Box::new(Checked {
        precondition: Box::new(precondition),
        inner: visitor,
    })
}

impl TreeVisitor for Checked<'_> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_acceptable(&self, file: &SourceFile, ctx: &ExecutionContext) -> bool {
        let applicable = self.precondition.is_applicable(file);
        if !applicable {
            tracing::debug!(
                path = %file.path(),
                precondition = %self.precondition.describe(),
                "precondition not met"
            );
        }
        applicable && self.inner.is_acceptable(file, ctx)
    }

    fn visit(&mut self, cursor: &Cursor<'_>, ctx: &mut ExecutionContext) -> Arc<Node> {
        self.inner.visit(cursor, ctx)
    }
}
