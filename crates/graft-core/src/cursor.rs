//! Traversal cursors: a node plus the chain of its ancestors.
//!
//! A [`Cursor`] borrows its parent, so the chain lives on the stack of the
//! traversal that built it and can never outlive that visit. Each cursor
//! carries a small message bag that visitors use to leave notes for
//! themselves or for the nodes below.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::tree::Node;

/// A node being visited together with its ancestors.
pub struct Cursor<'a> {
    parent: Option<&'a Cursor<'a>>,
    value: Arc<Node>,
    messages: RefCell<HashMap<String, Box<dyn Any + Send>>>,
}

impl<'a> Cursor<'a> {
    /// Creates the cursor for a tree root.
    #[must_use]
    pub fn root(value: Arc<Node>) -> Self {
        Self {
            parent: None,
            value,
            messages: RefCell::new(HashMap::new()),
        }
    }

    /// Creates a cursor for `value` whose parent is `self`.
    #[must_use]
    pub fn child(&self, value: Arc<Node>) -> Cursor<'_> {
        Cursor {
            parent: Some(self),
            value,
            messages: RefCell::new(HashMap::new()),
        }
    }

    /// Creates a cursor for `value` at the same position as `self`.
    ///
    /// Used after a subtree has been rebuilt so the post-processing step sees
    /// the updated node. Messages are not carried over.
    #[must_use]
    pub fn with_value(&self, value: Arc<Node>) -> Self {
        Self {
            parent: self.parent,
            value,
            messages: RefCell::new(HashMap::new()),
        }
    }

    /// Returns the node under the cursor.
    #[must_use]
    pub const fn value(&self) -> &Arc<Node> {
        &self.value
    }

    /// Returns the parent cursor, or `None` at the root.
    #[must_use]
    pub const fn parent(&self) -> Option<&'a Cursor<'a>> {
        self.parent
    }

    /// Returns the parent node, or `None` at the root.
    #[must_use]
    pub fn parent_value(&self) -> Option<&'a Arc<Node>> {
        self.parent.map(Cursor::value)
    }

    /// Iterates from this cursor up to the root, self first.
    pub fn ancestors(&self) -> impl Iterator<Item = &Cursor<'_>> {
        let mut next: Option<&Cursor<'_>> = Some(self);
        std::iter::from_fn(move || {
            let current = next?;
            next = current.parent;
            Some(current)
        })
    }

    /// Returns the root node of the traversal.
    #[must_use]
    pub fn root_value(&self) -> &Arc<Node> {
        self.ancestors()
            .last()
            .map_or(&self.value, Cursor::value)
    }

    /// Returns the number of ancestors above this cursor.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.ancestors().count().saturating_sub(1)
    }

    /// Returns the nearest node, self included, satisfying `predicate`.
    pub fn first_enclosing(&self, mut predicate: impl FnMut(&Node) -> bool) -> Option<&Arc<Node>> {
        self.ancestors()
            .map(Cursor::value)
            .find(|node| predicate(node))
    }

    /// Returns the nearest node, self included, of the given kind.
    #[must_use]
    pub fn first_enclosing_kind(&self, kind: &str) -> Option<&Arc<Node>> {
        self.first_enclosing(|node| node.is(kind))
    }

    /// Returns the nearest strict ancestor cursor whose node satisfies
    /// `predicate`.
    pub fn drop_parent_until(&self, mut predicate: impl FnMut(&Node) -> bool) -> Option<&Cursor<'_>> {
        self.ancestors().skip(1).find(|cursor| predicate(&cursor.value))
    }

    /// Returns the kinds on the path from the root down to this cursor.
    #[must_use]
    pub fn path_kinds(&self) -> Vec<&'static str> {
        let mut kinds: Vec<_> = self.ancestors().map(|cursor| cursor.value.kind()).collect();
        kinds.reverse();
        kinds
    }

    /// Stores a message on this cursor, replacing any previous value.
    pub fn put_message<T: Any + Send>(&self, key: impl Into<String>, value: T) {
        self.messages.borrow_mut().insert(key.into(), Box::new(value));
    }

    /// Returns a copy of the message stored on this cursor.
    #[must_use]
    pub fn message<T: Any + Clone>(&self, key: &str) -> Option<T> {
        self.messages
            .borrow()
            .get(key)
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
    }

    /// Returns the message stored on the nearest cursor, self included.
    #[must_use]
    pub fn nearest_message<T: Any + Clone>(&self, key: &str) -> Option<T> {
        self.ancestors().find_map(|cursor| cursor.message::<T>(key))
    }

    /// Updates a message on the nearest cursor holding `key`, or stores
    /// `default` updated by `update` on this cursor.
    pub fn update_nearest_message<T: Any + Send + Clone>(
        &self,
        key: &str,
        default: T,
        update: impl FnOnce(T) -> T,
    ) {
        let holder = self
            .ancestors()
            .find(|cursor| cursor.messages.borrow().contains_key(key))
            .unwrap_or(self);
        let current = holder.message::<T>(key).unwrap_or(default);
        holder.put_message(key, update(current));
    }
}

impl fmt::Debug for Cursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("path", &self.path_kinds())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Arc<Node>, Arc<Node>, Arc<Node>) {
        let leaf = Arc::new(Node::token("identifier", "x"));
        let middle = Arc::new(Node::branch("block", vec![Arc::clone(&leaf)]));
        let root = Arc::new(Node::branch("program", vec![Arc::clone(&middle)]));
        (root, middle, leaf)
    }

    #[test]
    fn walks_to_first_enclosing_kind() {
        let (root, middle, leaf) = sample();
        let root_cursor = Cursor::root(Arc::clone(&root));
        let middle_cursor = root_cursor.child(Arc::clone(&middle));
        let leaf_cursor = middle_cursor.child(leaf);

        let found = leaf_cursor.first_enclosing_kind("block").expect("block");
        assert!(Arc::ptr_eq(found, &middle));
        assert!(leaf_cursor.first_enclosing_kind("class_body").is_none());
        assert!(Arc::ptr_eq(leaf_cursor.root_value(), &root));
        assert_eq!(leaf_cursor.depth(), 2);
        assert_eq!(leaf_cursor.path_kinds(), vec!["program", "block", "identifier"]);
    }

    #[test]
    fn drop_parent_until_skips_self() {
        let (root, middle, _) = sample();
        let root_cursor = Cursor::root(root);
        let middle_cursor = root_cursor.child(middle);

        let found = middle_cursor
            .drop_parent_until(|node| node.is("block") || node.is("program"))
            .expect("ancestor");
        assert_eq!(found.value().kind(), "program");
    }

    #[test]
    fn nearest_message_walks_ancestors() {
        let (root, middle, leaf) = sample();
        let root_cursor = Cursor::root(root);
        root_cursor.put_message("scope", 7_u32);
        let middle_cursor = root_cursor.child(middle);
        let leaf_cursor = middle_cursor.child(leaf);

        assert_eq!(leaf_cursor.nearest_message::<u32>("scope"), Some(7));
        assert_eq!(leaf_cursor.message::<u32>("scope"), None);
        assert_eq!(leaf_cursor.nearest_message::<String>("scope"), None);
    }

    #[test]
    fn update_nearest_message_targets_holder() {
        let (root, middle, _) = sample();
        let root_cursor = Cursor::root(root);
        root_cursor.put_message("count", 1_usize);
        let middle_cursor = root_cursor.child(middle);

        middle_cursor.update_nearest_message("count", 0_usize, |n| n + 1);
        assert_eq!(root_cursor.message::<usize>("count"), Some(2));
        assert_eq!(middle_cursor.message::<usize>("count"), None);
    }
}
