//! Spring-style property key patterns shared by YAML and properties files.

use std::fmt;

use graft_core::{Cursor, TreeMatcher};
use regex::Regex;

use crate::error::MarkupError;
use crate::properties::{entry_key, is_property};
use crate::yaml::{dotted_key, is_entry, path_of};

/// Matches property keys such as `spring.datasource.url`.
///
/// `*` matches within one dot-separated segment and `**` matches across
/// segments. With relaxed binding (the default) keys compare ignoring case,
/// dashes and underscores, so `spring.main.banner-mode` matches
/// `spring.main.bannerMode`. Environment-variable keys such as
/// `SPRING_MAIN_BANNERMODE` read `_` as the segment separator.
#[derive(Debug, Clone)]
pub struct PropertyKeyMatcher {
    pattern: String,
    relaxed: bool,
    regex: Regex,
}

impl PropertyKeyMatcher {
    /// Compiles a pattern with relaxed binding.
    ///
    /// # Errors
    ///
    /// Returns [`MarkupError::InvalidPath`] for an empty pattern.
    pub fn new(pattern: &str) -> Result<Self, MarkupError> {
        Self::with_relaxed_binding(pattern, true)
    }

    /// Compiles a pattern, choosing whether keys bind relaxed.
    ///
    /// # Errors
    ///
    /// Returns [`MarkupError::InvalidPath`] for an empty pattern.
    pub fn with_relaxed_binding(pattern: &str, relaxed: bool) -> Result<Self, MarkupError> {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(MarkupError::invalid_path(pattern, "empty key pattern"));
        }
        let normalised = if relaxed { relax(trimmed) } else { trimmed.to_owned() };
        let mut source = String::from("^");
        let mut rest = normalised.as_str();
        while !rest.is_empty() {
            if let Some(tail) = rest.strip_prefix("**") {
                source.push_str(".*");
                rest = tail;
            } else if let Some(tail) = rest.strip_prefix('*') {
                source.push_str("[^.]*");
                rest = tail;
            } else {
                let end = rest.find('*').unwrap_or(rest.len());
                let (literal, tail) = rest.split_at(end);
                source.push_str(&regex::escape(literal));
                rest = tail;
            }
        }
        source.push('$');
        let regex = Regex::new(&source)
            .map_err(|err| MarkupError::invalid_path(pattern, err.to_string()))?;
        Ok(Self {
            pattern: trimmed.to_owned(),
            relaxed,
            regex,
        })
    }

    /// Returns the pattern as written.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns whether `key` matches.
    #[must_use]
    pub fn matches_key(&self, key: &str) -> bool {
        if self.relaxed {
            self.regex.is_match(&relax(key))
        } else {
            self.regex.is_match(key)
        }
    }
}

/// Canonical form used for relaxed binding.
fn relax(key: &str) -> String {
    if is_environment_form(key) {
        return relax(&key.replace('_', "."));
    }
    key.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn is_environment_form(key: &str) -> bool {
    key.contains('_')
        && key
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

impl TreeMatcher for PropertyKeyMatcher {
    fn matches(&self, cursor: &Cursor<'_>) -> bool {
        let node = cursor.value();
        if is_property(node) {
            return entry_key(node).is_some_and(|key| self.matches_key(&key));
        }
        is_entry(node) && self.matches_key(&dotted_key(&path_of(cursor)))
    }
}

impl fmt::Display for PropertyKeyMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern)
    }
}
