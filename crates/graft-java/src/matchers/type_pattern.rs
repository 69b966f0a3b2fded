//! Fully-qualified type name patterns.

use std::fmt;

use regex::Regex;

use crate::error::JavaError;

/// A fully-qualified type name pattern.
///
/// A pattern that is exactly `*` matches any single type, qualified or not.
/// Elsewhere `*` matches within one name segment, `..` matches any number
/// of intermediate packages and a leading `*..` matches any package prefix.
/// `java.util.*` matches `java.util.List` but not
/// `java.util.concurrent.TimeUnit`; `java..TimeUnit` matches both
/// `java.TimeUnit` and `java.util.concurrent.TimeUnit`.
#[derive(Debug, Clone)]
pub struct TypePattern {
    source: String,
    regex: Regex,
}

impl TypePattern {
    /// Compiles `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`JavaError::InvalidPattern`] for empty patterns or patterns
    /// containing whitespace.
    pub fn new(pattern: &str) -> Result<Self, JavaError> {
        if pattern.is_empty() {
            return Err(JavaError::invalid_pattern(pattern, "empty type pattern"));
        }
        if pattern.contains(char::is_whitespace) {
            return Err(JavaError::invalid_pattern(pattern, "type patterns cannot contain spaces"));
        }

        if pattern == "*" {
            return Ok(Self {
                source: pattern.to_owned(),
                regex: Regex::new("^.+$")
                    .map_err(|err| JavaError::invalid_pattern(pattern, err.to_string()))?,
            });
        }

        let mut out = String::from("^");
        let rest = match pattern.strip_prefix("*..") {
            Some(tail) => {
                out.push_str(r"(?:[^.]+\.)*");
                tail
            }
            None => pattern,
        };
        let mut chars = rest.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '.' if chars.peek() == Some(&'.') => {
                    chars.next();
                    out.push_str(r"\.(?:[^.]+\.)*");
                }
                '.' => out.push_str(r"\."),
                '*' => out.push_str("[^.]*"),
                other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
            }
        }
        out.push('$');

        let regex = Regex::new(&out)
            .map_err(|err| JavaError::invalid_pattern(pattern, err.to_string()))?;
        Ok(Self {
            source: pattern.to_owned(),
            regex,
        })
    }

    /// Returns whether `fqn` matches.
    #[must_use]
    pub fn matches(&self, fqn: &str) -> bool {
        self.regex.is_match(fqn)
    }

    /// Returns the pattern text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns the name itself when the pattern has no wildcards.
    #[must_use]
    pub fn exact(&self) -> Option<&str> {
        (!self.source.contains('*') && !self.source.contains("..")).then_some(self.source.as_str())
    }
}

impl fmt::Display for TypePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
