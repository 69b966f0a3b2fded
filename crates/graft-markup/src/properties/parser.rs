//! A lossless parser for Java properties files.
//!
//! The tree is flat: a `properties` root holding one `entry` per logical
//! line. Each entry has `key`, `separator` and `value` tokens carrying the
//! raw text, escapes and line continuations included. Blank lines and
//! comments belong to the prefix of the following entry, or to the end of
//! the file.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use graft_core::{Language, Node, ParseError, SourceFile};

use tracing::debug;

use super::escape::unescape;
use crate::error::MarkupError;

/// Kind of the root node.
pub const PROPERTIES: &str = "properties";
/// Kind of an entry node.
pub const ENTRY: &str = "entry";

const WHITESPACE: [char; 3] = [' ', '\t', '\x0c'];

/// Parses a properties file.
///
/// # Errors
///
/// Returns [`MarkupError::Parse`] for malformed `\uxxxx` escapes.
pub fn parse_properties(
    path: impl Into<Utf8PathBuf>,
    text: &str,
) -> Result<SourceFile, MarkupError> {
    let path = path.into();
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    let mut entries = Vec::new();
    let mut pending = String::new();
    let mut index = 0;

    while let Some(&line) = lines.get(index) {
        let (body, newline) = split_newline(line);
        let content = body.trim_start_matches(WHITESPACE);
        if content.is_empty() || content.starts_with(['#', '!']) {
            pending.push_str(line);
            index += 1;
            continue;
        }

        let first_line = index;
        let mut raw = content.to_owned();
        let mut terminator = newline;
        let mut last_body = body;
        while ends_with_continuation(last_body) {
            let Some(&next) = lines.get(index + 1) else {
                break;
            };
            raw.push_str(terminator);
            index += 1;
            let (next_body, next_newline) = split_newline(next);
            raw.push_str(next_body);
            last_body = next_body;
            terminator = next_newline;
        }
        index += 1;

        let indent = body.get(..body.len() - content.len()).unwrap_or_default();
        let prefix = format!("{pending}{indent}");
        pending = terminator.to_owned();
        let entry = entry_node(&raw, prefix)
            .map_err(|message| parse_error(&path, first_line, indent.len(), message))?;
        entries.push(Arc::new(entry));
    }

    debug!(%path, entries = entries.len(), "parsed properties file");
    let root = Arc::new(Node::branch(PROPERTIES, entries));
    Ok(SourceFile::new(path, Language::Properties, root, pending))
}

fn split_newline(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

fn ends_with_continuation(body: &str) -> bool {
    let slashes = body.chars().rev().take_while(|c| *c == '\\').count();
    !slashes.is_multiple_of(2)
}

fn entry_node(raw: &str, prefix: String) -> Result<Node, String> {
    let key_end = key_end(raw);
    let (key, rest) = raw.split_at(key_end);
    let separator_end = separator_end(rest);
    let (separator, value) = rest.split_at(separator_end);
    unescape(key)?;
    unescape(value)?;
    Ok(Node::branch(
        ENTRY,
        vec![
            Arc::new(Node::token("key", key).with_field(Some("key"))),
            Arc::new(Node::token("separator", separator).with_field(Some("separator"))),
            Arc::new(Node::token("value", value).with_field(Some("value"))),
        ],
    )
    .with_prefix(prefix))
}

fn key_end(raw: &str) -> usize {
    let mut escaped = false;
    for (offset, c) in raw.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || WHITESPACE.contains(&c) {
            return offset;
        }
    }
    raw.len()
}

fn separator_end(rest: &str) -> usize {
    let leading = rest.len() - rest.trim_start_matches(WHITESPACE).len();
    let after_space = rest.get(leading..).unwrap_or_default();
    let with_symbol = if after_space.starts_with(['=', ':']) {
        leading + 1
    } else {
        leading
    };
    let tail = rest.get(with_symbol..).unwrap_or_default();
    with_symbol + (tail.len() - tail.trim_start_matches(WHITESPACE).len())
}

fn parse_error(path: &Utf8Path, line: usize, column: usize, message: String) -> MarkupError {
    let line = u32::try_from(line + 1).unwrap_or(u32::MAX);
    let column = u32::try_from(column + 1).unwrap_or(u32::MAX);
    MarkupError::Parse(
        ParseError::new(Language::Properties, line, column, message).with_path(path),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    use crate::properties::{entry_key, entry_value};

    #[rstest]
    #[case("")]
    #[case("a=1\n")]
    #[case("# header\n\n! bang\nserver.port = 8080\nname:graft\n  indented value\nmulti = one, \\\n    two\nempty\n# trailing\n")]
    #[case("crlf=1\r\nnext=2")]
    fn prints_exactly_what_was_parsed(#[case] text: &str) {
        let file = parse_properties("app.properties", text).expect("parse");
        assert_eq!(file.print(), text);
    }

    #[test]
    fn splits_keys_and_values() {
        let text = "# c\nserver.port = 8080\nname:graft\nkey\\ with\\ space value\nmulti = one, \\\n    two\nempty\n";
        let file = parse_properties("app.properties", text).expect("parse");
        let pairs: Vec<(String, String)> = file
            .root()
            .children()
            .iter()
            .map(|entry| {
                (
                    entry_key(entry).unwrap_or_default(),
                    entry_value(entry).unwrap_or_default(),
                )
            })
            .collect();
        let expected = [
            ("server.port", "8080"),
            ("name", "graft"),
            ("key with space", "value"),
            ("multi", "one, two"),
            ("empty", ""),
        ];
        assert_eq!(
            pairs,
            expected
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn comments_lead_the_following_entry() {
        let file = parse_properties("app.properties", "a=1\n# about b\nb=2\n").expect("parse");
        let second = file.root().children().get(1).expect("second entry");
        assert_eq!(second.prefix(), "\n# about b\n");
        assert_eq!(file.eof(), "\n");
    }

    #[test]
    fn rejects_malformed_unicode_escapes() {
        let err = parse_properties("app.properties", "a=1\nb=\\u12G4\n").expect_err("malformed");
        let MarkupError::Parse(parse) = err else {
            panic!("expected a parse error, got {err:?}");
        };
        assert_eq!(parse.line(), 2);
    }
}
