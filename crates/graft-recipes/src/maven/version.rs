//! Maven version ordering, reduced to what upgrades need.
//!
//! A version is a run of numeric segments followed by an optional
//! qualifier: `3.2.0`, `3.2.0-RC1`, `5.3.1.Final`. Numeric segments compare
//! numerically with missing segments read as zero. A version with a
//! qualifier sorts before the same numbers without one, so `3.2.0-RC1` is
//! older than `3.2.0`.

use std::cmp::Ordering;

const RELEASE_QUALIFIERS: &[&str] = &["", "final", "ga", "release"];

struct Parsed {
    numbers: Vec<u64>,
    qualifier: String,
}

fn parse(version: &str) -> Parsed {
    let mut numbers = Vec::new();
    let mut rest = Vec::new();
    for token in version.split(['.', '-']) {
        match token.parse::<u64>() {
            Ok(number) if rest.is_empty() => numbers.push(number),
            _ => rest.push(token),
        }
    }
    Parsed {
        numbers,
        qualifier: rest.join("-").to_ascii_lowercase(),
    }
}

impl Parsed {
    fn is_release(&self) -> bool {
        RELEASE_QUALIFIERS.contains(&self.qualifier.as_str())
    }
}

/// Orders two version strings.
#[must_use]
pub fn compare_versions(left: &str, right: &str) -> Ordering {
    let (a, b) = (parse(left), parse(right));
    let width = a.numbers.len().max(b.numbers.len());
    let numeric = (0..width)
        .map(|index| {
            let x = a.numbers.get(index).copied().unwrap_or_default();
            let y = b.numbers.get(index).copied().unwrap_or_default();
            x.cmp(&y)
        })
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal);
    numeric.then_with(|| match (a.is_release(), b.is_release()) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => Ordering::Equal,
        (false, false) => a.qualifier.cmp(&b.qualifier),
    })
}

/// Returns whether `version` is a release rather than a snapshot,
/// milestone or release candidate.
#[must_use]
pub fn is_release(version: &str) -> bool {
    parse(version).is_release()
}

/// Picks the newest release among `versions`.
#[must_use]
pub fn latest_release<'a, I>(versions: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    versions
        .into_iter()
        .filter(|version| is_release(version))
        .max_by(|a, b| compare_versions(a, b))
}
