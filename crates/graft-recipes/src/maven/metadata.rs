//! Dependency metadata sources.
//!
//! Recipes never talk to a repository themselves: they receive a
//! [`MetadataSource`] and call [`fetch_with_retries`], so tests and offline
//! runs can inject fixed version lists.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, warn};

use crate::error::MetadataError;

/// Published versions of Maven artifacts.
pub trait MetadataSource: Send + Sync {
    /// Lists the published versions of `group:artifact`, in any order.
    ///
    /// # Errors
    ///
    /// Returns [`MetadataError::Unavailable`] when the source cannot be
    /// reached.
    fn versions(&self, group: &str, artifact: &str) -> Result<Vec<String>, MetadataError>;
}

/// A fixed, in-memory version list.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadataSource {
    versions: HashMap<(String, String), Vec<String>>,
}

impl StaticMetadataSource {
    /// Creates an empty source; every lookup fails.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publishes `versions` for `group:artifact`.
    #[must_use]
    pub fn with_versions(mut self, group: &str, artifact: &str, versions: &[&str]) -> Self {
        self.versions.insert(
            (group.to_owned(), artifact.to_owned()),
            versions.iter().map(|version| (*version).to_owned()).collect(),
        );
        self
    }
}

impl MetadataSource for StaticMetadataSource {
    fn versions(&self, group: &str, artifact: &str) -> Result<Vec<String>, MetadataError> {
        self.versions
            .get(&(group.to_owned(), artifact.to_owned()))
            .cloned()
            .ok_or_else(|| MetadataError::unavailable(format!("{group}:{artifact}"), "not found"))
    }
}

/// Remembers successful lookups of another source for the life of the
/// value. Failures are not cached, so a later call retries.
pub struct CachedMetadataSource {
    inner: Arc<dyn MetadataSource>,
    cache: DashMap<(String, String), Vec<String>>,
}

impl CachedMetadataSource {
    /// Wraps `inner`.
    #[must_use]
    pub fn new(inner: Arc<dyn MetadataSource>) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
        }
    }
}

impl MetadataSource for CachedMetadataSource {
    fn versions(&self, group: &str, artifact: &str) -> Result<Vec<String>, MetadataError> {
        let key = (group.to_owned(), artifact.to_owned());
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.value().clone());
        }
        let versions = self.inner.versions(group, artifact)?;
        self.cache.insert(key, versions.clone());
        Ok(versions)
    }
}

/// Calls `source` up to `attempts` times, returning the first success or
/// the last failure.
///
/// # Errors
///
/// Returns the error of the final attempt when every attempt fails.
pub fn fetch_with_retries(
    source: &dyn MetadataSource,
    group: &str,
    artifact: &str,
    attempts: u32,
) -> Result<Vec<String>, MetadataError> {
    let limit = attempts.max(1);
    let mut attempt = 1;
    loop {
        match source.versions(group, artifact) {
            Ok(versions) => {
                debug!(group, artifact, attempt, found = versions.len(), "fetched versions");
                return Ok(versions);
            }
            Err(err) if attempt < limit => {
                warn!(group, artifact, attempt, error = %err, "metadata lookup failed, retrying");
                attempt += 1;
            }
            Err(err) => {
                warn!(group, artifact, attempt, error = %err, "metadata lookup failed");
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::{Sequence, mock};

    mock! {
        Source {}
        impl MetadataSource for Source {
            fn versions(&self, group: &str, artifact: &str) -> Result<Vec<String>, MetadataError>;
        }
    }

    fn offline() -> MetadataError {
        MetadataError::unavailable("org.acme:lib", "connection refused")
    }

    #[test]
    fn retries_until_a_lookup_succeeds() {
        let mut source = MockSource::new();
        let mut order = Sequence::new();
        source
            .expect_versions()
            .times(2)
            .in_sequence(&mut order)
            .returning(|_, _| Err(offline()));
        source
            .expect_versions()
            .once()
            .in_sequence(&mut order)
            .returning(|_, _| Ok(vec!["1.0".to_owned()]));

        let versions = fetch_with_retries(&source, "org.acme", "lib", 3).expect("third attempt");
        assert_eq!(versions, ["1.0"]);
    }

    #[test]
    fn gives_up_after_the_last_attempt() {
        let mut source = MockSource::new();
        source
            .expect_versions()
            .times(3)
            .returning(|_, _| Err(offline()));

        let err = fetch_with_retries(&source, "org.acme", "lib", 3).expect_err("all attempts fail");
        assert_eq!(err, offline());
    }

    #[test]
    fn caches_successes_only() {
        let mut source = MockSource::new();
        let mut order = Sequence::new();
        source
            .expect_versions()
            .once()
            .in_sequence(&mut order)
            .returning(|_, _| Err(offline()));
        source
            .expect_versions()
            .once()
            .in_sequence(&mut order)
            .returning(|_, _| Ok(vec!["2.0".to_owned()]));

        let cached = CachedMetadataSource::new(Arc::new(source));
        assert!(cached.versions("org.acme", "lib").is_err());
        assert_eq!(cached.versions("org.acme", "lib").expect("fetched"), ["2.0"]);
        assert_eq!(cached.versions("org.acme", "lib").expect("cached"), ["2.0"]);
    }

    #[test]
    fn static_sources_publish_fixed_lists() {
        let source = StaticMetadataSource::new().with_versions("org.acme", "lib", &["1.0", "1.1"]);
        assert_eq!(source.versions("org.acme", "lib").expect("known"), ["1.0", "1.1"]);
        assert!(source.versions("org.acme", "other").is_err());
    }
}
