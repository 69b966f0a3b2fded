//! Markers attached to nodes.

use serde::Serialize;

/// Out-of-band information attached to a node.
///
/// Markers never print; they carry diagnostics and search hits alongside the
/// tree so they survive later edits of unrelated nodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[non_exhaustive]
pub enum Marker {
    /// A non-fatal problem found while processing the node.
    Warning {
        /// Human-readable description of the problem.
        message: String,
    },
    /// The node matched a search recipe.
    SearchResult {
        /// Optional description shown next to the hit.
        description: Option<String>,
    },
}

impl Marker {
    /// Creates a warning marker.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning {
            message: message.into(),
        }
    }

    /// Creates a search result marker.
    #[must_use]
    pub fn search_result(description: Option<String>) -> Self {
        Self::SearchResult { description }
    }
}

/// Set of markers attached to a node, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markers(Vec<Marker>);

impl Markers {
    /// Returns an empty marker set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns a copy with `marker` added, unless an equal marker is present.
    #[must_use]
    pub fn with(&self, marker: Marker) -> Self {
        let mut markers = self.0.clone();
        if !markers.contains(&marker) {
            markers.push(marker);
        }
        Self(markers)
    }

    /// Returns whether an equal marker is present.
    #[must_use]
    pub fn contains(&self, marker: &Marker) -> bool {
        self.0.contains(marker)
    }

    /// Returns whether no markers are attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the attached markers.
    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.0.iter()
    }

    /// Iterates over the messages of attached warnings.
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(|marker| match marker {
            Marker::Warning { message } => Some(message.as_str()),
            Marker::SearchResult { .. } => None,
        })
    }

    /// Returns whether a search result marker is attached.
    #[must_use]
    pub fn has_search_result(&self) -> bool {
        self.0
            .iter()
            .any(|marker| matches!(marker, Marker::SearchResult { .. }))
    }
}
