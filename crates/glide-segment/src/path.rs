//! Resolved segment paths and path diffing.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One resolved segment along a route path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum SegmentKind {
    /// A literal path segment.
    Static {
        /// The segment text.
        key: String,
    },
    /// A parameterized segment with its bound value.
    Dynamic {
        /// Parameter name (constant across all values bound to it).
        param: String,
        /// The concrete value bound at resolve time.
        value: String,
    },
}

impl SegmentKind {
    /// Create a static segment.
    pub fn stat(key: impl Into<String>) -> Self {
        SegmentKind::Static { key: key.into() }
    }

    /// Create a dynamic segment with a bound value.
    pub fn dynamic(param: impl Into<String>, value: impl Into<String>) -> Self {
        SegmentKind::Dynamic {
            param: param.into(),
            value: value.into(),
        }
    }

    /// Whether two resolved segments are the same node: static keys equal,
    /// or same parameter bound to the same value.
    pub fn matches(&self, other: &SegmentKind) -> bool {
        self == other
    }

    /// Whether this segment is dynamic.
    pub fn is_dynamic(&self) -> bool {
        matches!(self, SegmentKind::Dynamic { .. })
    }

    /// The cache-key fragment for this segment. A dynamic segment embeds
    /// its bound value so different values never share a key.
    pub fn key_part(&self) -> String {
        match self {
            SegmentKind::Static { key } => key.clone(),
            SegmentKind::Dynamic { param, value } => format!("[{param}={value}]"),
        }
    }
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key_part())
    }
}

/// A resolved path from the route root to some node, in order.
///
/// The `Display` form is the canonical cache key: `/` plus the key parts
/// joined by `/`. The empty path (route root) displays as `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct SegmentPath(Vec<SegmentKind>);

impl SegmentPath {
    /// Create a path from resolved segments.
    pub fn new(segments: Vec<SegmentKind>) -> Self {
        Self(segments)
    }

    /// The segments, root first.
    pub fn segments(&self) -> &[SegmentKind] {
        &self.0
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the route root.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The prefix of this path truncated to `depth` segments.
    pub fn prefix(&self, depth: usize) -> SegmentPath {
        SegmentPath(self.0[..depth.min(self.0.len())].to_vec())
    }

    /// Whether `prefix` is a (segment-aligned) prefix of this path.
    pub fn starts_with(&self, prefix: &SegmentPath) -> bool {
        self.0.len() >= prefix.0.len()
            && self.0.iter().zip(&prefix.0).all(|(a, b)| a.matches(b))
    }

    /// The canonical cache key for this path.
    pub fn cache_key(&self) -> String {
        self.to_string()
    }

    /// Dynamic parameters bound along this path, outermost first.
    pub fn params(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .filter_map(|seg| match seg {
                SegmentKind::Dynamic { param, value } => {
                    Some((param.clone(), value.clone()))
                }
                SegmentKind::Static { .. } => None,
            })
            .collect()
    }

    /// Compare two paths segment by segment.
    ///
    /// The common prefix extends while each segment's key and, for dynamic
    /// segments, bound value match exactly; divergence begins at the first
    /// index where either differs. The diff is the basis for cache reuse
    /// and for scoping invalidation.
    pub fn diff(&self, other: &SegmentPath) -> PathDiff {
        let common_prefix_depth = self
            .0
            .iter()
            .zip(&other.0)
            .take_while(|(a, b)| a.matches(b))
            .count();
        PathDiff {
            common_prefix_depth,
            diverging_a: self.0[common_prefix_depth..].to_vec(),
            diverging_b: other.0[common_prefix_depth..].to_vec(),
        }
    }
}

impl fmt::Display for SegmentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for seg in &self.0 {
            write!(f, "/{}", seg.key_part())?;
        }
        Ok(())
    }
}

/// Result of comparing two segment paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathDiff {
    /// Number of leading segments identical on both sides.
    pub common_prefix_depth: usize,
    /// Segments of the first path past the common prefix.
    pub diverging_a: Vec<SegmentKind>,
    /// Segments of the second path past the common prefix.
    pub diverging_b: Vec<SegmentKind>,
}

impl PathDiff {
    /// Whether the paths are identical.
    pub fn is_same_route(&self) -> bool {
        self.diverging_a.is_empty() && self.diverging_b.is_empty()
    }

    /// Whether divergence happens at a dynamic segment: the first
    /// diverging segment on either side is dynamic. A changed dynamic
    /// value makes everything at and below it a different cache key.
    pub fn diverges_at_dynamic(&self) -> bool {
        self.diverging_a.first().is_some_and(SegmentKind::is_dynamic)
            || self.diverging_b.first().is_some_and(SegmentKind::is_dynamic)
    }
}
