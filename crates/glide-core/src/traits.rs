//! Collaborator seams.
//!
//! The engine is headless: markup production, transport, and the browser
//! history API are supplied by the embedding application through these
//! traits.

use std::collections::BTreeMap;

use async_trait::async_trait;

use serde::{Deserialize, Serialize};

use crate::NavError;

/// A fetched segment payload with the invalidation tags the server
/// attached to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchedSegment {
    /// Opaque rendered/serializable result for the segment.
    pub payload: serde_json::Value,
    /// Invalidation tags to index the cache entry under.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl FetchedSegment {
    /// Create an untagged payload.
    pub fn new(payload: serde_json::Value) -> Self {
        Self {
            payload,
            tags: Vec::new(),
        }
    }

    /// Attach invalidation tags.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Transport collaborator: fetches one segment's payload from the server.
///
/// Used by both the prefetch scheduler and the transition pipeline. A
/// fetcher that never resolves stalls only the transition waiting on it.
#[async_trait]
pub trait SegmentFetcher: Send + Sync {
    /// Fetch the payload for `segment_path` (canonical cache-key form),
    /// with the dynamic parameters bound along the path.
    async fn fetch_segment(
        &self,
        segment_path: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<FetchedSegment, NavError>;
}

/// Render collaborator: turns committed segment payloads into visible UI.
pub trait Renderer: Send + Sync {
    /// Render a committed route. `segments` holds `(segment_path, payload)`
    /// pairs ordered root to leaf.
    fn render(&self, route_key: &str, segments: &[(String, serde_json::Value)]);

    /// Show the interstitial placeholder for a still-pending segment below
    /// a loading boundary.
    fn render_loading_boundary(&self, segment_path: &str);

    /// Show the error boundary for a segment whose fetch failed. Ancestor
    /// and sibling segments remain rendered.
    fn render_error_boundary(&self, segment_path: &str, error: &NavError);
}

/// Browser history collaborator.
pub trait HistorySink: Send + Sync {
    /// Push a new URL onto the history stack.
    fn push_url(&self, path: &str);

    /// Replace the current URL.
    fn replace_url(&self, path: &str);
}
