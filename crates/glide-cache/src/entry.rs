//! Cache entry types.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// How much of a segment subtree a cached payload covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Completeness {
    /// Fetched only down to a loading boundary; deeper segments missing.
    Partial,
    /// The entire subtree below this path is present.
    Full,
}

/// Lifecycle state of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryState {
    /// A fetch has been scheduled but has not completed.
    Pending,
    /// Fetch completed; servable for soft navigation.
    Ready,
    /// Invalidated; never served for soft navigation. Refreshed or
    /// evicted.
    Stale,
}

/// A cached segment payload with its bookkeeping.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Opaque rendered/serializable result for this segment path.
    pub payload: serde_json::Value,
    /// How much of the subtree the payload covers.
    pub completeness: Completeness,
    /// Invalidation tags attached at fetch time.
    pub tags: Vec<String>,
    /// When the entry was created.
    pub created_at: Instant,
    /// Lifecycle state.
    pub state: EntryState,
    pub(crate) last_used: Instant,
    // Identifies which mark_pending call owns a Pending placeholder;
    // zero for entries in any other state.
    pub(crate) pending_marker: u64,
}

impl CacheEntry {
    /// Create a placeholder entry for a scheduled fetch.
    pub fn pending() -> Self {
        let now = Instant::now();
        Self {
            payload: serde_json::Value::Null,
            completeness: Completeness::Partial,
            tags: Vec::new(),
            created_at: now,
            state: EntryState::Pending,
            last_used: now,
            pending_marker: 0,
        }
    }

    /// Create a ready entry from a completed fetch.
    pub fn ready(payload: serde_json::Value, completeness: Completeness, tags: Vec<String>) -> Self {
        let now = Instant::now();
        Self {
            payload,
            completeness,
            tags,
            created_at: now,
            state: EntryState::Ready,
            last_used: now,
            pending_marker: 0,
        }
    }

    /// Whether this entry may serve a soft navigation.
    pub fn is_servable(&self) -> bool {
        self.state == EntryState::Ready
    }

    /// Time since the entry was last served or written.
    pub fn idle_for(&self) -> Duration {
        self.last_used.elapsed()
    }

    /// Age since creation.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}
