//! The cache store: key→entry map plus tag reverse index.

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use glide_core::RouterConfig;
use glide_segment::SegmentPath;
use tracing::{debug, trace};

use crate::{CacheEntry, CacheMetrics, Completeness, EntryState, MetricsSnapshot};

/// In-memory store of fetched/prefetched segment payloads.
///
/// Owned by the router; mutation only happens through this interface.
/// Entries are keyed by the canonical segment-path string, so a dynamic
/// segment bound to a different value is a different key and is never
/// consulted (or marked stale) across values.
#[derive(Debug)]
pub struct CacheStore {
    entries: HashMap<String, CacheEntry>,
    tag_index: HashMap<String, HashSet<String>>,
    pinned: HashSet<String>,
    capacity: usize,
    idle_ttl: Duration,
    next_marker: u64,
    metrics: CacheMetrics,
}

impl CacheStore {
    /// Create a store sized from the engine configuration.
    pub fn new(config: &RouterConfig) -> Self {
        Self {
            entries: HashMap::new(),
            tag_index: HashMap::new(),
            pinned: HashSet::new(),
            capacity: config.cache_capacity,
            idle_ttl: config.idle_ttl,
            next_marker: 0,
            metrics: CacheMetrics::default(),
        }
    }

    /// Look up an entry without side effects.
    pub fn get(&self, path: &SegmentPath) -> Option<&CacheEntry> {
        self.entries.get(&path.cache_key())
    }

    /// Look up an entry for serving: counts hit/miss/stale and touches
    /// the LRU clock on a servable entry.
    pub fn lookup(&mut self, path: &SegmentPath) -> Option<&CacheEntry> {
        let key = path.cache_key();
        match self.entries.get(&key).map(|entry| entry.state) {
            Some(EntryState::Ready) => {
                self.metrics.hits += 1;
                trace!(key = %key, "cache hit");
                if let Some(entry) = self.entries.get_mut(&key) {
                    entry.last_used = Instant::now();
                }
                self.entries.get(&key)
            }
            Some(EntryState::Stale) => {
                self.metrics.stale_hits += 1;
                trace!(key = %key, "stale entry ignored");
                None
            }
            // Pending: a fetch is already on the way.
            Some(EntryState::Pending) => None,
            None => {
                self.metrics.misses += 1;
                trace!(key = %key, "cache miss");
                None
            }
        }
    }

    /// Whether a servable (`Ready`) entry exists at `path`.
    pub fn is_servable(&self, path: &SegmentPath) -> bool {
        self.get(path).is_some_and(CacheEntry::is_servable)
    }

    /// Whether a fetch for `path` is already scheduled or completed.
    pub fn is_ready_or_pending(&self, path: &SegmentPath) -> bool {
        self.get(path)
            .is_some_and(|e| matches!(e.state, EntryState::Ready | EntryState::Pending))
    }

    /// Record that a fetch has been scheduled for `path`. Returns a
    /// marker identifying this particular placeholder; only the caller
    /// holding it may clear the placeholder again.
    pub fn mark_pending(&mut self, path: &SegmentPath) -> u64 {
        let key = path.cache_key();
        self.unindex_tags(&key);
        self.next_marker += 1;
        let mut entry = CacheEntry::pending();
        entry.pending_marker = self.next_marker;
        self.entries.insert(key, entry);
        self.next_marker
    }

    /// Drop a `Pending` placeholder, e.g. after a failed or superseded
    /// fetch. Entries in any other state are left alone (a failed fetch
    /// must never shadow previously valid content), and so is a
    /// placeholder re-created under a different marker: it belongs to a
    /// newer fetch.
    pub fn clear_pending(&mut self, path: &SegmentPath, marker: u64) {
        let key = path.cache_key();
        if self
            .entries
            .get(&key)
            .is_some_and(|e| e.state == EntryState::Pending && e.pending_marker == marker)
        {
            self.entries.remove(&key);
        }
    }

    /// Store a completed fetch, replacing any existing entry whole.
    pub fn put(
        &mut self,
        path: &SegmentPath,
        payload: serde_json::Value,
        completeness: Completeness,
        tags: Vec<String>,
    ) {
        let key = path.cache_key();
        self.unindex_tags(&key);
        for tag in &tags {
            self.tag_index
                .entry(tag.clone())
                .or_default()
                .insert(key.clone());
        }
        debug!(key = %key, ?completeness, "cache put");
        self.entries
            .insert(key, CacheEntry::ready(payload, completeness, tags));
        self.evict_to_capacity();
    }

    /// Mark every entry whose key lies at or under `prefix` as `Stale`.
    /// Returns the number of entries affected.
    ///
    /// A `Full` entry strictly above `prefix` claims its whole subtree,
    /// part of which is now invalid: it is demoted to `Partial` so the
    /// next navigation plans fetches below it instead of trusting it.
    pub fn invalidate_path(&mut self, prefix: &SegmentPath) -> usize {
        let prefix_key = prefix.cache_key();
        let mut affected = 0;
        for (key, entry) in &mut self.entries {
            if key_covers(&prefix_key, key) {
                if entry.state != EntryState::Stale {
                    entry.state = EntryState::Stale;
                    affected += 1;
                }
            } else if key_covers(key, &prefix_key)
                && entry.state == EntryState::Ready
                && entry.completeness == Completeness::Full
            {
                entry.completeness = Completeness::Partial;
            }
        }
        self.metrics.invalidations += affected as u64;
        debug!(prefix = %prefix_key, affected, "path invalidation");
        affected
    }

    /// Mark every entry carrying `tag` as `Stale`, via the reverse index.
    /// O(affected entries), not O(all entries).
    pub fn invalidate_tag(&mut self, tag: &str) -> usize {
        let Some(keys) = self.tag_index.get(tag) else {
            return 0;
        };
        let mut affected = 0;
        for key in keys {
            if let Some(entry) = self.entries.get_mut(key) {
                if entry.state != EntryState::Stale {
                    entry.state = EntryState::Stale;
                    affected += 1;
                }
            }
        }
        self.metrics.invalidations += affected as u64;
        debug!(tag, affected, "tag invalidation");
        affected
    }

    /// Protect a path from eviction (committed route, in-flight
    /// transition).
    pub fn pin(&mut self, path: &SegmentPath) {
        self.pinned.insert(path.cache_key());
    }

    /// Release an eviction pin.
    pub fn unpin(&mut self, path: &SegmentPath) {
        self.pinned.remove(&path.cache_key());
    }

    /// Evict entries until the store is back under capacity.
    ///
    /// Victim order: `Stale` entries first (least recently used), then
    /// `Ready` entries idle longer than the configured TTL, then the
    /// least recently used `Ready` entry. Pinned and `Pending` entries
    /// are never evicted.
    pub fn evict_to_capacity(&mut self) {
        while self.entries.len() > self.capacity {
            let Some(victim) = self.pick_victim() else {
                break;
            };
            self.unindex_tags(&victim);
            self.entries.remove(&victim);
            self.metrics.evictions += 1;
            debug!(key = %victim, "evicted");
        }
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot the performance counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot(self.entries.len())
    }

    fn pick_victim(&self) -> Option<String> {
        let evictable = |entry: &&CacheEntry| entry.state != EntryState::Pending;
        let not_pinned = |key: &&String| !self.pinned.contains(*key);

        let lru = |state: EntryState, min_idle: Option<Duration>| {
            self.entries
                .iter()
                .filter(|(key, entry)| {
                    not_pinned(key)
                        && evictable(entry)
                        && entry.state == state
                        && min_idle.map_or(true, |ttl| entry.idle_for() >= ttl)
                })
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone())
        };

        lru(EntryState::Stale, None)
            .or_else(|| lru(EntryState::Ready, Some(self.idle_ttl)))
            .or_else(|| lru(EntryState::Ready, None))
    }

    fn unindex_tags(&mut self, key: &str) {
        if let Some(entry) = self.entries.get(key) {
            for tag in entry.tags.clone() {
                if let Some(keys) = self.tag_index.get_mut(&tag) {
                    keys.remove(key);
                    if keys.is_empty() {
                        self.tag_index.remove(&tag);
                    }
                }
            }
        }
    }
}

/// Segment-aligned prefix match on canonical keys: `/a/b` covers `/a/b`
/// and `/a/b/c` but not `/a/bc`. The root key `/` covers everything.
fn key_covers(prefix_key: &str, key: &str) -> bool {
    if prefix_key == "/" {
        return true;
    }
    match key.strip_prefix(prefix_key) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
