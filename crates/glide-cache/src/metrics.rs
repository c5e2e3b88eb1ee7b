//! Cache performance counters.

/// Running counters maintained by the store.
#[derive(Debug, Default)]
pub(crate) struct CacheMetrics {
    pub hits: u64,
    pub misses: u64,
    pub stale_hits: u64,
    pub evictions: u64,
    pub invalidations: u64,
}

impl CacheMetrics {
    pub(crate) fn snapshot(&self, entries: usize) -> MetricsSnapshot {
        MetricsSnapshot {
            hits: self.hits,
            misses: self.misses,
            stale_hits: self.stale_hits,
            evictions: self.evictions,
            invalidations: self.invalidations,
            entries,
        }
    }
}

/// Point-in-time snapshot of the cache counters. All fields are cheap
/// `Copy` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    /// Servable lookups.
    pub hits: u64,
    /// Lookups with no entry present.
    pub misses: u64,
    /// Lookups that found only a `Stale` entry (counted as misses for
    /// navigation purposes).
    pub stale_hits: u64,
    /// Entries removed under capacity pressure.
    pub evictions: u64,
    /// Entries marked stale by path or tag invalidation.
    pub invalidations: u64,
    /// Entries currently resident.
    pub entries: usize,
}

impl MetricsSnapshot {
    /// Hit ratio over all lookups, zero when nothing was looked up.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses + self.stale_hits;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
