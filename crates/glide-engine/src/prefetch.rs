//! Speculative cache population.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use glide_cache::{CacheStore, Completeness};
use glide_core::{NavError, RouterConfig, SegmentFetcher};
use glide_segment::ResolvedRoute;
use parking_lot::Mutex;
use tracing::{debug, trace};

/// Why a prefetch did or did not run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefetchOutcome {
    /// The bounded prefix was fetched and cached.
    Fetched {
        /// Cache key the entry was stored under.
        key: String,
        /// `Full` for all-static paths, `Partial` when bounded at a
        /// loading boundary.
        completeness: Completeness,
    },
    /// An entry for the bounded prefix is already `Ready` or `Pending`.
    AlreadyCached,
    /// Prefetching is disabled (config or per-link opt-out).
    Disabled,
    /// The path is dynamic with no loading boundary; there is no useful
    /// bounded prefix to prefetch.
    Unbounded,
    /// The concurrency cap was hit; the request was silently dropped.
    Dropped,
}

/// Populates the cache ahead of navigation.
///
/// Triggered by a link entering the viewport or an explicit prefetch
/// call. Fully static paths prefetch in full; paths with a dynamic
/// segment prefetch down to the first loading boundary, bounding cost
/// while still enabling an instant interstitial.
#[derive(Debug)]
pub struct PrefetchScheduler {
    enabled: bool,
    concurrency: usize,
    in_flight: Arc<AtomicUsize>,
}

impl PrefetchScheduler {
    /// Create a scheduler from the engine configuration.
    pub fn new(config: &RouterConfig) -> Self {
        Self {
            enabled: config.prefetch_enabled,
            concurrency: config.prefetch_concurrency,
            in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Whether the scheduler will act at all.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Prefetch the bounded prefix of `route` if it is not already
    /// cached or in flight.
    pub async fn prefetch(
        &self,
        route: &ResolvedRoute,
        store: &Mutex<CacheStore>,
        fetcher: &dyn SegmentFetcher,
    ) -> Result<PrefetchOutcome, NavError> {
        if !self.enabled {
            return Ok(PrefetchOutcome::Disabled);
        }
        let Some(bound) = route.bounded_prefix() else {
            trace!(target = %route.path, "dynamic path without loading boundary, skipping");
            return Ok(PrefetchOutcome::Unbounded);
        };
        let completeness = if route.is_fully_static() {
            Completeness::Full
        } else {
            Completeness::Partial
        };

        // The in-flight slot is claimed while the store is still locked;
        // cap check and increment must not be separable.
        let (marker, _guard) = {
            let mut store = store.lock();
            if store.is_ready_or_pending(&bound) {
                return Ok(PrefetchOutcome::AlreadyCached);
            }
            if self.in_flight.load(Ordering::SeqCst) >= self.concurrency {
                trace!(key = %bound, "prefetch concurrency cap hit, dropping");
                return Ok(PrefetchOutcome::Dropped);
            }
            (store.mark_pending(&bound), InFlightGuard::enter(&self.in_flight))
        };

        let key = bound.cache_key();
        debug!(key = %key, ?completeness, "prefetching");
        match fetcher.fetch_segment(&key, &bound.params()).await {
            Ok(segment) => {
                store
                    .lock()
                    .put(&bound, segment.payload, completeness, segment.tags);
                Ok(PrefetchOutcome::Fetched { key, completeness })
            }
            Err(err) => {
                // A transient failure must not be cached as content.
                store.lock().clear_pending(&bound, marker);
                Err(err)
            }
        }
    }
}

struct InFlightGuard(Arc<AtomicUsize>);

impl InFlightGuard {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter.clone())
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
