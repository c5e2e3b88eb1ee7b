//! Transition execution with generation-based cancellation.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use futures::future::join_all;
use glide_cache::{CacheStore, Completeness};
use glide_core::{NavigationRequest, Renderer, SegmentFetcher};
use glide_segment::{ResolvedRoute, SegmentPath};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::{Decision, NavigationKind};

/// One navigation in flight.
#[derive(Debug)]
pub struct Transition {
    /// Monotonically increasing id; higher generations supersede lower.
    pub generation: u64,
    /// The request that started this transition.
    pub request: NavigationRequest,
    /// The resolved target route.
    pub route: ResolvedRoute,
    /// Soft or hard, as classified.
    pub kind: NavigationKind,
    /// Segment paths still requiring a fetch, parents before children.
    pub fetch_plan: Vec<SegmentPath>,
    cancelled: Arc<AtomicBool>,
}

impl Transition {
    /// Whether a newer transition has superseded this one. Cancellation
    /// is cooperative: in-flight fetches are not aborted, their results
    /// are discarded.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Result of executing a transition.
#[derive(Debug, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The route was committed. Failed segments are contained to their
    /// own render boundary; everything else is visible.
    Committed {
        /// Number of segment fetches that completed and were cached.
        fetched: usize,
        /// Cache keys of segments whose fetch failed.
        failed_segments: Vec<String>,
    },
    /// A newer navigation won; nothing was committed or rendered.
    Superseded,
}

/// Executes fetch plans and owns supersession.
///
/// Only the highest-generation, non-cancelled transition ever commits to
/// the cache or the rendered route; all lower-generation in-flight work
/// is inert once cancelled.
#[derive(Debug, Default)]
pub struct TransitionPipeline {
    generations: AtomicU64,
    active: Mutex<Option<Arc<AtomicBool>>>,
}

impl TransitionPipeline {
    /// Create the pipeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a transition, cancelling any prior one.
    pub fn begin(
        &self,
        request: NavigationRequest,
        route: ResolvedRoute,
        decision: Decision,
    ) -> Transition {
        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        let cancelled = Arc::new(AtomicBool::new(false));
        if let Some(prev) = self.active.lock().replace(cancelled.clone()) {
            prev.store(true, Ordering::SeqCst);
        }
        debug!(generation, target = %route.path, kind = ?decision.kind, "transition begins");
        Transition {
            generation,
            request,
            route,
            kind: decision.kind,
            fetch_plan: decision.fetch_plan,
            cancelled,
        }
    }

    /// Execute the fetch plan and, unless superseded, commit.
    ///
    /// Paths along one ancestor chain fetch sequentially (a child's fetch
    /// may depend on its parent's resolved parameters); independent
    /// branches fetch concurrently. A failed segment is reported to its
    /// error boundary and does not abort the rest of the plan.
    pub async fn execute(
        &self,
        transition: &Transition,
        store: &Mutex<CacheStore>,
        fetcher: &dyn SegmentFetcher,
        renderer: &dyn Renderer,
    ) -> TransitionOutcome {
        let plan = &transition.fetch_plan;
        let markers: HashMap<String, u64> = {
            let mut store = store.lock();
            plan.iter()
                .map(|path| {
                    store.pin(path);
                    (path.cache_key(), store.mark_pending(path))
                })
                .collect()
        };

        if let Some(boundary) = transition.route.first_boundary_depth() {
            for path in plan.iter().filter(|p| p.depth() > boundary + 1) {
                renderer.render_loading_boundary(&path.cache_key());
            }
        }

        let chain_results = join_all(partition_chains(plan).into_iter().map(|chain| {
            self.run_chain(chain, transition, &markers, store, fetcher, renderer)
        }))
        .await;

        {
            let mut store = store.lock();
            for path in plan {
                store.unpin(path);
            }
        }

        if transition.is_cancelled() {
            // Only this transition's own placeholders are cleared; a
            // newer transition may have re-marked some of these paths.
            let mut store = store.lock();
            for path in plan {
                if let Some(marker) = markers.get(&path.cache_key()) {
                    store.clear_pending(path, *marker);
                }
            }
            debug!(generation = transition.generation, "transition superseded");
            return TransitionOutcome::Superseded;
        }

        let mut fetched = 0;
        let mut failed_segments = Vec::new();
        for (chain_fetched, chain_failed) in chain_results {
            fetched += chain_fetched;
            failed_segments.extend(chain_failed);
        }

        let route_key = transition.route.path.cache_key();
        let segments = collect_segments(&store.lock(), &transition.route.path);
        renderer.render(&route_key, &segments);
        debug!(
            generation = transition.generation,
            route = %route_key,
            fetched,
            failed = failed_segments.len(),
            "transition committed"
        );
        TransitionOutcome::Committed {
            fetched,
            failed_segments,
        }
    }

    async fn run_chain(
        &self,
        chain: Vec<&SegmentPath>,
        transition: &Transition,
        markers: &HashMap<String, u64>,
        store: &Mutex<CacheStore>,
        fetcher: &dyn SegmentFetcher,
        renderer: &dyn Renderer,
    ) -> (usize, Vec<String>) {
        let mut fetched = 0;
        let mut failed = Vec::new();
        for path in chain {
            let key = path.cache_key();
            let params = path.params();
            let marker = markers.get(&key).copied().unwrap_or_default();
            let result = fetcher.fetch_segment(&key, &params).await;
            if transition.is_cancelled() {
                // A newer navigation won while this fetch was in flight.
                trace!(key = %key, "discarding superseded fetch result");
                store.lock().clear_pending(path, marker);
                break;
            }
            // An intermediate segment's payload covers only itself; only
            // the terminal entry may claim the whole subtree.
            let completeness = if path.depth() == transition.route.path.depth() {
                Completeness::Full
            } else {
                Completeness::Partial
            };
            match result {
                Ok(segment) => {
                    let mut store = store.lock();
                    // Supersession can land between the check above and
                    // this lock; the flag is re-read with the store held
                    // so a cancelled transition never commits.
                    if transition.is_cancelled() {
                        trace!(key = %key, "discarding superseded fetch result");
                        store.clear_pending(path, marker);
                        break;
                    }
                    store.put(path, segment.payload, completeness, segment.tags);
                    fetched += 1;
                }
                Err(err) => {
                    warn!(key = %key, error = %err, "segment fetch failed");
                    store.lock().clear_pending(path, marker);
                    renderer.render_error_boundary(&key, &err);
                    failed.push(key);
                }
            }
        }
        (fetched, failed)
    }
}

/// Group plan paths into ancestor chains. Within a chain order is
/// parent before child; distinct chains share no ancestry and may run
/// concurrently.
fn partition_chains(plan: &[SegmentPath]) -> Vec<Vec<&SegmentPath>> {
    let mut chains: Vec<Vec<&SegmentPath>> = Vec::new();
    for path in plan {
        let home = chains
            .iter_mut()
            .find(|chain| chain.last().is_some_and(|last| path.starts_with(last)));
        match home {
            Some(chain) => chain.push(path),
            None => chains.push(vec![path]),
        }
    }
    chains
}

/// Payloads for every servable prefix of the committed route, root first.
fn collect_segments(
    store: &CacheStore,
    route: &SegmentPath,
) -> Vec<(String, serde_json::Value)> {
    (1..=route.depth())
        .filter_map(|depth| {
            let prefix = route.prefix(depth);
            store
                .get(&prefix)
                .filter(|entry| entry.is_servable())
                .map(|entry| (prefix.cache_key(), entry.payload.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use async_trait::async_trait;
    use glide_core::{FetchedSegment, NavError, NavigationRequest, RouterConfig};
    use glide_segment::SegmentKind;
    use serde_json::json;

    fn path(parts: &[&str]) -> SegmentPath {
        SegmentPath::new(parts.iter().map(|p| SegmentKind::stat(*p)).collect())
    }

    #[test]
    fn test_begin_supersedes_prior() {
        let pipeline = TransitionPipeline::new();
        let route = ResolvedRoute {
            path: path(&["a"]),
            boundaries: vec![false],
        };
        let decision = Decision {
            kind: NavigationKind::Hard,
            fetch_plan: vec![path(&["a"])],
        };

        let first = pipeline.begin(
            NavigationRequest::programmatic("/a"),
            route.clone(),
            decision.clone(),
        );
        assert!(!first.is_cancelled());

        let second = pipeline.begin(NavigationRequest::programmatic("/a"), route, decision);
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());
        assert!(second.generation > first.generation);
    }

    #[test]
    fn test_partition_keeps_ancestor_chain_together() {
        let plan = vec![path(&["a"]), path(&["a", "b"]), path(&["a", "b", "c"])];
        let chains = partition_chains(&plan);
        assert_eq!(chains.len(), 1);
        assert_eq!(chains[0].len(), 3);
    }

    #[test]
    fn test_partition_splits_independent_branches() {
        let plan = vec![path(&["a", "x"]), path(&["b", "y"])];
        let chains = partition_chains(&plan);
        assert_eq!(chains.len(), 2);
    }

    struct NullRenderer;

    impl Renderer for NullRenderer {
        fn render(&self, _route_key: &str, _segments: &[(String, serde_json::Value)]) {}
        fn render_loading_boundary(&self, _segment_path: &str) {}
        fn render_error_boundary(&self, _segment_path: &str, _error: &NavError) {}
    }

    /// Starts a newer transition while the fetch is in flight, so the
    /// result arrives already superseded.
    struct SupersedingFetcher {
        pipeline: Arc<TransitionPipeline>,
    }

    #[async_trait]
    impl SegmentFetcher for SupersedingFetcher {
        async fn fetch_segment(
            &self,
            segment_path: &str,
            _params: &BTreeMap<String, String>,
        ) -> Result<FetchedSegment, NavError> {
            self.pipeline.begin(
                NavigationRequest::programmatic("/b"),
                ResolvedRoute {
                    path: path(&["b"]),
                    boundaries: vec![false],
                },
                Decision {
                    kind: NavigationKind::Hard,
                    fetch_plan: Vec::new(),
                },
            );
            Ok(FetchedSegment::new(json!({ "segment": segment_path })))
        }
    }

    #[tokio::test]
    async fn test_result_arriving_after_supersession_is_never_committed() {
        let pipeline = Arc::new(TransitionPipeline::new());
        let target = path(&["a"]);
        let transition = pipeline.begin(
            NavigationRequest::programmatic("/a"),
            ResolvedRoute {
                path: target.clone(),
                boundaries: vec![false],
            },
            Decision {
                kind: NavigationKind::Hard,
                fetch_plan: vec![target.clone()],
            },
        );

        let store = Mutex::new(CacheStore::new(&RouterConfig::default()));
        let fetcher = SupersedingFetcher {
            pipeline: pipeline.clone(),
        };
        let outcome = pipeline
            .execute(&transition, &store, &fetcher, &NullRenderer)
            .await;

        assert_eq!(outcome, TransitionOutcome::Superseded);
        assert!(store.lock().get(&target).is_none());
    }
}
