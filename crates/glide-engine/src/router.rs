//! The application-facing router facade.

use std::sync::Arc;

use glide_cache::{CacheStore, MetricsSnapshot};
use glide_core::{
    HistoryMode, HistorySink, NavError, NavigationRequest, NavigationTrigger, Renderer,
    RouterConfig, ScrollBehavior, SegmentFetcher,
};
use glide_segment::{ResolvedRoute, RouteTree, SegmentPath};
use parking_lot::Mutex;

use crate::{
    Decision, DecisionEngine, HistoryEntry, HistoryManager, NavigationKind, PrefetchOutcome,
    PrefetchScheduler, TransitionOutcome, TransitionPipeline,
};

/// What the embedding application should do with scroll position after a
/// committed navigation.
#[derive(Debug, Clone, PartialEq)]
pub enum ScrollIntent {
    /// Leave scrolling alone (manual mode or superseded navigation).
    None,
    /// Scroll to the top of the named segment (the first changed one).
    TopOfSegment(String),
    /// Scroll to the element named by the fragment identifier.
    Fragment(String),
    /// Restore the recorded offsets and focus (popstate).
    Restore(HistoryEntry),
}

/// Result of a navigation, for the embedding application.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationOutcome {
    /// Soft or hard, as classified.
    pub kind: NavigationKind,
    /// Canonical cache key of the target route.
    pub route_key: String,
    /// Number of segment fetches performed.
    pub fetched: usize,
    /// Cache keys of segments whose fetch failed (their error boundaries
    /// are showing).
    pub failed_segments: Vec<String>,
    /// Scroll handling to apply.
    pub scroll: ScrollIntent,
    /// True when a newer navigation superseded this one; nothing was
    /// committed.
    pub superseded: bool,
}

/// A declarative navigation trigger: a link with its flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Target path, possibly with a fragment.
    pub path: String,
    /// Whether viewport visibility may prefetch this link.
    pub prefetch: bool,
    /// Push or replace on activation.
    pub history_mode: HistoryMode,
    /// Scroll handling on activation.
    pub scroll: ScrollBehavior,
}

impl Link {
    /// Create a link with default flags.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            prefetch: true,
            history_mode: HistoryMode::Push,
            scroll: ScrollBehavior::Auto,
        }
    }

    /// Opt this link out of prefetching.
    pub fn with_prefetch(mut self, prefetch: bool) -> Self {
        self.prefetch = prefetch;
        self
    }

    /// Use replace semantics on activation.
    pub fn with_replace(mut self, replace: bool) -> Self {
        self.history_mode = if replace {
            HistoryMode::Replace
        } else {
            HistoryMode::Push
        };
        self
    }

    /// Set scroll handling.
    pub fn with_scroll(mut self, scroll: ScrollBehavior) -> Self {
        self.scroll = scroll;
        self
    }
}

#[derive(Debug, Clone)]
struct CommittedRoute {
    path: SegmentPath,
    url: String,
}

/// The navigation engine's entry point.
///
/// Owns the cache store, decision engine, prefetch scheduler, transition
/// pipeline, and history manager; consumes fetch/render/history
/// collaborators supplied by the embedding application. Created at app
/// start; a full reload starts from an empty cache.
pub struct Router {
    tree: RouteTree,
    store: Mutex<CacheStore>,
    fetcher: Arc<dyn SegmentFetcher>,
    renderer: Arc<dyn Renderer>,
    history_sink: Arc<dyn HistorySink>,
    decision: DecisionEngine,
    pipeline: TransitionPipeline,
    prefetcher: PrefetchScheduler,
    history: Mutex<HistoryManager>,
    committed: Mutex<Option<CommittedRoute>>,
}

impl Router {
    /// Create a router over the given route tree and collaborators.
    pub fn new(
        tree: RouteTree,
        config: RouterConfig,
        fetcher: Arc<dyn SegmentFetcher>,
        renderer: Arc<dyn Renderer>,
        history_sink: Arc<dyn HistorySink>,
    ) -> Self {
        Self {
            tree,
            store: Mutex::new(CacheStore::new(&config)),
            fetcher,
            renderer,
            history_sink,
            decision: DecisionEngine::new(),
            pipeline: TransitionPipeline::new(),
            prefetcher: PrefetchScheduler::new(&config),
            history: Mutex::new(HistoryManager::new()),
            committed: Mutex::new(None),
        }
    }

    /// Navigate, pushing a history entry.
    pub async fn push(&self, path: &str) -> Result<NavigationOutcome, NavError> {
        self.navigate(NavigationRequest::programmatic(path)).await
    }

    /// Navigate, replacing the current history entry.
    pub async fn replace(&self, path: &str) -> Result<NavigationOutcome, NavError> {
        self.navigate(
            NavigationRequest::programmatic(path).with_history_mode(HistoryMode::Replace),
        )
        .await
    }

    /// Force a hard navigation of the current route, refetching every
    /// segment regardless of cache state.
    pub async fn refresh(&self) -> Result<NavigationOutcome, NavError> {
        let url = {
            let committed = self.committed.lock();
            committed
                .as_ref()
                .ok_or(NavError::NoCommittedRoute)?
                .url
                .clone()
        };
        let route = self.tree.resolve(&url)?;
        let decision = self.decision.refresh_plan(&route.path);
        let request =
            NavigationRequest::programmatic(url).with_history_mode(HistoryMode::Replace);
        self.run_transition(request, route, decision).await
    }

    /// Handle a browser back/forward traversal.
    pub async fn handle_popstate(&self, path: &str) -> Result<NavigationOutcome, NavError> {
        self.navigate(NavigationRequest::popstate(path)).await
    }

    /// Activate a link.
    pub async fn follow(&self, link: &Link) -> Result<NavigationOutcome, NavError> {
        self.navigate(
            NavigationRequest::link(link.path.clone())
                .with_history_mode(link.history_mode)
                .with_scroll(link.scroll),
        )
        .await
    }

    /// Speculatively populate the cache for a path.
    pub async fn prefetch(&self, path: &str) -> Result<PrefetchOutcome, NavError> {
        let route = self.tree.resolve(path)?;
        self.prefetcher
            .prefetch(&route, &self.store, self.fetcher.as_ref())
            .await
    }

    /// A link entered the viewport; prefetch it unless opted out.
    pub async fn link_visible(&self, link: &Link) -> Result<PrefetchOutcome, NavError> {
        if !link.prefetch {
            return Ok(PrefetchOutcome::Disabled);
        }
        self.prefetch(&link.path).await
    }

    /// Execute an arbitrary navigation request.
    pub async fn navigate(
        &self,
        request: NavigationRequest,
    ) -> Result<NavigationOutcome, NavError> {
        let route = self.tree.resolve(&request.path)?;
        let decision = {
            let current = self.committed.lock().as_ref().map(|c| c.path.clone());
            let mut store = self.store.lock();
            self.decision.decide(current.as_ref(), &route, &mut store)
        };
        self.run_transition(request, route, decision).await
    }

    /// Mark every cached entry at or under `path` stale. Takes effect on
    /// the next navigation to an affected path; the currently displayed
    /// route is not re-rendered retroactively.
    pub fn invalidate_by_path(&self, path: &str) -> Result<usize, NavError> {
        let route = self.tree.resolve(path)?;
        Ok(self.store.lock().invalidate_path(&route.path))
    }

    /// Mark every cached entry carrying `tag` stale. Same deferred
    /// semantics as [`Router::invalidate_by_path`].
    pub fn invalidate_by_tag(&self, tag: &str) -> usize {
        self.store.lock().invalidate_tag(tag)
    }

    /// Canonical key of the committed route, if any.
    pub fn current_route(&self) -> Option<String> {
        self.committed.lock().as_ref().map(|c| c.path.cache_key())
    }

    /// Snapshot the cache counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.store.lock().metrics()
    }

    /// Report a scroll offset for a tracked container on the current
    /// route.
    pub fn note_scroll(&self, container: &str, x: f64, y: f64) {
        self.history.lock().note_scroll(container, x, y);
    }

    /// Report the currently focused element on the current route.
    pub fn note_focus(&self, target: Option<String>) {
        self.history.lock().note_focus(target);
    }

    async fn run_transition(
        &self,
        request: NavigationRequest,
        route: ResolvedRoute,
        decision: Decision,
    ) -> Result<NavigationOutcome, NavError> {
        let transition = self.pipeline.begin(request, route, decision);
        let outcome = self
            .pipeline
            .execute(
                &transition,
                &self.store,
                self.fetcher.as_ref(),
                self.renderer.as_ref(),
            )
            .await;
        let route_key = transition.route.path.cache_key();

        let (fetched, failed_segments) = match outcome {
            TransitionOutcome::Superseded => {
                return Ok(NavigationOutcome {
                    kind: transition.kind,
                    route_key,
                    fetched: 0,
                    failed_segments: Vec::new(),
                    scroll: ScrollIntent::None,
                    superseded: true,
                });
            }
            TransitionOutcome::Committed {
                fetched,
                failed_segments,
            } => (fetched, failed_segments),
        };

        let previous = self.committed.lock().clone();
        {
            // Re-point the eviction pins from the old route to the new.
            let mut store = self.store.lock();
            if let Some(previous) = &previous {
                for depth in 1..=previous.path.depth() {
                    store.unpin(&previous.path.prefix(depth));
                }
            }
            for depth in 1..=transition.route.path.depth() {
                store.pin(&transition.route.path.prefix(depth));
            }
        }
        *self.committed.lock() = Some(CommittedRoute {
            path: transition.route.path.clone(),
            url: transition.request.path.clone(),
        });

        let scroll = if transition.request.trigger == NavigationTrigger::PopState {
            self.history
                .lock()
                .restore(&route_key)
                .cloned()
                .map(ScrollIntent::Restore)
                .unwrap_or(ScrollIntent::None)
        } else {
            self.history
                .lock()
                .record(&route_key, transition.request.history_mode);
            match transition.request.history_mode {
                HistoryMode::Push => self.history_sink.push_url(&transition.request.path),
                HistoryMode::Replace => {
                    self.history_sink.replace_url(&transition.request.path)
                }
            }
            self.scroll_intent_for(&transition.request, &previous, &transition.route.path)
        };

        Ok(NavigationOutcome {
            kind: transition.kind,
            route_key,
            fetched,
            failed_segments,
            scroll,
            superseded: false,
        })
    }

    fn scroll_intent_for(
        &self,
        request: &NavigationRequest,
        previous: &Option<CommittedRoute>,
        target: &SegmentPath,
    ) -> ScrollIntent {
        if request.scroll == ScrollBehavior::Manual {
            return ScrollIntent::None;
        }
        if let Some(fragment) = &request.fragment {
            return ScrollIntent::Fragment(fragment.clone());
        }
        let first_changed = match previous {
            Some(previous) => {
                let diff = previous.path.diff(target);
                if diff.is_same_route() {
                    target.clone()
                } else {
                    target.prefix(diff.common_prefix_depth + 1)
                }
            }
            None => target.clone(),
        };
        ScrollIntent::TopOfSegment(first_changed.cache_key())
    }
}
