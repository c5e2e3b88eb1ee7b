//! Prelude for convenient imports.
//!
//! ```rust,ignore
//! use glide_engine::prelude::*;
//! ```

pub use glide_cache::{CacheEntry, CacheStore, Completeness, EntryState, MetricsSnapshot};
pub use glide_core::{
    FetchedSegment, HistoryMode, HistorySink, NavError, NavigationRequest, NavigationTrigger,
    Renderer, RouterConfig, ScrollBehavior, SegmentFetcher,
};
pub use glide_segment::{PathDiff, ResolvedRoute, RouteTree, SegmentKind, SegmentPath};

pub use crate::{
    Decision, DecisionEngine, HistoryEntry, HistoryManager, Link, NavigationKind,
    NavigationOutcome, PrefetchOutcome, PrefetchScheduler, Router, ScrollIntent, Transition,
    TransitionOutcome, TransitionPipeline,
};
