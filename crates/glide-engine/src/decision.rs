//! Soft/hard classification and fetch planning.

use glide_cache::{CacheStore, Completeness};
use glide_segment::{ResolvedRoute, SegmentPath};
use tracing::debug;

/// How a transition will be served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationKind {
    /// Served from cache; the fetch plan is empty or covers only the
    /// segments below a loading boundary.
    Soft,
    /// Requires fresh fetches from the first point of divergence down.
    Hard,
}

/// The outcome of classifying a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Soft or hard.
    pub kind: NavigationKind,
    /// Segment paths to fetch, parents before children.
    pub fetch_plan: Vec<SegmentPath>,
}

impl Decision {
    fn soft(fetch_plan: Vec<SegmentPath>) -> Self {
        Self {
            kind: NavigationKind::Soft,
            fetch_plan,
        }
    }

    fn hard(fetch_plan: Vec<SegmentPath>) -> Self {
        Self {
            kind: NavigationKind::Hard,
            fetch_plan,
        }
    }
}

/// Classifies transitions and computes fetch plans.
#[derive(Debug, Default)]
pub struct DecisionEngine;

impl DecisionEngine {
    /// Create the engine.
    pub fn new() -> Self {
        Self
    }

    /// Classify the transition from `current` to `target`.
    ///
    /// Soft iff the target path (or its prefetch-bounded prefix) has a
    /// `Ready` entry and no shared ancestor diverges at a dynamic value.
    /// A changed dynamic value forces hard regardless of cache contents:
    /// entries at and below it belong to a different key and are never
    /// consulted.
    pub fn decide(
        &self,
        current: Option<&SegmentPath>,
        target: &ResolvedRoute,
        store: &mut CacheStore,
    ) -> Decision {
        let target_path = &target.path;
        let depth = target_path.depth();

        let diff = current.map(|c| c.diff(target_path));

        if let Some(diff) = &diff {
            if !diff.is_same_route() && diff.diverges_at_dynamic() {
                debug!(target = %target_path, "dynamic value changed, hard navigation");
                return Decision::hard(plan_range(target_path, diff.common_prefix_depth, depth));
            }
        }

        // Entry at the target path itself. Partial here means the payload
        // is bounded at the path's own loading boundary, which at the
        // target is the whole route.
        if store.lookup(target_path).is_some() {
            debug!(target = %target_path, "soft navigation from cache");
            return Decision::soft(Vec::new());
        }

        // Entry at the prefetch-bounded prefix.
        if let Some(bound) = target.bounded_prefix() {
            if bound.depth() < depth {
                if let Some(completeness) =
                    store.lookup(&bound).map(|entry| entry.completeness)
                {
                    let fetch_plan = match completeness {
                        Completeness::Full => Vec::new(),
                        Completeness::Partial => {
                            plan_range(target_path, bound.depth(), depth)
                        }
                    };
                    debug!(
                        target = %target_path,
                        bound = %bound,
                        missing = fetch_plan.len(),
                        "soft navigation from bounded prefix"
                    );
                    return Decision::soft(fetch_plan);
                }
            }
        }

        // Hard: refetch from the first point of divergence downward. A
        // same-route hard navigation (stale or missing cache) refetches
        // the whole path.
        let divergence = match &diff {
            Some(diff) if !diff.is_same_route() => diff.common_prefix_depth,
            _ => 0,
        };
        debug!(target = %target_path, divergence, "hard navigation");
        Decision::hard(plan_range(target_path, divergence, depth))
    }

    /// The plan for a forced refresh of `route`: every segment from the
    /// root down, regardless of cache state.
    pub fn refresh_plan(&self, route: &SegmentPath) -> Decision {
        Decision::hard(plan_range(route, 0, route.depth()))
    }
}

/// Prefix paths of `path` at depths `from+1 ..= to`, parents first.
fn plan_range(path: &SegmentPath, from: usize, to: usize) -> Vec<SegmentPath> {
    (from..to).map(|d| path.prefix(d + 1)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glide_core::RouterConfig;
    use glide_segment::RouteTree;
    use serde_json::json;

    fn tree() -> RouteTree {
        let mut tree = RouteTree::new();
        tree.add_route("/blog/hello-world").unwrap();
        tree.add_route("/dashboard/[team]/settings").unwrap();
        tree.add_route("/dashboard/[team]/billing").unwrap();
        tree.add_loading_boundary("/dashboard/[team]").unwrap();
        tree
    }

    fn store() -> CacheStore {
        CacheStore::new(&RouterConfig::default())
    }

    #[test]
    fn test_full_entry_is_soft_with_empty_plan() {
        let tree = tree();
        let mut store = store();
        let target = tree.resolve("/blog/hello-world").unwrap();
        store.put(&target.path, json!({}), Completeness::Full, vec![]);

        let decision = DecisionEngine::new().decide(None, &target, &mut store);
        assert_eq!(decision.kind, NavigationKind::Soft);
        assert!(decision.fetch_plan.is_empty());
    }

    #[test]
    fn test_partial_entry_plans_below_boundary() {
        let tree = tree();
        let mut store = store();
        let target = tree.resolve("/dashboard/team-red/settings").unwrap();
        let bound = target.bounded_prefix().unwrap();
        store.put(&bound, json!({}), Completeness::Partial, vec![]);

        let decision = DecisionEngine::new().decide(None, &target, &mut store);
        assert_eq!(decision.kind, NavigationKind::Soft);
        assert_eq!(
            decision
                .fetch_plan
                .iter()
                .map(SegmentPath::cache_key)
                .collect::<Vec<_>>(),
            vec!["/dashboard/[team=team-red]/settings".to_string()]
        );
    }

    #[test]
    fn test_sibling_leaf_under_same_team_is_soft() {
        let tree = tree();
        let mut store = store();
        let current = tree.resolve("/dashboard/team-red/billing").unwrap();
        let target = tree.resolve("/dashboard/team-red/settings").unwrap();
        store.put(&target.path, json!({}), Completeness::Full, vec![]);

        let decision =
            DecisionEngine::new().decide(Some(&current.path), &target, &mut store);
        assert_eq!(decision.kind, NavigationKind::Soft);
        assert!(decision.fetch_plan.is_empty());
    }

    #[test]
    fn test_changed_dynamic_value_is_hard_despite_cache() {
        let tree = tree();
        let mut store = store();
        let current = tree.resolve("/dashboard/team-red/billing").unwrap();
        let target = tree.resolve("/dashboard/team-blue/billing").unwrap();
        // Even a Full entry for the target does not make this soft.
        store.put(&target.path, json!({}), Completeness::Full, vec![]);

        let decision =
            DecisionEngine::new().decide(Some(&current.path), &target, &mut store);
        assert_eq!(decision.kind, NavigationKind::Hard);
        assert_eq!(decision.fetch_plan.len(), 2);
        assert_eq!(
            decision.fetch_plan[0].cache_key(),
            "/dashboard/[team=team-blue]"
        );
    }

    #[test]
    fn test_stale_entry_forces_hard() {
        let tree = tree();
        let mut store = store();
        let target = tree.resolve("/blog/hello-world").unwrap();
        store.put(&target.path, json!({}), Completeness::Full, vec![]);
        store.invalidate_path(&target.path.prefix(1));

        let decision = DecisionEngine::new().decide(None, &target, &mut store);
        assert_eq!(decision.kind, NavigationKind::Hard);
        assert_eq!(decision.fetch_plan.len(), 2);
    }

    #[test]
    fn test_cold_cache_plans_whole_path() {
        let tree = tree();
        let mut store = store();
        let target = tree.resolve("/dashboard/team-red/settings").unwrap();

        let decision = DecisionEngine::new().decide(None, &target, &mut store);
        assert_eq!(decision.kind, NavigationKind::Hard);
        assert_eq!(decision.fetch_plan.len(), 3);
        assert_eq!(decision.fetch_plan[0].cache_key(), "/dashboard");
    }

    #[test]
    fn test_refresh_plan_covers_everything() {
        let tree = tree();
        let route = tree.resolve("/dashboard/team-red/billing").unwrap();
        let decision = DecisionEngine::new().refresh_plan(&route.path);
        assert_eq!(decision.kind, NavigationKind::Hard);
        assert_eq!(decision.fetch_plan.len(), 3);
    }
}
