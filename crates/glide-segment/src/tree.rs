//! The route tree: known route shapes and path resolution.

use std::collections::BTreeMap;

use glide_core::NavError;

use crate::{SegmentKind, SegmentPath};

/// One node of the route tree.
///
/// Children are split by kind: static children keyed by their literal
/// segment, and at most one dynamic child whose key is its parameter name.
#[derive(Debug, Default)]
struct RouteNode {
    statics: BTreeMap<String, RouteNode>,
    dynamic: Option<(String, Box<RouteNode>)>,
    has_loading_boundary: bool,
}

/// The set of known route shapes.
///
/// Patterns use `[param]` for dynamic segments:
///
/// ```text
/// /blog/hello-world
/// /dashboard/[team]/settings
/// ```
#[derive(Debug, Default)]
pub struct RouteTree {
    root: RouteNode,
}

impl RouteTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a route pattern, creating intermediate nodes as needed.
    ///
    /// Fails with `MalformedPath` if a node would need two dynamic
    /// children with different parameter names: a dynamic node's
    /// parameter name is constant across all values bound to it.
    pub fn add_route(&mut self, pattern: &str) -> Result<(), NavError> {
        let mut node = &mut self.root;
        for part in split_segments(pattern) {
            if let Some(param) = dynamic_param(part) {
                let (existing, child) = node
                    .dynamic
                    .get_or_insert_with(|| (param.to_string(), Box::default()));
                if existing.as_str() != param {
                    return Err(NavError::MalformedPath(format!(
                        "conflicting dynamic segments [{existing}] and [{param}] in {pattern}"
                    )));
                }
                node = child;
            } else {
                node = node.statics.entry(part.to_string()).or_default();
            }
        }
        Ok(())
    }

    /// Mark the node at `pattern` as defining an interstitial loading
    /// placeholder. The pattern must already be part of a registered
    /// route shape.
    pub fn add_loading_boundary(&mut self, pattern: &str) -> Result<(), NavError> {
        let mut node = &mut self.root;
        for part in split_segments(pattern) {
            node = if let Some(param) = dynamic_param(part) {
                match &mut node.dynamic {
                    Some((existing, child)) if existing.as_str() == param => child,
                    _ => return Err(NavError::MalformedPath(pattern.to_string())),
                }
            } else {
                node.statics
                    .get_mut(part)
                    .ok_or_else(|| NavError::MalformedPath(pattern.to_string()))?
            };
        }
        node.has_loading_boundary = true;
        Ok(())
    }

    /// Resolve a concrete URL path against the known route shapes,
    /// binding dynamic parameter values.
    ///
    /// Static children win over the dynamic child when both could match.
    pub fn resolve(&self, path: &str) -> Result<ResolvedRoute, NavError> {
        let mut node = &self.root;
        let mut segments = Vec::new();
        let mut boundaries = Vec::new();
        for part in split_segments(path) {
            if let Some(child) = node.statics.get(part) {
                segments.push(SegmentKind::stat(part));
                node = child;
            } else if let Some((param, child)) = &node.dynamic {
                segments.push(SegmentKind::dynamic(param.clone(), part));
                node = child;
            } else {
                return Err(NavError::MalformedPath(path.to_string()));
            }
            boundaries.push(node.has_loading_boundary);
        }
        Ok(ResolvedRoute {
            path: SegmentPath::new(segments),
            boundaries,
        })
    }
}

/// A path resolved against the route tree, with per-depth loading
/// boundary flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    /// The resolved segments, root first.
    pub path: SegmentPath,
    /// `boundaries[i]` is true when the segment at index `i` defines a
    /// loading placeholder.
    pub boundaries: Vec<bool>,
}

impl ResolvedRoute {
    /// Whether every segment along the path is static.
    pub fn is_fully_static(&self) -> bool {
        !self.path.segments().iter().any(SegmentKind::is_dynamic)
    }

    /// Index of the first segment with a loading boundary.
    pub fn first_boundary_depth(&self) -> Option<usize> {
        self.boundaries.iter().position(|&b| b)
    }

    /// The prefetch-bounded prefix of this route.
    ///
    /// A fully static path prefetches in full. A path with any dynamic
    /// segment prefetches down to, and including, the first loading
    /// boundary; with no boundary there is no useful bounded prefix.
    pub fn bounded_prefix(&self) -> Option<SegmentPath> {
        if self.is_fully_static() {
            Some(self.path.clone())
        } else {
            self.first_boundary_depth()
                .map(|depth| self.path.prefix(depth + 1))
        }
    }
}

fn split_segments(path: &str) -> impl Iterator<Item = &str> {
    path.trim_start_matches('/')
        .trim_end_matches('/')
        .split('/')
        .filter(|p| !p.is_empty())
}

fn dynamic_param(part: &str) -> Option<&str> {
    part.strip_prefix('[')?.strip_suffix(']')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> RouteTree {
        let mut tree = RouteTree::new();
        tree.add_route("/blog/hello-world").unwrap();
        tree.add_route("/dashboard/[team]/settings").unwrap();
        tree.add_route("/dashboard/[team]/billing").unwrap();
        tree.add_loading_boundary("/dashboard/[team]").unwrap();
        tree
    }

    #[test]
    fn test_resolve_static() {
        let route = tree().resolve("/blog/hello-world").unwrap();
        assert!(route.is_fully_static());
        assert_eq!(route.path.cache_key(), "/blog/hello-world");
        assert_eq!(route.bounded_prefix(), Some(route.path.clone()));
    }

    #[test]
    fn test_resolve_binds_dynamic_value() {
        let route = tree().resolve("/dashboard/team-red/settings").unwrap();
        assert!(!route.is_fully_static());
        assert_eq!(
            route.path.cache_key(),
            "/dashboard/[team=team-red]/settings"
        );
        assert_eq!(
            route.path.params().get("team").map(String::as_str),
            Some("team-red")
        );
    }

    #[test]
    fn test_bounded_prefix_stops_at_loading_boundary() {
        let route = tree().resolve("/dashboard/team-red/settings").unwrap();
        assert_eq!(route.first_boundary_depth(), Some(1));
        assert_eq!(
            route.bounded_prefix().unwrap().cache_key(),
            "/dashboard/[team=team-red]"
        );
    }

    #[test]
    fn test_dynamic_route_without_boundary_has_no_bound() {
        let mut tree = RouteTree::new();
        tree.add_route("/users/[id]").unwrap();
        let route = tree.resolve("/users/42").unwrap();
        assert_eq!(route.bounded_prefix(), None);
    }

    #[test]
    fn test_unknown_path_is_malformed() {
        let err = tree().resolve("/nope/at-all").unwrap_err();
        assert!(matches!(err, NavError::MalformedPath(_)));
    }

    #[test]
    fn test_conflicting_params_rejected() {
        let mut tree = RouteTree::new();
        tree.add_route("/dashboard/[team]").unwrap();
        let err = tree.add_route("/dashboard/[org]").unwrap_err();
        assert!(matches!(err, NavError::MalformedPath(_)));
    }

    #[test]
    fn test_static_child_wins_over_dynamic() {
        let mut tree = RouteTree::new();
        tree.add_route("/docs/[slug]").unwrap();
        tree.add_route("/docs/intro").unwrap();
        let route = tree.resolve("/docs/intro").unwrap();
        assert!(route.is_fully_static());
    }

    #[test]
    fn test_root_resolves_empty() {
        let route = tree().resolve("/").unwrap();
        assert!(route.path.is_root());
    }
}
