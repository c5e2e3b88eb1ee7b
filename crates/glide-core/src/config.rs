//! Engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tunables for the navigation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// Whether speculative prefetching is active. Disabled outside
    /// production-equivalent mode.
    #[serde(default = "default_prefetch_enabled")]
    pub prefetch_enabled: bool,
    /// Maximum number of prefetch fetches in flight at once.
    #[serde(default = "default_prefetch_concurrency")]
    pub prefetch_concurrency: usize,
    /// Entry cap for the segment cache; eviction runs above it.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// A `Ready` entry idle longer than this becomes an eviction candidate.
    #[serde(default = "default_idle_ttl")]
    pub idle_ttl: Duration,
}

fn default_prefetch_enabled() -> bool {
    true
}

fn default_prefetch_concurrency() -> usize {
    3
}

fn default_cache_capacity() -> usize {
    128
}

fn default_idle_ttl() -> Duration {
    Duration::from_secs(300)
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            prefetch_enabled: default_prefetch_enabled(),
            prefetch_concurrency: default_prefetch_concurrency(),
            cache_capacity: default_cache_capacity(),
            idle_ttl: default_idle_ttl(),
        }
    }
}

impl RouterConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable speculative prefetching.
    pub fn with_prefetch_enabled(mut self, enabled: bool) -> Self {
        self.prefetch_enabled = enabled;
        self
    }

    /// Set the prefetch concurrency bound.
    pub fn with_prefetch_concurrency(mut self, concurrency: usize) -> Self {
        self.prefetch_concurrency = concurrency.max(1);
        self
    }

    /// Set the cache entry cap.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity.max(1);
        self
    }

    /// Set the idle TTL for eviction candidacy.
    pub fn with_idle_ttl(mut self, ttl: Duration) -> Self {
        self.idle_ttl = ttl;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RouterConfig::new();
        assert!(config.prefetch_enabled);
        assert_eq!(config.cache_capacity, 128);
    }

    #[test]
    fn test_builder_clamps() {
        let config = RouterConfig::new()
            .with_prefetch_concurrency(0)
            .with_cache_capacity(0);
        assert_eq!(config.prefetch_concurrency, 1);
        assert_eq!(config.cache_capacity, 1);
    }
}
