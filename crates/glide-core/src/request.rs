//! Navigation request types.

use serde::{Deserialize, Serialize};

/// What initiated a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationTrigger {
    /// A link element was activated.
    Link,
    /// An imperative `push`/`replace`/`refresh` call.
    Programmatic,
    /// A browser back/forward traversal.
    PopState,
}

/// How the navigation interacts with the history stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    /// Push a new entry.
    #[default]
    Push,
    /// Replace the current entry.
    Replace,
}

/// Scroll handling after the navigation commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    /// Scroll to the top of the first changed segment (or the fragment
    /// target when one is present).
    #[default]
    Auto,
    /// Leave scrolling to the caller.
    Manual,
}

/// A single navigation intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationRequest {
    /// Target URL path, without any fragment.
    pub path: String,
    /// Fragment identifier stripped off the raw path, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fragment: Option<String>,
    /// What initiated this navigation.
    pub trigger: NavigationTrigger,
    /// Push or replace semantics.
    pub history_mode: HistoryMode,
    /// Scroll handling on commit.
    pub scroll: ScrollBehavior,
}

impl NavigationRequest {
    /// Create a request, splitting any `#fragment` off the raw path.
    ///
    /// A fragment target implies manual scroll handling is not wanted:
    /// the engine scrolls to the named element instead of the top.
    pub fn new(raw_path: impl Into<String>, trigger: NavigationTrigger) -> Self {
        let raw = raw_path.into();
        let (path, fragment) = match raw.split_once('#') {
            Some((p, f)) => {
                let frag = (!f.is_empty()).then(|| f.to_string());
                (p.to_string(), frag)
            }
            None => (raw, None),
        };
        Self {
            path,
            fragment,
            trigger,
            history_mode: HistoryMode::Push,
            scroll: ScrollBehavior::Auto,
        }
    }

    /// Create a link-triggered request.
    pub fn link(raw_path: impl Into<String>) -> Self {
        Self::new(raw_path, NavigationTrigger::Link)
    }

    /// Create a programmatic request.
    pub fn programmatic(raw_path: impl Into<String>) -> Self {
        Self::new(raw_path, NavigationTrigger::Programmatic)
    }

    /// Create a popstate-triggered request (always replace semantics:
    /// the history stack already holds the entry being traversed to).
    pub fn popstate(raw_path: impl Into<String>) -> Self {
        Self::new(raw_path, NavigationTrigger::PopState).with_history_mode(HistoryMode::Replace)
    }

    /// Set push/replace semantics.
    pub fn with_history_mode(mut self, mode: HistoryMode) -> Self {
        self.history_mode = mode;
        self
    }

    /// Set scroll handling.
    pub fn with_scroll(mut self, scroll: ScrollBehavior) -> Self {
        self.scroll = scroll;
        self
    }
}
