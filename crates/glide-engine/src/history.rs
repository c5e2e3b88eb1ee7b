//! History entries with scroll/focus capture.

use std::collections::BTreeMap;

use glide_core::HistoryMode;

/// One recorded navigation: where the user was and what they were
/// looking at.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    /// Canonical cache key of the committed route.
    pub route_key: String,
    /// Per-scrollable-container offsets, keyed by container id.
    pub scroll_positions: BTreeMap<String, (f64, f64)>,
    /// The focused element at departure time, if any.
    pub focus_target: Option<String>,
}

impl HistoryEntry {
    fn new(route_key: impl Into<String>) -> Self {
        Self {
            route_key: route_key.into(),
            scroll_positions: BTreeMap::new(),
            focus_target: None,
        }
    }
}

/// Ordered stack of navigation entries mirroring browser history, with a
/// cursor marking the entry currently displayed.
///
/// An entry is created on every committed (non-popstate) navigation and
/// updated in place as the application reports scroll and focus changes.
/// Back/forward moves the cursor without destroying entries, so scroll
/// and focus reports always land on the entry being displayed, not the
/// top of the stack.
#[derive(Debug, Default)]
pub struct HistoryManager {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl HistoryManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a committed navigation, pushing or replacing the current
    /// entry. A push from mid-stack discards the forward entries, as the
    /// browser does.
    pub fn record(&mut self, route_key: &str, mode: HistoryMode) {
        let entry = HistoryEntry::new(route_key);
        match mode {
            HistoryMode::Replace if !self.entries.is_empty() => {
                self.entries[self.cursor] = entry;
            }
            _ => {
                self.entries.truncate(self.cursor + 1);
                self.entries.push(entry);
                self.cursor = self.entries.len() - 1;
            }
        }
    }

    /// Update the current entry's offset for one scrollable container.
    pub fn note_scroll(&mut self, container: &str, x: f64, y: f64) {
        if let Some(entry) = self.entries.get_mut(self.cursor) {
            entry.scroll_positions.insert(container.to_string(), (x, y));
        }
    }

    /// Update the current entry's focus target.
    pub fn note_focus(&mut self, target: Option<String>) {
        if let Some(entry) = self.entries.get_mut(self.cursor) {
            entry.focus_target = target;
        }
    }

    /// Find the entry a back/forward traversal lands on and move the
    /// cursor there, so later scroll/focus reports attach to it.
    /// Backwards from the cursor is searched first (back is the common
    /// traversal), then forward. The entry is read, not removed.
    pub fn restore(&mut self, route_key: &str) -> Option<&HistoryEntry> {
        let behind = self.entries[..self.cursor]
            .iter()
            .rposition(|entry| entry.route_key == route_key);
        let ahead = || {
            self.entries[self.cursor..]
                .iter()
                .position(|entry| entry.route_key == route_key)
                .map(|offset| self.cursor + offset)
        };
        let index = behind.or_else(ahead)?;
        self.cursor = index;
        self.entries.get(index)
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
