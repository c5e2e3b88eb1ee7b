//! Error types for the navigation engine.

use thiserror::Error;

/// Errors that can occur during navigation.
///
/// A cache miss is not an error (it triggers a fetch), and a cancelled
/// transition's late result is silently discarded rather than surfaced.
#[derive(Error, Debug)]
pub enum NavError {
    /// The path does not resolve against the route tree. Fatal to that
    /// navigation attempt; no state changes.
    #[error("Malformed path: {0}")]
    MalformedPath(String),

    /// A segment's fetch collaborator failed. Contained to that segment's
    /// render boundary; already committed segments remain visible.
    #[error("Segment fetch failed at {path}: {reason}")]
    FetchFailure {
        /// Cache key of the failing segment path.
        path: String,
        /// Transport-level failure description.
        reason: String,
    },

    /// No route is currently committed (e.g., `refresh` before the first
    /// navigation).
    #[error("No committed route")]
    NoCommittedRoute,
}

impl NavError {
    /// Build a fetch failure for a segment path.
    pub fn fetch_failure(path: impl Into<String>, reason: impl Into<String>) -> Self {
        NavError::FetchFailure {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
