//! In-memory segment cache.
//!
//! The store maps canonical segment-path keys to cached payloads, keeps a
//! reverse index from invalidation tag to affected keys, and evicts under
//! capacity pressure without touching pinned entries (the committed route
//! and in-flight transitions).
//!
//! Entries are replaced whole on write; readers never observe a
//! half-written entry.

mod entry;
mod metrics;
mod store;

pub use entry::*;
pub use metrics::*;
pub use store::*;
