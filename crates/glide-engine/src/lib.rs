//! The Glide navigation engine.
//!
//! Orchestrates the pieces the other crates provide:
//! - `DecisionEngine` - classifies transitions as soft or hard and plans
//!   the minimal set of segment fetches
//! - `PrefetchScheduler` - populates the cache speculatively
//! - `TransitionPipeline` - executes fetch plans with generation-based
//!   cancellation
//! - `HistoryManager` - scroll/focus capture and popstate restore
//! - `Router` - the application-facing facade

mod decision;
mod history;
pub mod prelude;
mod prefetch;
mod router;
mod transition;

pub use decision::*;
pub use history::*;
pub use prefetch::*;
pub use router::*;
pub use transition::*;
