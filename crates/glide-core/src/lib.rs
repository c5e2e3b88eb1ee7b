//! Core abstractions for the Glide navigation engine.
//!
//! This crate provides the fundamental types and traits:
//! - `NavigationRequest` - A single navigation intent
//! - `RouterConfig` - Engine tunables
//! - `NavError` - Error taxonomy
//! - `SegmentFetcher` / `Renderer` / `HistorySink` - Collaborator seams

mod config;
mod error;
mod request;
mod traits;

pub use config::*;
pub use error::*;
pub use request::*;
pub use traits::*;
