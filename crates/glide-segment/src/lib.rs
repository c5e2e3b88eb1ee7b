//! Route tree and segment-path primitives.
//!
//! A route is a path through a tree of segments. Each segment is either
//! static (`products`) or dynamic (`[team]` bound to a concrete value at
//! resolve time). The canonical string form of a resolved path is the
//! cache key used throughout the engine; a dynamic segment embeds its
//! bound value, so `team-red` and `team-blue` are distinct keys.

mod path;
mod tree;

pub use path::*;
pub use tree::*;
