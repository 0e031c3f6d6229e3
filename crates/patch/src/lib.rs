//! # Patch Engine
//!
//! Applies ordered batches of tree edits, addressed by stable ids, to the
//! live DOM without reloading it.

pub mod cache;
pub mod edit;
pub mod engine;
pub mod error;

pub use cache::RememberedNodeCache;
pub use edit::{EditOp, PositionHint};
pub use engine::{PatchEngine, PatchReport, SkippedEdit};
pub use error::PatchError;
