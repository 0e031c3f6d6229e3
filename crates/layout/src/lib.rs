//! # Layout
//!
//! The [`LayoutProvider`] seam through which the agent reads element
//! geometry, computed metrics and the viewport, plus [`StaticLayout`], a
//! fixed geometry table for hosts without a layout engine.

pub mod provider;
pub mod table;

pub use provider::{BoxSizing, ComputedMetrics, LayoutProvider, Viewport};
pub use table::{ElementBox, StaticLayout};
