//! # livepatch
//!
//! An in-page agent for live editing. The editor (the controller) pushes
//! structural edit batches that are patched into the live document without a
//! reload, asks for highlights of elements, and receives inspection data:
//! matched rules, the element path and the box model.
//!
//! The workspace crates each own one concern:
//!
//! - `dom`: arena document with stable ids and overlay nodes
//! - `css` / `style`: stylesheets, selector matching, cascade resolution
//! - `layout`: the geometry seam ([`layout::LayoutProvider`])
//! - `patch`: edit batch application
//! - `overlay`: highlights, inspect pane, goto menu, box-model snapshots
//! - `session`: config, wire protocol, hover-select and liveness machines
//! - `scheduler`: timers and animation frames
//!
//! [`Agent`] ties them together for one page.

pub mod agent;
pub mod event;

pub use agent::{Agent, ControllerRequest};
pub use event::PageEvent;
