//! # Overlay Renderer
//!
//! Screen-space visualizations drawn into the page as overlay subtrees:
//! selection highlights with margin/padding strips, the inspect pane and the
//! goto menu. Also builds the box-model and rule-provenance payloads the
//! inspector reports.

pub mod boxmodel;
pub mod config;
pub mod highlight;
pub mod inline;
pub mod inspect;
pub mod menu;
pub mod pane;

pub use boxmodel::{BoxModelSnapshot, ContentBox, Metadata, PropertySource, SideBox, box_model_snapshot};
pub use config::{HighlightConfig, StyleValues};
pub use highlight::{HIGHLIGHT_MARKER, HighlightSet, Origin, OverlayEffect};
pub use inline::InlineStyle;
pub use inspect::{PathEntry, RuleInfo, data_position, element_label, node_path, rule_provenance};
pub use menu::{GOTO_MARKER, GotoMenu, GotoTarget, SHOWGOTO_MARKER, type_color};
pub use pane::{InspectPane, PANE_ID};
