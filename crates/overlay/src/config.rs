//! Highlight appearance settings (`remoteHighlight` in the agent config).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// CSS property → value, as configured by the controller. Values may be JSON
/// numbers (`"opacity": 0`).
pub type StyleValues = BTreeMap<String, Value>;

fn values(v: Value) -> StyleValues {
    match v {
        Value::Object(map) => map.into_iter().collect(),
        _ => StyleValues::new(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HighlightConfig {
    /// Applied to a fresh animated overlay; the transition then runs toward
    /// `animate_end_value`.
    pub animate_start_value: StyleValues,
    pub animate_end_value: StyleValues,
    pub padding_styling: StyleValues,
    pub margin_styling: StyleValues,
    /// Extra properties merged over the overlay's base styles.
    pub styles_to_set: StyleValues,
    pub border_color: String,
    pub show_padding_margin: bool,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            animate_start_value: values(json!({
                "background-color": "rgba(0, 162, 255, 0.5)",
                "opacity": 0
            })),
            animate_end_value: values(json!({
                "background-color": "rgba(0, 162, 255, 0)",
                "opacity": 0.6
            })),
            padding_styling: values(json!({
                "border-width": "1px",
                "border-style": "dashed",
                "border-color": "rgba(0, 162, 255, 0.5)"
            })),
            margin_styling: values(json!({
                "background-color": "rgba(21, 165, 255, 0.58)"
            })),
            styles_to_set: StyleValues::new(),
            border_color: "rgba(21, 165, 255, 0.85)".to_string(),
            show_padding_margin: true,
        }
    }
}
