//! Edit operations as they arrive from the editor.

use std::collections::BTreeMap;

use dom::StableId;
use serde::{Deserialize, Serialize};

/// Where a new or moved child goes inside its parent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionHint {
    pub before: Option<StableId>,
    pub after: Option<StableId>,
    pub first_child: bool,
    pub last_child: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// One tree edit. Structural and text edits address their parent through
/// `parentID`; the rest address the node itself through `tagID`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditOp {
    AttrChange {
        #[serde(rename = "tagID")]
        tag_id: StableId,
        attribute: String,
        value: String,
    },
    AttrAdd {
        #[serde(rename = "tagID")]
        tag_id: StableId,
        attribute: String,
        value: String,
    },
    AttrDelete {
        #[serde(rename = "tagID")]
        tag_id: StableId,
        attribute: String,
    },
    ElementDelete {
        #[serde(rename = "tagID")]
        tag_id: StableId,
    },
    ElementInsert {
        #[serde(rename = "tagID")]
        tag_id: StableId,
        /// Absent only for the document-level singletons.
        #[serde(rename = "parentID", default, skip_serializing_if = "Option::is_none")]
        parent_id: Option<StableId>,
        tag: String,
        #[serde(default)]
        attributes: BTreeMap<String, String>,
        #[serde(rename = "beforeID", default, skip_serializing_if = "Option::is_none")]
        before_id: Option<StableId>,
        #[serde(rename = "afterID", default, skip_serializing_if = "Option::is_none")]
        after_id: Option<StableId>,
        #[serde(rename = "firstChild", default, skip_serializing_if = "is_false")]
        first_child: bool,
        #[serde(rename = "lastChild", default, skip_serializing_if = "is_false")]
        last_child: bool,
    },
    ElementMove {
        #[serde(rename = "tagID")]
        tag_id: StableId,
        #[serde(rename = "parentID")]
        parent_id: StableId,
        #[serde(rename = "beforeID", default, skip_serializing_if = "Option::is_none")]
        before_id: Option<StableId>,
        #[serde(rename = "afterID", default, skip_serializing_if = "Option::is_none")]
        after_id: Option<StableId>,
        #[serde(rename = "firstChild", default, skip_serializing_if = "is_false")]
        first_child: bool,
        #[serde(rename = "lastChild", default, skip_serializing_if = "is_false")]
        last_child: bool,
    },
    TextInsert {
        #[serde(rename = "parentID")]
        parent_id: StableId,
        content: String,
        #[serde(rename = "beforeID", default, skip_serializing_if = "Option::is_none")]
        before_id: Option<StableId>,
        #[serde(rename = "afterID", default, skip_serializing_if = "Option::is_none")]
        after_id: Option<StableId>,
        #[serde(rename = "firstChild", default, skip_serializing_if = "is_false")]
        first_child: bool,
        #[serde(rename = "lastChild", default, skip_serializing_if = "is_false")]
        last_child: bool,
    },
    TextReplace {
        #[serde(rename = "parentID")]
        parent_id: StableId,
        content: String,
        #[serde(rename = "beforeID", default, skip_serializing_if = "Option::is_none")]
        before_id: Option<StableId>,
        #[serde(rename = "afterID", default, skip_serializing_if = "Option::is_none")]
        after_id: Option<StableId>,
    },
    TextDelete {
        #[serde(rename = "parentID")]
        parent_id: StableId,
        #[serde(rename = "beforeID", default, skip_serializing_if = "Option::is_none")]
        before_id: Option<StableId>,
        #[serde(rename = "afterID", default, skip_serializing_if = "Option::is_none")]
        after_id: Option<StableId>,
    },
    RememberNodes {
        #[serde(rename = "tagIDs")]
        tag_ids: Vec<StableId>,
    },
}

impl EditOp {
    /// Parse a JSON array of edits.
    pub fn parse_batch(json: &str) -> Result<Vec<EditOp>, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The wire `type` name.
    pub fn kind(&self) -> &'static str {
        match self {
            EditOp::AttrChange { .. } => "attrChange",
            EditOp::AttrAdd { .. } => "attrAdd",
            EditOp::AttrDelete { .. } => "attrDelete",
            EditOp::ElementDelete { .. } => "elementDelete",
            EditOp::ElementInsert { .. } => "elementInsert",
            EditOp::ElementMove { .. } => "elementMove",
            EditOp::TextInsert { .. } => "textInsert",
            EditOp::TextReplace { .. } => "textReplace",
            EditOp::TextDelete { .. } => "textDelete",
            EditOp::RememberNodes { .. } => "rememberNodes",
        }
    }

    /// Positioning fields; all empty for edits that do not place a node.
    pub fn position(&self) -> PositionHint {
        match *self {
            EditOp::ElementInsert {
                before_id,
                after_id,
                first_child,
                last_child,
                ..
            }
            | EditOp::ElementMove {
                before_id,
                after_id,
                first_child,
                last_child,
                ..
            }
            | EditOp::TextInsert {
                before_id,
                after_id,
                first_child,
                last_child,
                ..
            } => PositionHint {
                before: before_id,
                after: after_id,
                first_child,
                last_child,
            },
            EditOp::TextReplace {
                before_id, after_id, ..
            }
            | EditOp::TextDelete {
                before_id, after_id, ..
            } => PositionHint {
                before: before_id,
                after: after_id,
                ..PositionHint::default()
            },
            _ => PositionHint::default(),
        }
    }
}
