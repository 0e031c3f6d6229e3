//! DOM node model.
//!
//! All nodes live in an `Arena<Node>` and are referenced by `NodeId` (a generational index).
//! The tree structure is encoded via parent/child/sibling links stored directly on each node.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A handle into the arena that uniquely identifies a DOM node.
pub type NodeId = arena::GenIndex;

/// Attribute carrying a node's [`StableId`].
pub const STABLE_ID_ATTR: &str = "data-live-id";

/// Class carried by the root of every overlay subtree. Overlay subtrees are
/// invisible to stable-id lookups, selector queries and serialization.
pub const OVERLAY_CLASS: &str = "__live-overlay";

/// Elements whose text content is not entity-parsed by the markup rules.
const RAW_TEXT_TAGS: &[&str] = &[
    "script", "style", "noscript", "noframes", "noembed", "iframe", "xmp",
];

// ---------------------------------------------------------------------------
// StableId
// ---------------------------------------------------------------------------

/// Identifier correlating a live node with its node in the editor's source
/// document. Assigned by the editor, never by the agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StableId(pub u64);

impl StableId {
    /// Parse the textual attribute form. Surrounding whitespace is tolerated.
    pub fn parse(value: &str) -> Option<Self> {
        value.trim().parse().ok().map(StableId)
    }
}

impl fmt::Display for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Attribute
// ---------------------------------------------------------------------------

/// A single attribute on an element (e.g. `class="foo"`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: String,
}

impl Attr {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Element data
// ---------------------------------------------------------------------------

/// Data specific to element nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementData {
    /// Lower-cased tag name.
    pub tag_name: String,
    /// Attributes in insertion order.
    pub attrs: Vec<Attr>,
    /// Cached `id` attribute value for fast lookup.
    pub id: Option<String>,
    /// Cached list of class names (split from the `class` attribute).
    pub classes: Vec<String>,
}

impl ElementData {
    pub fn new(tag_name: &str, attrs: Vec<Attr>) -> Self {
        let mut data = Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs,
            id: None,
            classes: Vec::new(),
        };
        data.refresh_caches();
        data
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    /// Set or replace an attribute. An existing attribute keeps its position.
    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|a| a.name.eq_ignore_ascii_case(name)) {
            Some(existing) => existing.value = value.to_string(),
            None => self.attrs.push(Attr::new(name, value)),
        }
        self.refresh_caches();
    }

    /// Remove an attribute, returning whether it was present.
    pub fn remove_attr(&mut self, name: &str) -> bool {
        let before = self.attrs.len();
        self.attrs.retain(|a| !a.name.eq_ignore_ascii_case(name));
        let removed = self.attrs.len() != before;
        if removed {
            self.refresh_caches();
        }
        removed
    }

    pub fn stable_id(&self) -> Option<StableId> {
        self.attr(STABLE_ID_ATTR).and_then(StableId::parse)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Whether text inserted under this element is kept verbatim.
    pub fn is_raw_text(&self) -> bool {
        RAW_TEXT_TAGS.contains(&self.tag_name.as_str())
    }

    fn refresh_caches(&mut self) {
        self.id = self.attr("id").map(str::to_string);
        self.classes = self
            .attr("class")
            .map(|c| c.split_whitespace().map(String::from).collect())
            .unwrap_or_default();
    }
}

// ---------------------------------------------------------------------------
// Node data (variant per node type)
// ---------------------------------------------------------------------------

/// The payload that distinguishes different kinds of DOM nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text { data: String },
    Comment { data: String },
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A single node in the DOM tree.
///
/// Tree links (`parent`, `first_child`, …) form an intrusive doubly-linked
/// child list so that insertions and removals are O(1).
#[derive(Clone, Debug)]
pub struct Node {
    pub data: NodeData,

    // -- tree links ----------------------------------------------------------
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
}

impl Node {
    /// Create a new detached node.
    pub fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text { .. })
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.data, NodeData::Comment { .. })
    }

    /// Root of an overlay subtree (marked with [`OVERLAY_CLASS`]).
    pub fn is_overlay(&self) -> bool {
        self.as_element().is_some_and(|e| e.has_class(OVERLAY_CLASS))
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn stable_id(&self) -> Option<StableId> {
        self.as_element().and_then(ElementData::stable_id)
    }

    /// Character data of text and comment nodes.
    pub fn character_data(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text { data } | NodeData::Comment { data } => Some(data),
            _ => None,
        }
    }
}
