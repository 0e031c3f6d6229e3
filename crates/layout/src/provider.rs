//! The seam between the agent and whatever lays the page out.
//!
//! The agent never computes layout itself. Element geometry, computed box
//! metrics, the viewport and hit testing all come from a [`LayoutProvider`].

use common::{Edges, Point, Rect};
use dom::{Dom, NodeId};
use serde::{Deserialize, Serialize};

/// `box-sizing`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoxSizing {
    #[default]
    ContentBox,
    BorderBox,
}

impl BoxSizing {
    pub fn as_str(self) -> &'static str {
        match self {
            BoxSizing::ContentBox => "content-box",
            BoxSizing::BorderBox => "border-box",
        }
    }
}

/// Computed, used-value metrics of one element, in CSS pixels and seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ComputedMetrics {
    /// Computed `width`: the content width, or the border-box width under
    /// `box-sizing: border-box`.
    pub width: f32,
    pub height: f32,
    pub margin: Edges<f32>,
    pub border: Edges<f32>,
    pub padding: Edges<f32>,
    pub box_sizing: BoxSizing,
    pub transition_duration: f32,
    pub animation_duration: f32,
}

impl ComputedMetrics {
    /// How long the element keeps moving: its animation duration when it has
    /// one, else its transition duration.
    pub fn motion_duration(&self) -> Option<f32> {
        [self.animation_duration, self.transition_duration]
            .into_iter()
            .find(|&d| d > 0.0)
    }
}

/// Viewport size and scroll position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub scroll_x: f32,
    pub scroll_y: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 768.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }
}

pub trait LayoutProvider {
    /// Border box relative to the viewport.
    fn bounding_rect(&self, dom: &Dom, node: NodeId) -> Rect;

    /// `offsetLeft`/`offsetTop` relative to [`LayoutProvider::offset_parent`].
    fn offset(&self, dom: &Dom, node: NodeId) -> Point;

    fn offset_parent(&self, dom: &Dom, node: NodeId) -> Option<NodeId>;

    /// Computed metrics; `None` when the element is not rendered.
    fn computed(&self, dom: &Dom, node: NodeId) -> Option<ComputedMetrics>;

    fn viewport(&self) -> Viewport;

    /// Scroll the viewport. Hosts that cannot scroll ignore this.
    fn scroll_to(&mut self, _x: f32, _y: f32) {}

    /// Topmost element under a viewport-relative point.
    fn element_at(&self, dom: &Dom, x: f32, y: f32) -> Option<NodeId>;

    /// Sum of offsets along the offset-parent chain. Transforms are ignored.
    fn page_offset(&self, dom: &Dom, node: NodeId) -> Point {
        let mut total = Point::ZERO;
        let mut current = Some(node);
        let mut guard = 0usize;
        while let Some(n) = current {
            total = total + self.offset(dom, n);
            current = self.offset_parent(dom, n);
            guard += 1;
            if guard > dom.nodes.len() {
                break;
            }
        }
        total
    }

    /// Distance from the top of the document.
    fn document_offset_top(&self, dom: &Dom, node: NodeId) -> f32 {
        self.page_offset(dom, node).y
    }

    fn is_in_viewport(&self, dom: &Dom, node: NodeId) -> bool {
        let vp = self.viewport();
        self.bounding_rect(dom, node).fits_within(vp.width, vp.height)
    }
}
