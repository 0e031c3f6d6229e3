//! A fixed layout table keyed by stable id.
//!
//! Hosts that cannot run a real layout pass (the CLI, tests) describe the page
//! geometry up front as JSON:
//!
//! ```json
//! {
//!   "viewport": { "width": 800, "height": 600, "scrollY": 0 },
//!   "boxes": {
//!     "4": { "rect": { "x": 8, "y": 8, "w": 200, "h": 40 }, "padding": { ... } }
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use common::{Edges, Point, Rect};
use dom::{Dom, NodeId};
use serde::{Deserialize, Serialize};

use crate::provider::{BoxSizing, ComputedMetrics, LayoutProvider, Viewport};

/// Geometry of one element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementBox {
    /// Border box in document coordinates.
    pub rect: Rect,
    pub margin: Edges<f32>,
    pub border: Edges<f32>,
    pub padding: Edges<f32>,
    pub box_sizing: BoxSizing,
    pub transition_duration: f32,
    pub animation_duration: f32,
}

impl ElementBox {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StaticLayout {
    pub viewport: Viewport,
    pub boxes: BTreeMap<u64, ElementBox>,
}

impl StaticLayout {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            boxes: BTreeMap::new(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn insert(&mut self, id: u64, element: ElementBox) {
        self.boxes.insert(id, element);
    }

    fn entry(&self, dom: &Dom, node: NodeId) -> Option<&ElementBox> {
        self.boxes.get(&dom.stable_id(node)?.0)
    }
}

impl LayoutProvider for StaticLayout {
    fn bounding_rect(&self, dom: &Dom, node: NodeId) -> Rect {
        self.entry(dom, node)
            .map(|b| b.rect.translate(-self.viewport.scroll_x, -self.viewport.scroll_y))
            .unwrap_or(Rect::ZERO)
    }

    /// Relative to the offset parent's border-box origin, so the offsets along
    /// the chain sum to the document position.
    fn offset(&self, dom: &Dom, node: NodeId) -> Point {
        let Some(own) = self.entry(dom, node) else {
            return Point::ZERO;
        };
        let base = self
            .offset_parent(dom, node)
            .and_then(|p| self.entry(dom, p))
            .map(|p| p.rect.origin())
            .unwrap_or(Point::ZERO);
        own.rect.origin() - base
    }

    /// Nearest ancestor with an entry in the table.
    fn offset_parent(&self, dom: &Dom, node: NodeId) -> Option<NodeId> {
        dom.ancestors(node)
            .into_iter()
            .find(|&a| self.entry(dom, a).is_some())
    }

    fn computed(&self, dom: &Dom, node: NodeId) -> Option<ComputedMetrics> {
        let b = self.entry(dom, node)?;
        let (width, height) = match b.box_sizing {
            BoxSizing::BorderBox => (b.rect.w, b.rect.h),
            BoxSizing::ContentBox => (
                (b.rect.w - b.padding.horizontal() - b.border.horizontal()).max(0.0),
                (b.rect.h - b.padding.vertical() - b.border.vertical()).max(0.0),
            ),
        };
        Some(ComputedMetrics {
            width,
            height,
            margin: b.margin,
            border: b.border,
            padding: b.padding,
            box_sizing: b.box_sizing,
            transition_duration: b.transition_duration,
            animation_duration: b.animation_duration,
        })
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn scroll_to(&mut self, x: f32, y: f32) {
        self.viewport.scroll_x = x.max(0.0);
        self.viewport.scroll_y = y.max(0.0);
    }

    fn element_at(&self, dom: &Dom, x: f32, y: f32) -> Option<NodeId> {
        let (px, py) = (x + self.viewport.scroll_x, y + self.viewport.scroll_y);
        dom.semantic_descendants(dom.document())
            .into_iter()
            .filter(|&n| self.entry(dom, n).is_some_and(|b| b.rect.contains(px, py)))
            .last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::Attr;

    fn page() -> (Dom, StaticLayout, NodeId, NodeId) {
        let mut dom = Dom::new();
        let doc = dom.document();
        let body = dom.create_element("body", vec![Attr::new("data-live-id", "1")]);
        let div = dom.create_element("div", vec![Attr::new("data-live-id", "2")]);
        dom.append_child(doc, body);
        dom.append_child(body, div);

        let mut layout = StaticLayout::new(Viewport {
            width: 800.0,
            height: 600.0,
            ..Viewport::default()
        });
        layout.insert(1, ElementBox::new(Rect::new(0.0, 0.0, 800.0, 2000.0)));
        layout.insert(
            2,
            ElementBox {
                rect: Rect::new(100.0, 1000.0, 120.0, 70.0),
                padding: Edges::all(10.0),
                border: Edges::all(0.0),
                ..ElementBox::default()
            },
        );
        (dom, layout, body, div)
    }

    #[test]
    fn offsets_chain_to_document_position() {
        let (dom, layout, body, div) = page();
        assert_eq!(layout.offset_parent(&dom, div), Some(body));
        assert_eq!(layout.page_offset(&dom, div), Point::new(100.0, 1000.0));
        assert_eq!(layout.document_offset_top(&dom, div), 1000.0);
    }

    #[test]
    fn scroll_moves_bounding_rect_only() {
        let (dom, mut layout, _, div) = page();
        assert!(!layout.is_in_viewport(&dom, div));
        layout.scroll_to(0.0, 900.0);
        assert_eq!(layout.bounding_rect(&dom, div), Rect::new(100.0, 100.0, 120.0, 70.0));
        assert!(layout.is_in_viewport(&dom, div));
        assert_eq!(layout.document_offset_top(&dom, div), 1000.0);
    }

    #[test]
    fn computed_width_follows_box_sizing() {
        let (dom, mut layout, _, div) = page();
        assert_eq!(layout.computed(&dom, div).map(|m| (m.width, m.height)), Some((100.0, 50.0)));
        if let Some(b) = layout.boxes.get_mut(&2) {
            b.box_sizing = BoxSizing::BorderBox;
        }
        assert_eq!(layout.computed(&dom, div).map(|m| (m.width, m.height)), Some((120.0, 70.0)));
    }

    #[test]
    fn hit_test_prefers_innermost() {
        let (dom, layout, body, div) = page();
        assert_eq!(layout.element_at(&dom, 150.0, 1010.0), Some(div));
        assert_eq!(layout.element_at(&dom, 10.0, 10.0), Some(body));
        assert_eq!(layout.element_at(&dom, 900.0, 10.0), None);
    }

    #[test]
    fn loads_from_json() {
        let layout = StaticLayout::from_json(
            r#"{
                "viewport": { "width": 640, "height": 480, "scrollY": 5 },
                "boxes": {
                    "7": {
                        "rect": { "x": 1, "y": 2, "w": 3, "h": 4 },
                        "boxSizing": "border-box",
                        "transitionDuration": 0.5
                    }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(layout.viewport.width, 640.0);
        assert_eq!(layout.viewport.scroll_y, 5.0);
        let b = &layout.boxes[&7];
        assert_eq!(b.box_sizing, BoxSizing::BorderBox);
        assert_eq!(b.rect, Rect::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(b.margin, Edges::zero());
    }

    #[test]
    fn animation_duration_takes_precedence() {
        let m = ComputedMetrics {
            transition_duration: 2.0,
            animation_duration: 0.5,
            ..ComputedMetrics::default()
        };
        assert_eq!(m.motion_duration(), Some(0.5));
        let t = ComputedMetrics {
            transition_duration: 0.3,
            ..ComputedMetrics::default()
        };
        assert_eq!(t.motion_duration(), Some(0.3));
        assert_eq!(ComputedMetrics::default().motion_duration(), None);
    }
}
