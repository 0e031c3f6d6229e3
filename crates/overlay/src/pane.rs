//! The inspect pane: a full-viewport mask that follows the pointer and
//! outlines the element under it with nested margin, border, padding and
//! content boxes.

use common::Edges;
use dom::{Attr, Dom, NodeId, OVERLAY_CLASS};
use layout::LayoutProvider;
use tracing::debug;

use crate::inline::{InlineStyle, px};
use crate::inspect::element_label;

pub const PANE_ID: &str = "preview-mask";

const PANE_Z_INDEX: &str = "1000000";

/// Geometry painted into the rings, in viewport pixels.
#[derive(Debug, Clone, Copy, Default)]
struct Rings {
    left: f32,
    top: f32,
    margin: Edges<f32>,
    border: Edges<f32>,
    padding: Edges<f32>,
    width: f32,
    height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InspectPane {
    root: NodeId,
    margin: NodeId,
    border: NodeId,
    padding: NodeId,
    content: NodeId,
}

/// Style of a ring box: its edge color and the ring widths.
fn ring_style(color: &str, widths: Edges<f32>) -> InlineStyle {
    let mut style = InlineStyle::new();
    style
        .set("border-color", color)
        .set("border-style", "solid")
        .set("margin", "0px !important")
        .set("padding", "0px !important")
        .px("border-top-width", widths.top)
        .px("border-right-width", widths.right)
        .px("border-bottom-width", widths.bottom)
        .px("border-left-width", widths.left);
    style
}

const MARGIN_COLOR: &str = "rgba(246, 178, 107, 0.66)";
const BORDER_COLOR: &str = "rgba(255, 229, 153, 0.66)";
const PADDING_COLOR: &str = "rgba(147, 196, 125, 0.55)";
const CONTENT_COLOR: &str = "rgba(111, 168, 220, 0.66)";

impl InspectPane {
    /// Attach the pane to the body. Returns `None` when a pane already
    /// exists or there is nowhere to attach it.
    pub fn create(dom: &mut Dom) -> Option<Self> {
        if Self::exists(dom) {
            return None;
        }
        let host = dom.body().or_else(|| dom.document_element())?;

        let root = dom.create_element(
            "div",
            vec![Attr::new("id", PANE_ID), Attr::new("class", OVERLAY_CLASS)],
        );
        let mut style = InlineStyle::new();
        style
            .set("position", "fixed")
            .set("width", "100%")
            .set("height", "100%")
            .set("top", "0px")
            .set("left", "0px")
            .set("overflow", "hidden")
            .set("pointer-events", "all")
            .set("z-index", PANE_Z_INDEX);
        style.apply(dom, root);

        let ring = |dom: &mut Dom, class: &str| {
            dom.create_element("div", vec![Attr::new("class", class), Attr::new("name", class)])
        };
        let margin = ring(dom, "margin");
        let border = ring(dom, "border");
        let padding = ring(dom, "padding");
        let content = dom.create_element("div", vec![Attr::new("class", "content")]);
        dom.append_child(root, margin);
        dom.append_child(margin, border);
        dom.append_child(border, padding);
        dom.append_child(padding, content);

        let pane = Self {
            root,
            margin,
            border,
            padding,
            content,
        };
        pane.paint(dom, Rings::default());
        dom.append_child(host, root);
        debug!("inspect pane created");
        Some(pane)
    }

    /// Whether some pane is attached to the document.
    pub fn exists(dom: &Dom) -> bool {
        dom.descendants(dom.document())
            .into_iter()
            .any(|n| dom.attribute(n, "id") == Some(PANE_ID) && dom.is_overlay(n))
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn is_attached(&self, dom: &Dom) -> bool {
        dom.nodes.contains(self.root) && dom.is_connected(self.root)
    }

    /// Outline the element under the viewport point `(x, y)` and return it.
    pub fn track(&self, dom: &mut Dom, layout: &dyn LayoutProvider, x: f32, y: f32) -> Option<NodeId> {
        let target = layout.element_at(dom, x, y)?;
        let rect = layout.bounding_rect(dom, target);
        let m = layout.computed(dom, target).unwrap_or_default();

        self.paint(
            dom,
            Rings {
                left: rect.x - m.margin.left,
                top: rect.y - m.margin.top,
                margin: m.margin,
                border: m.border,
                padding: m.padding,
                width: rect.w - m.padding.horizontal(),
                height: rect.h - m.padding.vertical(),
            },
        );
        let title = format!("{}| {}x{}", element_label(dom, target), rect.w, rect.h);
        dom.set_attribute(self.margin, "title", &title);
        Some(target)
    }

    /// The element a click at `(x, y)` lands on, looking through the pane.
    pub fn click_target(&self, dom: &Dom, layout: &dyn LayoutProvider, x: f32, y: f32) -> Option<NodeId> {
        layout.element_at(dom, x, y)
    }

    pub fn remove(self, dom: &mut Dom) {
        if dom.nodes.contains(self.root) {
            dom.release_subtree(self.root);
            debug!("inspect pane removed");
        }
    }

    fn paint(&self, dom: &mut Dom, rings: Rings) {
        let mut outer = ring_style(MARGIN_COLOR, rings.margin);
        outer
            .set("position", "absolute")
            .px("left", rings.left)
            .px("top", rings.top);
        outer.apply(dom, self.margin);
        ring_style(BORDER_COLOR, rings.border).apply(dom, self.border);
        ring_style(PADDING_COLOR, rings.padding).apply(dom, self.padding);

        let mut inner = InlineStyle::new();
        inner
            .set("background-color", CONTENT_COLOR)
            .set("width", px(rings.width))
            .set("height", px(rings.height));
        inner.apply(dom, self.content);
    }
}
