//! Highlight sets: which elements are highlighted and the overlays drawn for
//! them.
//!
//! A set never touches timers or the viewport itself. Anything deferred or
//! outside the tree comes back as an [`OverlayEffect`] for the host to run.

use std::time::Duration;

use common::Side;
use dom::{Attr, Dom, NodeId, OVERLAY_CLASS};
use layout::{BoxSizing, ComputedMetrics, LayoutProvider};
use tracing::debug;

use crate::config::{HighlightConfig, StyleValues};
use crate::inline::{InlineStyle, px};

/// Attribute mirrored onto highlighted elements by state-mirroring sets.
pub const HIGHLIGHT_MARKER: &str = "data-live-highlight";

pub const OVERLAY_Z_INDEX: &str = "2000000";

/// Delay before an animated overlay switches to its end values.
pub const ANIMATION_SETTLE: Duration = Duration::from_millis(20);

/// Delay before inspection data for a freshly highlighted element is sent.
pub const INSPECT_DELAY: Duration = Duration::from_millis(100);

/// What triggered an `add`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The controller asked for it; an off-screen element is scrolled to.
    Remote,
    /// Pointer interaction on the page.
    Pointer,
    /// Re-adding during a redraw.
    Redraw,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OverlayEffect {
    /// Scroll the viewport to this document position.
    ScrollTo { x: f32, y: f32 },
    /// The element is transitioning or animating: keep redrawing for this long.
    ArmPulse { duration: Duration },
    /// Call [`HighlightSet::finish_animation`] after this delay.
    FinishAnimation { after: Duration },
    /// Send inspection data for `node` after this delay.
    InspectAfter { node: NodeId, after: Duration },
}

#[derive(Debug, Clone)]
pub struct HighlightSet {
    color: String,
    mirror_state: bool,
    elements: Vec<NodeId>,
    overlays: Vec<NodeId>,
    animating: Vec<NodeId>,
    selector: Option<String>,
}

impl HighlightSet {
    pub fn new(color: &str, mirror_state: bool) -> Self {
        Self {
            color: color.to_string(),
            mirror_state,
            elements: Vec::new(),
            overlays: Vec::new(),
            animating: Vec::new(),
            selector: None,
        }
    }

    /// The set driven by the controller.
    pub fn remote() -> Self {
        Self::new("#cfc", false)
    }

    /// The transient hover set; mirrors its state onto the page.
    pub fn local() -> Self {
        Self::new("#ecc", true)
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn elements(&self) -> &[NodeId] {
        &self.elements
    }

    pub fn overlays(&self) -> &[NodeId] {
        &self.overlays
    }

    pub fn selector(&self) -> Option<&str> {
        self.selector.as_deref()
    }

    /// Make later redraws re-run `selector` instead of reusing the element list.
    pub fn set_selector(&mut self, selector: Option<String>) {
        self.selector = selector;
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.elements.contains(&node)
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Highlight `node`. Already-highlighted nodes and the document are
    /// ignored.
    pub fn add(
        &mut self,
        dom: &mut Dom,
        layout: &dyn LayoutProvider,
        config: &HighlightConfig,
        node: NodeId,
        animate: bool,
        origin: Origin,
    ) -> Vec<OverlayEffect> {
        let mut effects = Vec::new();
        if self.contains(node) || node == dom.document() || !dom.nodes.contains(node) {
            return effects;
        }
        if self.mirror_state {
            dom.set_attribute(node, HIGHLIGHT_MARKER, "1");
        }

        if origin == Origin::Remote && !layout.is_in_viewport(dom, node) {
            let top = layout.document_offset_top(dom, node);
            if top != 0.0 {
                let y = top - layout.viewport().height / 2.0;
                effects.push(OverlayEffect::ScrollTo { x: 0.0, y });
            }
        }

        self.elements.push(node);
        self.draw(dom, layout, config, node, animate, &mut effects);
        effects
    }

    /// Remove every overlay and unmark mirrored elements.
    pub fn clear(&mut self, dom: &mut Dom) {
        for overlay in self.overlays.drain(..) {
            if dom.nodes.contains(overlay) {
                dom.release_subtree(overlay);
            }
        }
        self.animating.clear();
        if self.mirror_state {
            for &node in &self.elements {
                dom.remove_attribute(node, HIGHLIGHT_MARKER);
            }
        }
        self.elements.clear();
    }

    /// Rebuild every overlay from current geometry. Selector-based sets
    /// re-query first; elements no longer in the document are dropped.
    pub fn redraw(
        &mut self,
        dom: &mut Dom,
        layout: &dyn LayoutProvider,
        config: &HighlightConfig,
    ) -> Vec<OverlayEffect> {
        let targets = match &self.selector {
            Some(selector) => style::select(dom, selector).unwrap_or_default(),
            None => self.elements.clone(),
        };
        self.clear(dom);

        let mut effects = Vec::new();
        for node in targets {
            if dom.nodes.contains(node) && dom.is_connected(node) {
                effects.extend(self.add(dom, layout, config, node, false, Origin::Redraw));
            }
        }
        effects
    }

    /// Move animated overlays to their end values.
    pub fn finish_animation(&mut self, dom: &mut Dom, config: &HighlightConfig) {
        for overlay in self.animating.drain(..) {
            if !dom.nodes.contains(overlay) {
                continue;
            }
            let mut style = InlineStyle::read(dom, overlay);
            style.extend_json(&config.animate_end_value);
            style.apply(dom, overlay);
        }
    }

    fn draw(
        &mut self,
        dom: &mut Dom,
        layout: &dyn LayoutProvider,
        config: &HighlightConfig,
        node: NodeId,
        animate: bool,
        effects: &mut Vec<OverlayEffect>,
    ) {
        let Some(m) = layout.computed(dom, node) else {
            return;
        };
        if let Some(secs) = m.motion_duration() {
            effects.push(OverlayEffect::ArmPulse {
                duration: Duration::from_secs_f32(secs),
            });
        }
        if layout.bounding_rect(dom, node).has_no_area() {
            debug!(?node, "zero-area element, no overlay");
            return;
        }

        let size = OverlaySize::of(&m);
        let root = dom.create_element("div", vec![Attr::new("class", OVERLAY_CLASS)]);

        for side in Side::ALL {
            let strip = margin_strip(&m, &size, side);
            append_strip(dom, root, &config.margin_styling, strip, config.show_padding_margin);
        }
        for side in Side::ALL {
            let strip = padding_strip(&m, &size, side);
            append_strip(dom, root, &config.padding_styling, strip, config.show_padding_margin);
        }

        let offset = layout.page_offset(dom, node);
        let mut style = InlineStyle::new();
        style
            .px("left", offset.x)
            .px("top", offset.y)
            .px("width", size.inner_w)
            .px("height", size.inner_h)
            .set("z-index", OVERLAY_Z_INDEX)
            .set("margin", "0")
            .set("padding", "0")
            .set("position", "absolute")
            .set("pointer-events", "none")
            .set("box-shadow", "0 0 1px #fff")
            .set("box-sizing", m.box_sizing.as_str());
        for side in Side::ALL {
            style.set(
                &format!("border-{}", side.as_str()),
                format!("{} solid", px(m.border.get(side))),
            );
        }
        style.set("border-color", config.border_color.as_str());
        style.extend_json(&config.styles_to_set);

        if animate {
            style.extend_json(&config.animate_start_value);
            style
                .set("transition-property", "opacity, background-color, transform")
                .set("transition-duration", "300ms, 2.3s");
            self.animating.push(root);
            effects.push(OverlayEffect::FinishAnimation {
                after: ANIMATION_SETTLE,
            });
        } else {
            style.extend_json(&config.animate_end_value);
        }
        style.apply(dom, root);

        let host = dom
            .body()
            .or_else(|| dom.document_element())
            .unwrap_or_else(|| dom.document());
        dom.append_child(host, root);
        self.overlays.push(root);

        if dom.stable_id(node).is_some() {
            effects.push(OverlayEffect::InspectAfter {
                node,
                after: INSPECT_DELAY,
            });
        }
    }
}

/// Overlay box size: `inner` is the padding box (the overlay's own width and
/// height), `outer` adds borders.
struct OverlaySize {
    inner_w: f32,
    inner_h: f32,
    outer_w: f32,
    outer_h: f32,
    border_box: bool,
}

impl OverlaySize {
    fn of(m: &ComputedMetrics) -> Self {
        let border_box = m.box_sizing == BoxSizing::BorderBox;
        if border_box {
            return Self {
                inner_w: m.width,
                inner_h: m.height,
                outer_w: m.width,
                outer_h: m.height,
                border_box,
            };
        }
        let inner_w = m.width + m.padding.horizontal();
        let inner_h = m.height + m.padding.vertical();
        Self {
            inner_w,
            inner_h,
            outer_w: inner_w + m.border.horizontal(),
            outer_h: inner_h + m.border.vertical(),
            border_box,
        }
    }
}

struct Strip {
    width: f32,
    height: f32,
    style: InlineStyle,
}

/// `-v`, without producing `-0`.
fn negated(v: f32) -> f32 {
    if v == 0.0 { 0.0 } else { -v }
}

fn margin_strip(m: &ComputedMetrics, size: &OverlaySize, side: Side) -> Strip {
    let mut style = InlineStyle::new();
    let (width, height) = if side.is_horizontal() {
        let height = size.outer_h + m.margin.vertical();
        style
            .px("width", m.margin.get(side))
            .px("height", height)
            .px("top", negated(m.margin.top + m.border.top));
        (m.margin.get(side), height)
    } else {
        style
            .px("height", m.margin.get(side))
            .px("width", size.outer_w)
            .px("left", negated(m.border.left));
        (size.outer_w, m.margin.get(side))
    };
    style.px(side.as_str(), negated(m.margin.get(side) + m.border.get(side)));
    style.set("position", "absolute");
    Strip { width, height, style }
}

fn padding_strip(m: &ComputedMetrics, size: &OverlaySize, side: Side) -> Strip {
    let mut style = InlineStyle::new();
    let (width, height) = if side.is_horizontal() {
        let mut height = size.inner_h;
        if size.border_box {
            height -= m.border.vertical();
        }
        style
            .px("width", m.padding.get(side))
            .px("height", height)
            .set("top", "0");
        (m.padding.get(side), height)
    } else {
        let mut width = size.inner_w;
        if size.border_box {
            width -= m.border.horizontal();
        }
        style
            .px("height", m.padding.get(side))
            .px("width", width)
            .set("left", "0");
        (width, m.padding.get(side))
    };
    style.set(side.as_str(), "0");
    style.set("position", "absolute");
    Strip { width, height, style }
}

/// A strip is shown only when enabled and at least one whole pixel in both
/// directions.
fn append_strip(dom: &mut Dom, root: NodeId, base: &StyleValues, strip: Strip, enabled: bool) {
    let visible = enabled && strip.width.trunc() > 0.0 && strip.height.trunc() > 0.0;

    let mut style = InlineStyle::new();
    style.extend_json(base);
    for (name, value) in strip.style.declarations() {
        style.set(name, value);
    }
    style
        .set("display", if visible { "block" } else { "none" })
        .set("transform", "none");

    let div = dom.create_element("div", Vec::new());
    style.apply(dom, div);
    dom.append_child(root, div);
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Edges, Rect};
    use layout::{ElementBox, StaticLayout, Viewport};

    struct Page {
        dom: Dom,
        layout: StaticLayout,
        body: NodeId,
        div: NodeId,
    }

    /// `<html><body id=1><div id=2 class=x/></body></html>`; the div sits at
    /// (100, 200) with margin 10, border 5, padding 15 and a 100×40 content box.
    fn page() -> Page {
        let mut dom = Dom::new();
        let doc = dom.document();
        let html = dom.create_element("html", Vec::new());
        let body = dom.create_element("body", vec![Attr::new("data-live-id", "1")]);
        let div = dom.create_element(
            "div",
            vec![Attr::new("data-live-id", "2"), Attr::new("class", "x")],
        );
        dom.append_child(doc, html);
        dom.append_child(html, body);
        dom.append_child(body, div);

        let mut layout = StaticLayout::new(Viewport {
            width: 800.0,
            height: 600.0,
            ..Viewport::default()
        });
        layout.insert(1, ElementBox::new(Rect::new(0.0, 0.0, 800.0, 3000.0)));
        layout.insert(
            2,
            ElementBox {
                rect: Rect::new(100.0, 200.0, 140.0, 90.0),
                margin: Edges::all(10.0),
                border: Edges::all(5.0),
                padding: Edges::all(15.0),
                ..ElementBox::default()
            },
        );
        Page { dom, layout, body, div }
    }

    fn style_of(dom: &Dom, node: NodeId) -> InlineStyle {
        InlineStyle::read(dom, node)
    }

    #[test]
    fn add_builds_overlay_with_eight_strips() {
        let Page { mut dom, layout, body, div } = page();
        let mut set = HighlightSet::remote();
        let cfg = HighlightConfig::default();
        set.add(&mut dom, &layout, &cfg, div, false, Origin::Pointer);

        let [overlay] = set.overlays() else {
            panic!("expected one overlay");
        };
        assert_eq!(dom.parent(*overlay), Some(body));
        assert!(dom.is_overlay(*overlay));
        assert_eq!(dom.children(*overlay).len(), 8);

        let s = style_of(&dom, *overlay);
        assert_eq!(s.get("left"), Some("100px"));
        assert_eq!(s.get("top"), Some("200px"));
        assert_eq!(s.get("width"), Some("130px"));
        assert_eq!(s.get("height"), Some("70px"));
        assert_eq!(s.get("z-index"), Some(OVERLAY_Z_INDEX));
        assert_eq!(s.get("opacity"), Some("0.6"));
    }

    #[test]
    fn margin_and_padding_strip_geometry() {
        let Page { mut dom, layout, div, .. } = page();
        let mut set = HighlightSet::remote();
        set.add(&mut dom, &layout, &HighlightConfig::default(), div, false, Origin::Pointer);
        let strips = dom.children(set.overlays()[0]);

        let margin_top = style_of(&dom, strips[0]);
        assert_eq!(margin_top.get("height"), Some("10px"));
        assert_eq!(margin_top.get("width"), Some("140px"));
        assert_eq!(margin_top.get("left"), Some("-5px"));
        assert_eq!(margin_top.get("top"), Some("-15px"));
        assert_eq!(margin_top.get("display"), Some("block"));

        let margin_left = style_of(&dom, strips[3]);
        assert_eq!(margin_left.get("width"), Some("10px"));
        assert_eq!(margin_left.get("height"), Some("110px"));
        assert_eq!(margin_left.get("left"), Some("-15px"));

        let padding_right = style_of(&dom, strips[5]);
        assert_eq!(padding_right.get("width"), Some("15px"));
        assert_eq!(padding_right.get("height"), Some("70px"));
        assert_eq!(padding_right.get("right"), Some("0"));
        assert_eq!(padding_right.get("border-style"), Some("dashed"));
    }

    #[test]
    fn strips_hide_when_disabled_or_empty() {
        let Page { mut dom, mut layout, div, .. } = page();
        if let Some(b) = layout.boxes.get_mut(&2) {
            b.margin = Edges::zero();
        }
        let mut set = HighlightSet::remote();
        let cfg = HighlightConfig::default();
        set.add(&mut dom, &layout, &cfg, div, false, Origin::Pointer);
        let strips = dom.children(set.overlays()[0]);
        assert_eq!(style_of(&dom, strips[0]).get("display"), Some("none"));
        assert_eq!(style_of(&dom, strips[4]).get("display"), Some("block"));

        set.clear(&mut dom);
        let hidden = HighlightConfig {
            show_padding_margin: false,
            ..HighlightConfig::default()
        };
        set.add(&mut dom, &layout, &hidden, div, false, Origin::Pointer);
        for strip in dom.children(set.overlays()[0]) {
            assert_eq!(style_of(&dom, strip).get("display"), Some("none"));
        }
    }

    #[test]
    fn only_fully_collapsed_boxes_are_skipped() {
        let Page { mut dom, mut layout, div, .. } = page();
        let cfg = HighlightConfig::default();
        layout.insert(2, ElementBox::new(Rect::new(100.0, 200.0, 0.0, 0.0)));
        let mut set = HighlightSet::remote();
        set.add(&mut dom, &layout, &cfg, div, false, Origin::Pointer);
        assert!(set.overlays().is_empty());

        layout.insert(2, ElementBox::new(Rect::new(100.0, 200.0, 0.0, 40.0)));
        let mut set = HighlightSet::remote();
        set.add(&mut dom, &layout, &cfg, div, false, Origin::Pointer);
        assert_eq!(set.overlays().len(), 1);
        assert_eq!(style_of(&dom, set.overlays()[0]).get("width"), Some("0px"));
    }

    #[test]
    fn duplicates_and_document_are_ignored() {
        let Page { mut dom, layout, div, .. } = page();
        let mut set = HighlightSet::remote();
        let cfg = HighlightConfig::default();
        set.add(&mut dom, &layout, &cfg, div, false, Origin::Pointer);
        set.add(&mut dom, &layout, &cfg, div, false, Origin::Pointer);
        let doc = dom.document();
        set.add(&mut dom, &layout, &cfg, doc, false, Origin::Pointer);
        assert_eq!(set.elements(), &[div]);
        assert_eq!(set.overlays().len(), 1);
    }

    #[test]
    fn zero_area_element_is_recorded_without_overlay() {
        let Page { mut dom, mut layout, div, .. } = page();
        layout.insert(2, ElementBox::new(Rect::new(5.0, 5.0, 0.0, 0.0)));
        let mut set = HighlightSet::remote();
        set.add(&mut dom, &layout, &HighlightConfig::default(), div, true, Origin::Pointer);
        assert_eq!(set.elements(), &[div]);
        assert!(set.overlays().is_empty());
    }

    #[test]
    fn remote_add_scrolls_offscreen_element_to_center() {
        let Page { mut dom, mut layout, div, .. } = page();
        layout.insert(2, ElementBox::new(Rect::new(0.0, 2000.0, 50.0, 50.0)));
        let cfg = HighlightConfig::default();

        let effects = HighlightSet::remote().add(&mut dom, &layout, &cfg, div, false, Origin::Remote);
        assert!(effects.contains(&OverlayEffect::ScrollTo { x: 0.0, y: 1700.0 }));

        let effects = HighlightSet::remote().add(&mut dom, &layout, &cfg, div, false, Origin::Pointer);
        assert!(!effects.iter().any(|e| matches!(e, OverlayEffect::ScrollTo { .. })));
    }

    #[test]
    fn animated_add_settles_to_end_values() {
        let Page { mut dom, layout, div, .. } = page();
        let cfg = HighlightConfig::default();
        let mut set = HighlightSet::remote();
        let effects = set.add(&mut dom, &layout, &cfg, div, true, Origin::Pointer);
        assert!(effects.contains(&OverlayEffect::FinishAnimation { after: ANIMATION_SETTLE }));
        assert!(effects.contains(&OverlayEffect::InspectAfter { node: div, after: INSPECT_DELAY }));

        let overlay = set.overlays()[0];
        assert_eq!(style_of(&dom, overlay).get("opacity"), Some("0"));
        assert_eq!(style_of(&dom, overlay).get("transition-duration"), Some("300ms, 2.3s"));

        set.finish_animation(&mut dom, &cfg);
        assert_eq!(style_of(&dom, overlay).get("opacity"), Some("0.6"));
    }

    #[test]
    fn moving_elements_arm_the_pulse() {
        let Page { mut dom, mut layout, div, .. } = page();
        if let Some(b) = layout.boxes.get_mut(&2) {
            b.transition_duration = 0.25;
        }
        let effects = HighlightSet::remote().add(
            &mut dom,
            &layout,
            &HighlightConfig::default(),
            div,
            false,
            Origin::Pointer,
        );
        assert!(effects.contains(&OverlayEffect::ArmPulse {
            duration: Duration::from_millis(250)
        }));
    }

    #[test]
    fn clear_unmarks_mirrored_elements() {
        let Page { mut dom, layout, div, .. } = page();
        let mut set = HighlightSet::local();
        set.add(&mut dom, &layout, &HighlightConfig::default(), div, true, Origin::Pointer);
        assert_eq!(dom.attribute(div, HIGHLIGHT_MARKER), Some("1"));
        let overlay = set.overlays()[0];

        set.clear(&mut dom);
        assert_eq!(dom.attribute(div, HIGHLIGHT_MARKER), None);
        assert!(!dom.nodes.contains(overlay));
        assert!(set.is_empty());
    }

    #[test]
    fn selector_redraw_requeries() {
        let Page { mut dom, mut layout, body, div } = page();
        let cfg = HighlightConfig::default();
        let mut set = HighlightSet::remote();
        set.add(&mut dom, &layout, &cfg, div, false, Origin::Remote);
        set.set_selector(Some(".x".into()));

        let late = dom.create_element("p", vec![Attr::new("data-live-id", "3"), Attr::new("class", "x")]);
        dom.append_child(body, late);
        layout.insert(3, ElementBox::new(Rect::new(0.0, 400.0, 10.0, 10.0)));

        set.redraw(&mut dom, &layout, &cfg);
        assert_eq!(set.elements(), &[div, late]);
        assert_eq!(set.overlays().len(), 2);
    }

    #[test]
    fn list_redraw_drops_removed_elements() {
        let Page { mut dom, layout, div, .. } = page();
        let cfg = HighlightConfig::default();
        let mut set = HighlightSet::remote();
        set.add(&mut dom, &layout, &cfg, div, false, Origin::Remote);
        dom.release_subtree(div);
        set.redraw(&mut dom, &layout, &cfg);
        assert!(set.is_empty());
        assert!(set.overlays().is_empty());
    }
}
