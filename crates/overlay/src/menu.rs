//! The goto menu shown below a clicked element.

use dom::{Attr, Dom, NodeId, OVERLAY_CLASS};
use layout::LayoutProvider;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::inline::InlineStyle;

/// Set while a goto request for the element is pending.
pub const SHOWGOTO_MARKER: &str = "data-live-showgoto";
/// Set to the chosen target's url when a menu item is clicked.
pub const GOTO_MARKER: &str = "data-live-goto";

const MENU_Z_INDEX: &str = "2147483647";

/// A source location offered by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GotoTarget {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    pub url: String,
    /// `html`, `css`, `js`, or anything else.
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Item background for a target type.
pub fn type_color(kind: &str, highlight: bool) -> &'static str {
    match (kind, highlight) {
        ("html", true) => "#eec",
        ("html", false) => "#ffe",
        ("css", true) => "#cee",
        ("css", false) => "#eff",
        ("js", true) => "#ccf",
        ("js", false) => "#eef",
        (_, true) => "#ddd",
        (_, false) => "#eee",
    }
}

#[derive(Debug)]
pub struct GotoMenu {
    target: NodeId,
    body: Option<NodeId>,
    items: Vec<(NodeId, String)>,
}

impl GotoMenu {
    /// Start a menu for `target`. The caller requests goto targets from the
    /// controller and clears the marker once that request is out.
    pub fn open(dom: &mut Dom, target: NodeId) -> Self {
        dom.set_attribute(target, SHOWGOTO_MARKER, "1");
        Self {
            target,
            body: None,
            items: Vec::new(),
        }
    }

    pub fn target(&self) -> NodeId {
        self.target
    }

    pub fn is_shown(&self, dom: &Dom) -> bool {
        self.body.is_some_and(|b| dom.nodes.contains(b) && dom.is_connected(b))
    }

    pub fn items(&self) -> impl Iterator<Item = (NodeId, &str)> {
        self.items.iter().map(|(node, url)| (*node, url.as_str()))
    }

    /// Add one item per target and attach the menu below the target element.
    pub fn show(&mut self, dom: &mut Dom, layout: &dyn LayoutProvider, targets: &[GotoTarget]) {
        let body = match self.body.filter(|&b| dom.nodes.contains(b)) {
            Some(body) => body,
            None => self.create_body(dom, layout),
        };
        for target in targets {
            self.add_item(dom, body, target);
        }
        if dom.parent(body).is_none() {
            if let Some(host) = dom.body().or_else(|| dom.document_element()) {
                dom.append_child(host, body);
            }
        }
        debug!(items = self.items.len(), "goto menu shown");
    }

    /// Handle a document click while the menu is open. A click on an item
    /// marks the target with the item's url and returns it; every click
    /// closes the menu.
    pub fn click(&mut self, dom: &mut Dom, clicked: NodeId) -> Option<String> {
        let url = self
            .items
            .iter()
            .find(|(item, _)| *item == clicked || dom.ancestors(clicked).contains(item))
            .map(|(_, url)| url.clone());
        if let Some(url) = &url {
            dom.set_attribute(self.target, GOTO_MARKER, url);
        }
        self.remove(dom);
        url
    }

    pub fn remove(&mut self, dom: &mut Dom) {
        if let Some(body) = self.body.take() {
            if dom.nodes.contains(body) {
                dom.release_subtree(body);
            }
        }
        self.items.clear();
    }

    fn create_body(&mut self, dom: &mut Dom, layout: &dyn LayoutProvider) -> NodeId {
        let rect = layout.bounding_rect(dom, self.target);
        let vp = layout.viewport();
        let x = rect.x + vp.scroll_x;
        let y = rect.y + vp.scroll_y + rect.h;

        let body = dom.create_element("div", vec![Attr::new("class", OVERLAY_CLASS)]);
        let mut style = InlineStyle::new();
        style
            .set("z-index", MENU_Z_INDEX)
            .set("position", "absolute")
            .px("left", x)
            .px("top", y)
            .set("font-size", "11pt")
            .set("background", "#fff")
            .set("border", "1px solid #888")
            .set("box-shadow", "2px 2px 6px 0px #ccc")
            .set("border-radius", "6px")
            .set("padding", "6px");
        style.apply(dom, body);
        self.body = Some(body);
        body
    }

    fn add_item(&mut self, dom: &mut Dom, body: NodeId, target: &GotoTarget) {
        let item = dom.create_element("div", Vec::new());
        let mut style = InlineStyle::new();
        style.set("padding", "2px 6px");
        if dom.first_child(body).is_some() {
            style.set("border-top", "1px solid #ccc");
        }
        style
            .set("cursor", "pointer")
            .set("background", type_color(&target.kind, false));
        style.apply(dom, item);

        let name = dom.create_text(&target.name);
        dom.append_child(item, name);
        if let Some(file) = &target.file {
            let label = dom.create_element("i", Vec::new());
            InlineStyle::new()
                .set("float", "right")
                .set("margin-left", "12px")
                .apply(dom, label);
            let text = dom.create_text(&format!(" {file}"));
            dom.append_child(label, text);
            dom.append_child(item, label);
        }
        dom.append_child(body, item);
        self.items.push((item, target.url.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Rect;
    use layout::{ElementBox, StaticLayout, Viewport};

    fn page() -> (Dom, StaticLayout, NodeId) {
        let mut dom = Dom::new();
        let doc = dom.document();
        let html = dom.create_element("html", Vec::new());
        let body = dom.create_element("body", vec![Attr::new("data-live-id", "1")]);
        let a = dom.create_element("a", vec![Attr::new("data-live-id", "2")]);
        dom.append_child(doc, html);
        dom.append_child(html, body);
        dom.append_child(body, a);

        let mut layout = StaticLayout::new(Viewport::default());
        layout.insert(2, ElementBox::new(Rect::new(40.0, 100.0, 80.0, 20.0)));
        (dom, layout, a)
    }

    fn targets() -> Vec<GotoTarget> {
        serde_json::from_str(
            r#"[
                {"name": "index.html", "url": "/index.html#L4", "type": "html"},
                {"name": ".nav a", "file": "site.css", "url": "/site.css#L10", "type": "css"}
            ]"#,
        )
        .unwrap()
    }

    #[test]
    fn open_marks_target() {
        let (mut dom, _, a) = page();
        let menu = GotoMenu::open(&mut dom, a);
        assert_eq!(dom.attribute(a, SHOWGOTO_MARKER), Some("1"));
        assert!(!menu.is_shown(&dom));
    }

    #[test]
    fn show_places_menu_below_target() {
        let (mut dom, layout, a) = page();
        let mut menu = GotoMenu::open(&mut dom, a);
        menu.show(&mut dom, &layout, &targets());
        assert!(menu.is_shown(&dom));

        let body = menu.body.unwrap();
        assert!(dom.is_overlay(body));
        let style = InlineStyle::read(&dom, body);
        assert_eq!(style.get("left"), Some("40px"));
        assert_eq!(style.get("top"), Some("120px"));

        let items: Vec<_> = menu.items().collect();
        assert_eq!(items.len(), 2);
        assert_eq!(dom.text_content(items[1].0), ".nav a site.css");
        let second = InlineStyle::read(&dom, items[1].0);
        assert_eq!(second.get("background"), Some("#eff"));
        assert_eq!(second.get("border-top"), Some("1px solid #ccc"));
        assert_eq!(InlineStyle::read(&dom, items[0].0).get("border-top"), None);
    }

    #[test]
    fn clicking_an_item_marks_goto_and_closes() {
        let (mut dom, layout, a) = page();
        let mut menu = GotoMenu::open(&mut dom, a);
        menu.show(&mut dom, &layout, &targets());
        let (item, _) = menu.items().nth(1).unwrap();
        let label = dom.children(item)[1];

        assert_eq!(menu.click(&mut dom, label), Some("/site.css#L10".to_string()));
        assert_eq!(dom.attribute(a, GOTO_MARKER), Some("/site.css#L10"));
        assert!(!menu.is_shown(&dom));
    }

    #[test]
    fn clicking_elsewhere_just_closes() {
        let (mut dom, layout, a) = page();
        let mut menu = GotoMenu::open(&mut dom, a);
        menu.show(&mut dom, &layout, &targets());
        assert_eq!(menu.click(&mut dom, a), None);
        assert_eq!(dom.attribute(a, GOTO_MARKER), None);
        assert!(!menu.is_shown(&dom));
    }

    #[test]
    fn unknown_types_get_neutral_colors() {
        assert_eq!(type_color("md", false), "#eee");
        assert_eq!(type_color("js", true), "#ccf");
    }
}
