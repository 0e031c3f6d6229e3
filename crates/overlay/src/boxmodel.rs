//! Box-model snapshot sent alongside inspection data.
//!
//! Measurements come from the layout provider; every side also carries the
//! cascade match that decided it, so the controller can jump to the rule.

use common::{Edges, Side};
use css::{MediaEnv, StyleSheetSet};
use dom::{Dom, NodeId};
use layout::{ComputedMetrics, LayoutProvider};
use serde::{Serialize, Serializer};
use style::{CascadeMatch, MatchedRule, accepted_value, matched_rules};

use crate::inline::px;
use crate::inspect::data_position;

/// Shown for measurements the layout provider cannot supply.
const UNKNOWN: &str = "-";

/// Wire form of one property's cascade match. `index` is the 1-based
/// position of the winning rule in the inspection `data` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertySource {
    pub name: String,
    pub selector: String,
    pub value: String,
    pub index: Option<usize>,
    pub priority: bool,
}

impl PropertySource {
    fn new(accepted: CascadeMatch, matched: &[MatchedRule<'_>]) -> Self {
        PropertySource {
            index: accepted.rank.and_then(|rank| data_position(matched, rank)),
            name: accepted.name,
            selector: accepted.selector,
            value: accepted.value,
            priority: accepted.important,
        }
    }
}

/// Property sources keyed by property name, in query order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Metadata(pub Vec<PropertySource>);

impl Metadata {
    pub fn get(&self, property: &str) -> Option<&PropertySource> {
        self.0.iter().find(|m| m.name == property)
    }
}

impl Serialize for Metadata {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|m| (m.name.as_str(), m)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideBox {
    pub left: String,
    pub right: String,
    pub top: String,
    pub bottom: String,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentBox {
    pub width: String,
    pub height: String,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoxModelSnapshot {
    pub margin: SideBox,
    pub border: SideBox,
    pub padding: SideBox,
    pub content: ContentBox,
}

struct Query<'a> {
    dom: &'a Dom,
    node: NodeId,
    sheets: &'a StyleSheetSet,
    env: &'a MediaEnv,
    matched: Vec<MatchedRule<'a>>,
}

impl Query<'_> {
    fn metadata<'p>(&self, properties: impl IntoIterator<Item = &'p str>) -> Metadata {
        Metadata(
            properties
                .into_iter()
                .map(|p| accepted_value(self.dom, self.node, p, self.sheets, self.env))
                .map(|accepted| PropertySource::new(accepted, &self.matched))
                .collect(),
        )
    }

    /// `margin`, then `margin-left`, `margin-top`, `margin-right`,
    /// `margin-bottom`.
    fn side_box(&self, prefix: &str, edges: Option<Edges<f32>>) -> SideBox {
        let shorthand = prefix.to_string();
        let longhands = [Side::Left, Side::Top, Side::Right, Side::Bottom]
            .map(|side| format!("{prefix}-{}", side.as_str()));
        let metadata =
            self.metadata(std::iter::once(shorthand.as_str()).chain(longhands.iter().map(String::as_str)));

        let measure = |side: Side| edges.map_or_else(|| UNKNOWN.to_string(), |e| px(e.get(side)));
        SideBox {
            left: measure(Side::Left),
            right: measure(Side::Right),
            top: measure(Side::Top),
            bottom: measure(Side::Bottom),
            metadata,
        }
    }
}

pub fn box_model_snapshot(
    dom: &Dom,
    layout: &dyn LayoutProvider,
    sheets: &StyleSheetSet,
    env: &MediaEnv,
    node: NodeId,
) -> BoxModelSnapshot {
    let metrics: Option<ComputedMetrics> = layout.computed(dom, node);
    let query = Query {
        dom,
        node,
        sheets,
        env,
        matched: matched_rules(dom, node, sheets, env),
    };
    let measure = |f: fn(&ComputedMetrics) -> f32| {
        metrics.as_ref().map_or_else(|| UNKNOWN.to_string(), |m| px(f(m)))
    };

    BoxModelSnapshot {
        margin: query.side_box("margin", metrics.map(|m| m.margin)),
        border: query.side_box("border", metrics.map(|m| m.border)),
        padding: query.side_box("padding", metrics.map(|m| m.padding)),
        content: ContentBox {
            width: measure(|m| m.width),
            height: measure(|m| m.height),
            metadata: query.metadata(["width", "height"]),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Rect;
    use dom::Attr;
    use layout::{ElementBox, StaticLayout, Viewport};
    use serde_json::json;

    fn page() -> (Dom, NodeId) {
        let mut dom = Dom::new();
        let doc = dom.document();
        let html = dom.create_element("html", Vec::new());
        let body = dom.create_element("body", Vec::new());
        let div = dom.create_element(
            "div",
            vec![Attr::new("data-live-id", "4"), Attr::new("class", "card")],
        );
        dom.append_child(doc, html);
        dom.append_child(html, body);
        dom.append_child(body, div);
        (dom, div)
    }

    fn sheets() -> StyleSheetSet {
        let mut set = StyleSheetSet::new();
        set.push(
            Some("/main.css"),
            "",
            ".card { margin: 4px 8px; padding-left: 3px; width: 50px }",
        );
        set
    }

    #[test]
    fn measurements_come_from_layout() {
        let (dom, div) = page();
        let mut layout = StaticLayout::new(Viewport::default());
        layout.insert(
            4,
            ElementBox {
                rect: Rect::new(0.0, 0.0, 56.0, 20.0),
                margin: Edges { top: 4.0, right: 8.0, bottom: 4.0, left: 8.0 },
                padding: Edges { top: 0.0, right: 3.0, bottom: 0.0, left: 3.0 },
                ..ElementBox::default()
            },
        );
        let snap = box_model_snapshot(&dom, &layout, &sheets(), &MediaEnv::default(), div);

        assert_eq!(snap.margin.left, "8px");
        assert_eq!(snap.margin.top, "4px");
        assert_eq!(snap.padding.left, "3px");
        assert_eq!(snap.border.bottom, "0px");
        assert_eq!(snap.content.width, "50px");
        assert_eq!(snap.content.height, "20px");

        let left = snap.margin.metadata.get("margin-left").unwrap();
        assert_eq!(left.value, "8px");
        assert_eq!(left.selector, ".card");
        assert_eq!(snap.padding.metadata.get("padding-top").unwrap().value, "");
    }

    #[test]
    fn unknown_measurements_are_dashes() {
        let (dom, div) = page();
        let layout = StaticLayout::new(Viewport::default());
        let snap = box_model_snapshot(&dom, &layout, &sheets(), &MediaEnv::default(), div);
        assert_eq!(snap.margin.left, "-");
        assert_eq!(snap.content.width, "-");
        assert_eq!(snap.content.metadata.get("width").unwrap().value, "50px");
    }

    #[test]
    fn metadata_serializes_in_query_order() {
        let (dom, div) = page();
        let layout = StaticLayout::new(Viewport::default());
        let snap = box_model_snapshot(&dom, &layout, &sheets(), &MediaEnv::default(), div);
        let text = serde_json::to_string(&snap.margin.metadata).unwrap();
        let keys: Vec<usize> = ["\"margin\"", "\"margin-left\"", "\"margin-top\"", "\"margin-right\"", "\"margin-bottom\""]
            .iter()
            .map(|k| text.find(k).unwrap())
            .collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));

        let value = serde_json::to_value(&snap).unwrap();
        assert_eq!(
            value["margin"]["metadata"]["margin"],
            json!({"name": "margin", "selector": ".card", "value": "4px 8px", "index": 1, "priority": false})
        );
        assert_eq!(value["padding"]["metadata"]["padding-top"]["index"], json!(null));
    }

    #[test]
    fn index_points_into_inspection_data() {
        let (dom, div) = page();
        let mut set = StyleSheetSet::new();
        set.push(None, "", "body .card.wide, div.card { color: red; width: 9px }");
        set.push(Some("/main.css"), "", "div { margin: 3px } .card { padding: 2px } #x, .card { width: 50px }");
        let layout = StaticLayout::new(Viewport::default());
        let env = MediaEnv::default();
        let snap = box_model_snapshot(&dom, &layout, &set, &env, div);
        let data = crate::rule_provenance(&dom, div, &set, &env, "");

        let selectors: Vec<&str> = data.iter().map(|r| r.selector_text.as_str()).collect();
        assert_eq!(selectors, vec!["div", "#x, .card", ".card"]);
        for source in [
            snap.margin.metadata.get("margin").unwrap(),
            snap.padding.metadata.get("padding-left").unwrap(),
        ] {
            let index = source.index.unwrap();
            assert_eq!(data[index - 1].selector_text, source.selector);
        }

        let width = snap.content.metadata.get("width").unwrap();
        assert_eq!(width.selector, "body .card.wide, div.card");
        assert_eq!(width.index, None);
    }
}
