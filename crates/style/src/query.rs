//! Selector queries over the semantic tree.

use css::{ComplexSelector, parse_selector_list};
use dom::{Dom, NodeId};

use crate::matching::matches_any;

/// Every connected element matching `selectors`, in document order. Overlay
/// subtrees are never searched.
pub fn query_selector_all(dom: &Dom, selectors: &[ComplexSelector]) -> Vec<NodeId> {
    if selectors.is_empty() {
        return Vec::new();
    }
    dom.semantic_descendants(dom.document())
        .into_iter()
        .filter(|&n| matches_any(dom, n, selectors))
        .collect()
}

/// Parse `selector` and run [`query_selector_all`]. `None` when the selector
/// does not parse.
pub fn select(dom: &Dom, selector: &str) -> Option<Vec<NodeId>> {
    let selectors = parse_selector_list(selector);
    (!selectors.is_empty()).then(|| query_selector_all(dom, &selectors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::{Attr, OVERLAY_CLASS};

    #[test]
    fn overlays_are_invisible_to_queries() {
        let mut dom = Dom::new();
        let doc = dom.document();
        let body = dom.create_element("body", Vec::new());
        let a = dom.create_element("p", vec![Attr::new("class", "x")]);
        let overlay = dom.create_element("div", vec![Attr::new("class", OVERLAY_CLASS)]);
        let inside = dom.create_element("p", vec![Attr::new("class", "x")]);
        let b = dom.create_element("p", vec![Attr::new("class", "x")]);
        dom.append_child(doc, body);
        dom.append_child(body, a);
        dom.append_child(body, overlay);
        dom.append_child(overlay, inside);
        dom.append_child(body, b);

        assert_eq!(select(&dom, "p.x"), Some(vec![a, b]));
        assert_eq!(select(&dom, "div"), Some(Vec::new()));
        assert_eq!(select(&dom, "p,"), None);
    }
}
