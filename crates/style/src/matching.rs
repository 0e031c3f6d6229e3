//! Selector matching: determine whether a DOM element matches a CSS selector.
//!
//! Complex selectors are matched **right-to-left**: we start with the rightmost
//! (subject) compound selector, then walk up/sideways through the DOM tree
//! following each combinator.

use css::{AttrOp, Combinator, ComplexSelector, CompoundSelector, PseudoClass, SimpleSelector};
use dom::{Dom, ElementData, NodeData, NodeId};

// ─────────────────────────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────────────────────────

/// Test whether the element `node_id` matches a full complex selector.
///
/// Returns `false` if `node_id` does not refer to an element.
pub fn matches_selector(dom: &Dom, node_id: NodeId, selector: &ComplexSelector) -> bool {
    let Some(((subject, first_combinator), rest)) = selector.parts.split_first() else {
        return false;
    };
    if !matches_compound(dom, node_id, subject) {
        return false;
    }

    let mut current = node_id;
    let mut combinator = *first_combinator;
    for (compound, next_combinator) in rest {
        let step = match combinator {
            Some(Combinator::Descendant) => {
                find_along(dom, current, compound, parent_element)
            }
            Some(Combinator::Child) => parent_element(dom, current)
                .filter(|&p| matches_compound(dom, p, compound)),
            Some(Combinator::NextSibling) => prev_sibling_element(dom, current)
                .filter(|&s| matches_compound(dom, s, compound)),
            Some(Combinator::SubsequentSibling) => {
                find_along(dom, current, compound, prev_sibling_element)
            }
            None => None,
        };
        match step {
            Some(next) => current = next,
            None => return false,
        }
        combinator = *next_combinator;
    }

    true
}

/// Test whether the element `node_id` matches a compound selector (all simples must match).
pub fn matches_compound(dom: &Dom, node_id: NodeId, compound: &CompoundSelector) -> bool {
    match dom.element(node_id) {
        Some(elem) => compound
            .simples
            .iter()
            .all(|simple| matches_simple(dom, node_id, elem, simple)),
        None => false,
    }
}

/// Whether any selector of a list matches.
pub fn matches_any(dom: &Dom, node_id: NodeId, selectors: &[ComplexSelector]) -> bool {
    selectors.iter().any(|s| matches_selector(dom, node_id, s))
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Follow `step` from `start` until a node matching `compound` turns up.
fn find_along(
    dom: &Dom,
    start: NodeId,
    compound: &CompoundSelector,
    step: impl Fn(&Dom, NodeId) -> Option<NodeId>,
) -> Option<NodeId> {
    let mut cursor = step(dom, start);
    while let Some(id) = cursor {
        if matches_compound(dom, id, compound) {
            return Some(id);
        }
        cursor = step(dom, id);
    }
    None
}

fn matches_simple(dom: &Dom, node_id: NodeId, elem: &ElementData, simple: &SimpleSelector) -> bool {
    match simple {
        SimpleSelector::Universal => true,
        SimpleSelector::Type(tag) => elem.tag_name.eq_ignore_ascii_case(tag),
        SimpleSelector::Id(id) => elem.id.as_deref() == Some(id.as_str()),
        SimpleSelector::Class(cls) => elem.has_class(cls),
        SimpleSelector::Attribute { name, op, value } => {
            matches_attribute(elem, name, *op, value.as_deref())
        }
        SimpleSelector::PseudoClass(pc) => matches_pseudo_class(dom, node_id, elem, pc),
        // Rules aimed at generated content do not style the element itself.
        SimpleSelector::PseudoElement(_) => false,
    }
}

fn matches_attribute(elem: &ElementData, name: &str, op: AttrOp, value: Option<&str>) -> bool {
    let Some(actual) = elem.attr(name) else {
        return false;
    };
    let Some(expected) = value else {
        return op == AttrOp::Exists;
    };

    match op {
        AttrOp::Exists => true,
        AttrOp::Eq => actual == expected,
        AttrOp::Includes => actual.split_whitespace().any(|word| word == expected),
        AttrOp::DashMatch => {
            actual == expected
                || actual
                    .strip_prefix(expected)
                    .is_some_and(|rest| rest.starts_with('-'))
        }
        AttrOp::Prefix => !expected.is_empty() && actual.starts_with(expected),
        AttrOp::Suffix => !expected.is_empty() && actual.ends_with(expected),
        AttrOp::Substring => !expected.is_empty() && actual.contains(expected),
    }
}

fn matches_pseudo_class(dom: &Dom, node_id: NodeId, elem: &ElementData, pc: &PseudoClass) -> bool {
    match pc {
        // A static tree has no hover/focus/visited state.
        PseudoClass::State(_) => false,
        PseudoClass::Root => dom
            .parent(node_id)
            .and_then(|p| dom.nodes.get(p))
            .is_some_and(|p| matches!(p.data, NodeData::Document)),
        PseudoClass::FirstChild => sibling_elements(dom, node_id).first() == Some(&node_id),
        PseudoClass::LastChild => sibling_elements(dom, node_id).last() == Some(&node_id),
        PseudoClass::OnlyChild => sibling_elements(dom, node_id) == [node_id],
        PseudoClass::FirstOfType => same_type_siblings(dom, node_id, elem).first() == Some(&node_id),
        PseudoClass::LastOfType => same_type_siblings(dom, node_id, elem).last() == Some(&node_id),
        PseudoClass::Empty => dom.children(node_id).iter().all(|&c| {
            dom.nodes
                .get(c)
                .is_none_or(|n| matches!(n.data, NodeData::Comment { .. }))
        }),
        PseudoClass::NthChild(a, b) => sibling_elements(dom, node_id)
            .iter()
            .position(|&s| s == node_id)
            .is_some_and(|idx| nth_matches(*a, *b, idx as i32 + 1)),
        PseudoClass::Not(inner) => !matches_compound(dom, node_id, inner),
    }
}

/// Check if An+B matches the given 1-based index.
fn nth_matches(a: i32, b: i32, n: i32) -> bool {
    if a == 0 {
        return n == b;
    }
    let diff = n - b;
    diff % a == 0 && diff / a >= 0
}

// ─────────────────────────────────────────────────────────────────────────────
// DOM traversal helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Get the parent of `node_id` if it is an element.
fn parent_element(dom: &Dom, node_id: NodeId) -> Option<NodeId> {
    dom.parent(node_id).filter(|&p| dom.element(p).is_some())
}

/// Get the immediately preceding sibling that is an element.
fn prev_sibling_element(dom: &Dom, node_id: NodeId) -> Option<NodeId> {
    let mut cursor = dom.prev_sibling(node_id);
    while let Some(id) = cursor {
        if dom.element(id).is_some() {
            return Some(id);
        }
        cursor = dom.prev_sibling(id);
    }
    None
}

/// Element children of `node_id`'s parent, `node_id` included.
fn sibling_elements(dom: &Dom, node_id: NodeId) -> Vec<NodeId> {
    match dom.parent(node_id) {
        Some(parent) => dom
            .children(parent)
            .into_iter()
            .filter(|&c| dom.element(c).is_some())
            .collect(),
        None => Vec::new(),
    }
}

fn same_type_siblings(dom: &Dom, node_id: NodeId, elem: &ElementData) -> Vec<NodeId> {
    sibling_elements(dom, node_id)
        .into_iter()
        .filter(|&s| dom.tag_name(s) == Some(elem.tag_name.as_str()))
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use css::parse_selector_list;
    use dom::Attr;

    struct Sample {
        dom: Dom,
        html: NodeId,
        div: NodeId,
        h1: NodeId,
        p1: NodeId,
        p2: NodeId,
    }

    /// ```text
    /// document
    /// └── html
    ///     └── body
    ///         ├── div#main.container.wrapper
    ///         │   ├── h1
    ///         │   ├── p.intro  (data-x="foo bar", lang="en-US")
    ///         │   └── p
    ///         └── footer
    /// ```
    fn sample() -> Sample {
        let mut dom = Dom::new();
        let doc = dom.document();
        let html = dom.create_element("html", Vec::new());
        let body = dom.create_element("body", Vec::new());
        let div = dom.create_element(
            "div",
            vec![Attr::new("id", "main"), Attr::new("class", "container wrapper")],
        );
        let h1 = dom.create_element("h1", Vec::new());
        let p1 = dom.create_element(
            "p",
            vec![
                Attr::new("class", "intro"),
                Attr::new("data-x", "foo bar"),
                Attr::new("lang", "en-US"),
            ],
        );
        let p2 = dom.create_element("p", Vec::new());
        let footer = dom.create_element("footer", Vec::new());

        dom.append_child(doc, html);
        dom.append_child(html, body);
        dom.append_child(body, div);
        dom.append_child(div, h1);
        dom.append_child(div, p1);
        dom.append_child(div, p2);
        dom.append_child(body, footer);

        Sample { dom, html, div, h1, p1, p2 }
    }

    fn matches(s: &Sample, node: NodeId, css: &str) -> bool {
        let list = parse_selector_list(css);
        assert!(!list.is_empty(), "selector list is empty for: {css}");
        matches_any(&s.dom, node, &list)
    }

    #[test]
    fn simple_selectors() {
        let s = sample();
        assert!(matches(&s, s.div, "div"));
        assert!(matches(&s, s.div, "*"));
        assert!(matches(&s, s.div, "#main"));
        assert!(!matches(&s, s.div, "#other"));
        assert!(matches(&s, s.div, ".wrapper"));
        assert!(!matches(&s, s.div, ".missing"));
        assert!(matches(&s, s.div, "div#main.container"));
    }

    #[test]
    fn combinators() {
        let s = sample();
        assert!(matches(&s, s.p1, "div p"));
        assert!(matches(&s, s.p1, "html p"));
        assert!(matches(&s, s.h1, "div > h1"));
        assert!(!matches(&s, s.h1, "body > h1"));
        assert!(matches(&s, s.p1, "h1 + p"));
        assert!(!matches(&s, s.p2, "h1 + p"));
        assert!(matches(&s, s.p2, "h1 ~ p"));
        assert!(matches(&s, s.p2, "body > div > h1 ~ p"));
    }

    #[test]
    fn attribute_selectors() {
        let s = sample();
        assert!(matches(&s, s.p1, "[data-x]"));
        assert!(matches(&s, s.p1, "[data-x~=\"foo\"]"));
        assert!(!matches(&s, s.p1, "[data-x=\"foo\"]"));
        assert!(matches(&s, s.p1, "[lang|=en]"));
        assert!(matches(&s, s.p1, "[data-x^=fo][data-x$=ar][data-x*=\"o b\"]"));
        assert!(!matches(&s, s.p2, "[data-x]"));
    }

    #[test]
    fn structural_pseudo_classes() {
        let s = sample();
        assert!(matches(&s, s.h1, ":first-child"));
        assert!(matches(&s, s.p2, ":last-child"));
        assert!(matches(&s, s.p1, "p:first-of-type"));
        assert!(matches(&s, s.p2, "p:last-of-type"));
        assert!(matches(&s, s.p1, ":nth-child(2)"));
        assert!(matches(&s, s.p2, "p:nth-child(odd)"));
        assert!(matches(&s, s.h1, ":not(p)"));
        assert!(!matches(&s, s.p1, ":not(p)"));
        assert!(matches(&s, s.html, ":root"));
        assert!(!matches(&s, s.div, ":root"));
        assert!(matches(&s, s.h1, "h1:empty"));
    }

    #[test]
    fn dynamic_state_and_pseudo_elements_never_match() {
        let s = sample();
        assert!(!matches(&s, s.div, "div:hover"));
        assert!(!matches(&s, s.p1, "p::before"));
    }

    #[test]
    fn nth_formula() {
        assert!(nth_matches(0, 2, 2));
        assert!(!nth_matches(0, 2, 3));
        assert!(nth_matches(2, 1, 5));
        assert!(!nth_matches(2, 0, 3));
        assert!(nth_matches(-1, 3, 1));
        assert!(!nth_matches(-1, 3, 4));
    }
}
