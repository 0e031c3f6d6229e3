//! Cascade resolution: which rules apply to an element, and which
//! declaration is authoritative for a property.
//!
//! Matched rules are ordered by descending specificity; rules of equal
//! specificity keep their document order. Accepted-value resolution then
//! walks that order with the adoption rules the inspector reports against.

use common::{Edges, Side};
use css::{
    CssToken, CssTokenizer, Declaration, MediaEnv, RuleRef, Specificity, StyleSheetSet,
    parse_inline_style, serialize_tokens,
};
use dom::{Dom, NodeId};
use serde::{Deserialize, Serialize};

use crate::matching::matches_selector;

// ─────────────────────────────────────────────────────────────────────────────
// MatchedRule
// ─────────────────────────────────────────────────────────────────────────────

/// A rule that matched a particular element, annotated with cascade metadata.
#[derive(Debug, Clone, Copy)]
pub struct MatchedRule<'a> {
    pub rule: RuleRef<'a>,
    /// Highest specificity among the rule's selectors that match the element.
    pub specificity: Specificity,
}

impl<'a> MatchedRule<'a> {
    pub fn selector_text(&self) -> &'a str {
        &self.rule.rule.selector_text
    }

    pub fn declarations(&self) -> &'a [Declaration] {
        &self.rule.rule.declarations
    }
}

/// Collect every live rule that applies to `node_id`, most specific first.
pub fn matched_rules<'a>(
    dom: &Dom,
    node_id: NodeId,
    sheets: &'a StyleSheetSet,
    env: &MediaEnv,
) -> Vec<MatchedRule<'a>> {
    let mut matched: Vec<MatchedRule<'a>> = sheets
        .active_rules(env)
        .into_iter()
        .filter_map(|rule| {
            rule.rule
                .selectors
                .iter()
                .filter(|s| matches_selector(dom, node_id, s))
                .map(|s| s.specificity())
                .max()
                .map(|specificity| MatchedRule { rule, specificity })
        })
        .collect();
    // `sort_by` is stable, so equal specificities stay in document order.
    matched.sort_by(|a, b| b.specificity.cmp(&a.specificity));
    matched
}

// ─────────────────────────────────────────────────────────────────────────────
// Accepted value
// ─────────────────────────────────────────────────────────────────────────────

/// The authoritative declaration for one (element, property) query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeMatch {
    /// The queried property.
    pub name: String,
    /// Winning rule's selector text; empty for inline or unset values.
    pub selector: String,
    /// Winning value; empty when nothing declares the property.
    pub value: String,
    /// Position of the winning rule in matched order.
    pub rank: Option<usize>,
    #[serde(rename = "priority")]
    pub important: bool,
}

struct Candidate<'a> {
    value: String,
    selector: &'a str,
    important: bool,
    rank: Option<usize>,
}

/// Resolve the accepted value of `property` for `node_id`.
///
/// An important inline declaration wins outright. A normal inline
/// declaration seeds the running best. Each matched rule that declares the
/// property replaces the best when it shares the best's selector (unless that
/// would trade an important value for a normal one), or when it is important
/// and the best is not. With no best yet, the first declaring rule is taken.
pub fn accepted_value(
    dom: &Dom,
    node_id: NodeId,
    property: &str,
    sheets: &StyleSheetSet,
    env: &MediaEnv,
) -> CascadeMatch {
    let property = property.to_ascii_lowercase();
    let inline = dom
        .attribute(node_id, "style")
        .map(parse_inline_style)
        .unwrap_or_default();

    let mut best = lookup(&inline, &property).map(|(value, important)| Candidate {
        value,
        selector: "",
        important,
        rank: None,
    });

    if !best.as_ref().is_some_and(|b| b.important) {
        for (rank, matched) in matched_rules(dom, node_id, sheets, env).iter().enumerate() {
            let Some((value, important)) = lookup(matched.declarations(), &property) else {
                continue;
            };
            let selector = matched.selector_text();
            let adopt = match &best {
                None => true,
                Some(b) if b.selector == selector => important || !b.important,
                Some(b) => important && !b.important,
            };
            if adopt {
                best = Some(Candidate {
                    value,
                    selector,
                    important,
                    rank: Some(rank),
                });
            }
        }
    }

    match best {
        Some(c) => CascadeMatch {
            name: property,
            selector: c.selector.to_string(),
            value: c.value,
            rank: c.rank,
            important: c.important,
        },
        None => CascadeMatch {
            name: property,
            selector: String::new(),
            value: String::new(),
            rank: None,
            important: false,
        },
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Longhand lookup
// ─────────────────────────────────────────────────────────────────────────────

/// How a longhand can also be read off a shorthand declaration.
enum Expansion {
    /// `margin-top` from `margin: 1px 2px`.
    Side(&'static str, Side),
    /// `border-left` from `border: 1px solid`.
    Whole(&'static str),
}

fn expansion(property: &str) -> Option<Expansion> {
    let side_of = |s: &str| Side::ALL.into_iter().find(|side| side.as_str() == s);

    if let Some(side) = property.strip_prefix("margin-").and_then(side_of) {
        return Some(Expansion::Side("margin", side));
    }
    if let Some(side) = property.strip_prefix("padding-").and_then(side_of) {
        return Some(Expansion::Side("padding", side));
    }
    let border = property.strip_prefix("border-")?;
    if let Some(side) = border.strip_suffix("-width").and_then(side_of) {
        return Some(Expansion::Side("border-width", side));
    }
    side_of(border).map(|_| Expansion::Whole("border"))
}

/// The winning `(value, important)` for `property` in one declaration block,
/// honouring shorthands that set it.
fn lookup(declarations: &[Declaration], property: &str) -> Option<(String, bool)> {
    let expansion = expansion(property);
    let mut last: Option<(String, bool)> = None;
    let mut last_important: Option<(String, bool)> = None;

    for decl in declarations {
        let value = if decl.name == property {
            Some(decl.value.clone())
        } else {
            match &expansion {
                Some(Expansion::Side(shorthand, side)) if decl.name == *shorthand => {
                    component(&decl.value, *side)
                }
                Some(Expansion::Whole(shorthand)) if decl.name == *shorthand => {
                    Some(decl.value.clone())
                }
                _ => None,
            }
        };
        if let Some(value) = value {
            if decl.important {
                last_important = Some((value.clone(), true));
            }
            last = Some((value, decl.important));
        }
    }

    last_important.or(last)
}

/// One side of a 1–4 value box shorthand.
fn component(value: &str, side: Side) -> Option<String> {
    let tokens = CssTokenizer::new(value).tokenize_all();
    let mut parts: Vec<String> = Vec::new();
    let mut current: Vec<CssToken> = Vec::new();
    let mut depth = 0usize;

    for tok in tokens {
        match tok {
            CssToken::Whitespace if depth == 0 => {
                if !current.is_empty() {
                    parts.push(serialize_tokens(&current));
                    current.clear();
                }
                continue;
            }
            CssToken::Function(_) | CssToken::LParen => depth += 1,
            CssToken::RParen => depth = depth.saturating_sub(1),
            _ => {}
        }
        current.push(tok);
    }
    if !current.is_empty() {
        parts.push(serialize_tokens(&current));
    }

    Edges::from_shorthand(&parts.iter().map(String::as_str).collect::<Vec<_>>())
        .map(|edges| edges.get(side).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom::Attr;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    /// `<html><body><div id="a" class="b c"><p><span/></p></div></body></html>`
    fn sample(style: Option<&str>) -> (Dom, NodeId, NodeId) {
        let mut dom = Dom::new();
        let doc = dom.document();
        let html = dom.create_element("html", Vec::new());
        let body = dom.create_element("body", Vec::new());
        let mut attrs = vec![Attr::new("id", "a"), Attr::new("class", "b c")];
        if let Some(style) = style {
            attrs.push(Attr::new("style", style));
        }
        let div = dom.create_element("div", attrs);
        let p = dom.create_element("p", Vec::new());
        let span = dom.create_element("span", Vec::new());
        dom.append_child(doc, html);
        dom.append_child(html, body);
        dom.append_child(body, div);
        dom.append_child(div, p);
        dom.append_child(p, span);
        (dom, div, span)
    }

    fn sheets(css: &str) -> StyleSheetSet {
        let mut set = StyleSheetSet::new();
        set.push(Some("/site.css"), "", css);
        set
    }

    fn accepted(dom: &Dom, node: NodeId, property: &str, set: &StyleSheetSet) -> CascadeMatch {
        accepted_value(dom, node, property, set, &MediaEnv::default())
    }

    #[test]
    fn matched_rules_sort_by_specificity_then_document_order() {
        let (dom, div, _) = sample(None);
        let set = sheets("div {} .b.c {} #a {} .b {} .c {} p {}");
        let order: Vec<&str> = matched_rules(&dom, div, &set, &MediaEnv::default())
            .iter()
            .map(|m| m.selector_text())
            .collect();
        assert_eq!(order, vec!["#a", ".b.c", ".b", ".c", "div"]);
    }

    #[test]
    fn rule_specificity_is_best_matching_selector() {
        let (dom, div, _) = sample(None);
        let set = sheets("#zzz, div.b, div { color: red }");
        let matched = matched_rules(&dom, div, &set, &MediaEnv::default());
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].specificity, Specificity::new(0, 1, 1));
    }

    #[test]
    fn id_beats_two_classes_beats_two_types() {
        let (dom, _, span) = sample(None);
        let set = sheets("p span { color: green } #a span { color: red } .b.c span { color: blue }");
        let got = accepted(&dom, span, "color", &set);
        assert_eq!(got.selector, "#a span");
        assert_eq!(got.value, "red");
        assert_eq!(got.rank, Some(0));
    }

    #[test]
    fn inline_important_wins_outright() {
        let (dom, div, _) = sample(Some("width: 10px !important"));
        let set = sheets("#a { width: 99px !important }");
        let got = accepted(&dom, div, "width", &set);
        assert_eq!(
            got,
            CascadeMatch {
                name: "width".into(),
                selector: String::new(),
                value: "10px".into(),
                rank: None,
                important: true,
            }
        );
    }

    #[test]
    fn normal_inline_loses_only_to_important_rules() {
        let (dom, div, _) = sample(Some("width: 10px"));
        assert_eq!(accepted(&dom, div, "width", &sheets("#a { width: 1px }")).value, "10px");
        let got = accepted(&dom, div, "width", &sheets("div { width: 2px !important }"));
        assert_eq!((got.value.as_str(), got.important), ("2px", true));
    }

    #[test]
    fn later_important_beats_earlier_normal() {
        let (dom, div, _) = sample(None);
        let set = sheets("#a { color: red } div { color: blue !important }");
        let got = accepted(&dom, div, "color", &set);
        assert_eq!((got.value.as_str(), got.selector.as_str()), ("blue", "div"));
        assert_eq!(got.rank, Some(1));
    }

    #[test]
    fn later_same_selector_declaration_wins() {
        let (dom, div, _) = sample(None);
        let set = sheets(".b { color: red } .b { color: green }");
        assert_eq!(accepted(&dom, div, "color", &set).value, "green");

        let guarded = sheets(".b { color: red !important } .b { color: green }");
        assert_eq!(accepted(&dom, div, "color", &guarded).value, "red");
    }

    #[test]
    fn unset_property_is_empty() {
        let (dom, div, _) = sample(None);
        let got = accepted(&dom, div, "height", &sheets("div { width: 1px }"));
        assert_eq!(got.value, "");
        assert_eq!(got.selector, "");
        assert_eq!(got.rank, None);
        assert_eq!(
            serde_json::to_value(&got).unwrap(),
            serde_json::json!({
                "name": "height", "selector": "", "value": "", "rank": null, "priority": false
            })
        );
    }

    #[test]
    fn longhands_read_shorthands() {
        let (dom, div, _) = sample(None);
        let set = sheets(
            "div { margin: 1px 2px 3px; padding: 4px; border-width: 5px 6px; border: 1px solid red }",
        );
        assert_eq!(accepted(&dom, div, "margin-left", &set).value, "2px");
        assert_eq!(accepted(&dom, div, "margin-bottom", &set).value, "3px");
        assert_eq!(accepted(&dom, div, "padding-top", &set).value, "4px");
        assert_eq!(accepted(&dom, div, "border-right-width", &set).value, "6px");
        assert_eq!(accepted(&dom, div, "border-top", &set).value, "1px solid red");
        assert_eq!(accepted(&dom, div, "margin", &set).value, "1px 2px 3px");
    }

    #[test]
    fn later_longhand_overrides_shorthand_within_block() {
        let (dom, div, _) = sample(None);
        let set = sheets("div { margin: 1px; margin-top: 7px }");
        assert_eq!(accepted(&dom, div, "margin-top", &set).value, "7px");
        assert_eq!(accepted(&dom, div, "margin-right", &set).value, "1px");
    }

    #[test]
    fn shorthand_components_respect_functions() {
        assert_eq!(component("calc(1px + 2px) 3px", Side::Left).as_deref(), Some("3px"));
        assert_eq!(component("calc(1px + 2px) 3px", Side::Top).as_deref(), Some("calc(1px + 2px)"));
        assert_eq!(component("1px 2px 3px 4px 5px", Side::Top), None);
    }

    #[test]
    fn disabled_and_unmatched_media_are_ignored() {
        let (dom, div, _) = sample(None);
        let mut set = sheets("@media print { div { color: red } } @media screen { div { color: blue } }");
        assert_eq!(accepted(&dom, div, "color", &set).value, "blue");
        set.set_disabled(0, true);
        assert_eq!(accepted(&dom, div, "color", &set).value, "");
    }

    #[test]
    fn queries_are_idempotent() {
        let (dom, div, _) = sample(Some("color: black"));
        let set = sheets("#a { color: red !important } .b { color: blue }");
        let first = accepted(&dom, div, "color", &set);
        assert_eq!(first, accepted(&dom, div, "color", &set));
    }

    proptest! {
        #[test]
        fn inline_important_always_wins(
            rules in proptest::collection::vec(
                (prop::sample::select(vec!["#a", ".b", ".b.c", "div", "*", "body div"]),
                 any::<bool>(),
                 0u32..100),
                0..8,
            ),
        ) {
            let css: String = rules
                .iter()
                .map(|(sel, imp, n)| {
                    format!("{sel} {{ width: {n}px{} }}\n", if *imp { " !important" } else { "" })
                })
                .collect();
            let (dom, div, _) = sample(Some("width: 5em !important"));
            let got = accepted(&dom, div, "width", &sheets(&css));
            prop_assert_eq!(got.value, "5em");
            prop_assert!(got.important);
        }

        #[test]
        fn matched_order_never_increases_specificity(
            picks in proptest::collection::vec(
                prop::sample::select(vec!["#a", ".b", ".c", ".b.c", "div", "body div", "html body #a", "*"]),
                0..10,
            ),
        ) {
            let css: String = picks.iter().map(|s| format!("{s} {{}}\n")).collect();
            let (dom, div, _) = sample(None);
            let set = sheets(&css);
            let matched = matched_rules(&dom, div, &set, &MediaEnv::default());
            prop_assert_eq!(matched.len(), picks.len());
            for pair in matched.windows(2) {
                prop_assert!(pair[0].specificity >= pair[1].specificity);
                if pair[0].specificity == pair[1].specificity {
                    prop_assert!(pair[0].rule.order < pair[1].rule.order);
                }
            }
        }
    }
}
