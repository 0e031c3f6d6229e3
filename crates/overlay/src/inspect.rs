//! Inspection payload pieces: where the rules matching an element live, and
//! the element's stable-id ancestry.

use css::{MediaEnv, StyleSheetSet};
use dom::{Dom, NodeId};
use serde::Serialize;
use style::{MatchedRule, matched_rules};

/// Location of one matched rule in its stylesheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleInfo {
    pub selector_text: String,
    /// Index within the rule's immediate container.
    pub index: usize,
    /// Sheet path with the page origin stripped and `%20` decoded.
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<String>,
    /// Index of the enclosing `@media` rule within its sheet.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_index: Option<usize>,
}

/// Matched rules from linked sheets, least specific first. Rules from inline
/// `<style>` blocks have no href and are left out.
pub fn rule_provenance(
    dom: &Dom,
    node: NodeId,
    sheets: &StyleSheetSet,
    env: &MediaEnv,
    origin: &str,
) -> Vec<RuleInfo> {
    matched_rules(dom, node, sheets, env)
        .into_iter()
        .rev()
        .filter_map(|matched| {
            let href = matched.rule.href.filter(|h| !h.is_empty())?;
            let href = if origin.is_empty() {
                href
            } else {
                href.strip_prefix(origin).unwrap_or(href)
            };
            let media = matched.rule.media.map(str::to_string);
            Some(RuleInfo {
                selector_text: matched.selector_text().to_string(),
                index: matched.rule.index,
                href: href.replace("%20", " "),
                parent_index: media.as_ref().and(matched.rule.parent_index),
                media,
            })
        })
        .collect()
}

fn is_linked(matched: &MatchedRule<'_>) -> bool {
    matched.rule.href.is_some_and(|h| !h.is_empty())
}

/// 1-based position in the [`rule_provenance`] list of the rule at `rank` in
/// `matched` (most specific first). `None` for rules that are not listed.
pub fn data_position(matched: &[MatchedRule<'_>], rank: usize) -> Option<usize> {
    let rest = matched.get(rank..)?;
    if !is_linked(rest.first()?) {
        return None;
    }
    Some(rest.iter().filter(|m| is_linked(m)).count())
}

/// One step of a node path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathEntry {
    /// Upper-cased tag name.
    pub label: String,
    /// The element's stable id, as written in the attribute.
    pub target: String,
}

/// `node` and its ancestors, innermost first, up to the first element
/// without a stable id.
pub fn node_path(dom: &Dom, node: NodeId) -> Vec<PathEntry> {
    std::iter::once(node)
        .chain(dom.ancestors(node))
        .map_while(|n| {
            let target = dom.attribute(n, dom::STABLE_ID_ATTR)?;
            let label = dom.tag_name(n)?.to_ascii_uppercase();
            Some(PathEntry {
                label,
                target: target.to_string(),
            })
        })
        .collect()
}

/// `DIV#main `, `P.note.wide `, `SPAN `: the tag plus the id, or the
/// classes when there is no id. Used for inspect pane titles.
pub fn element_label(dom: &Dom, node: NodeId) -> String {
    let Some(element) = dom.element(node) else {
        return String::new();
    };
    let mut label = element.tag_name.to_ascii_uppercase();
    match element.attr("id").filter(|id| !id.is_empty()) {
        Some(id) => {
            label.push('#');
            label.push_str(id);
        }
        None => {
            let classes: Vec<&str> = element
                .attr("class")
                .unwrap_or_default()
                .split_whitespace()
                .collect();
            if !classes.is_empty() {
                label.push('.');
                label.push_str(&classes.join("."));
            }
        }
    }
    label.push(' ');
    label
}
