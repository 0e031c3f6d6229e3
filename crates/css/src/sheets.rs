//! The live stylesheet set.
//!
//! Sheets are kept in document order. Walking the set yields every style rule
//! that applies under the current media environment, with `@import` and
//! `@media` containers expanded in place.

use std::collections::{HashMap, HashSet};

use crate::media::{MediaEnv, MediaQueryList};
use crate::parser::{CssRule, StyleRule, Stylesheet, parse_stylesheet};

/// Guards against pathological `@import` chains.
const MAX_IMPORT_DEPTH: usize = 16;

/// One sheet attached to the document (`<link>` or `<style>`).
#[derive(Debug, Clone)]
pub struct SheetEntry {
    /// Absolute URL for linked sheets; `None` for inline `<style>` blocks.
    pub href: Option<String>,
    pub disabled: bool,
    pub media: MediaQueryList,
    pub sheet: Stylesheet,
}

/// A style rule together with where it lives.
#[derive(Debug, Clone, Copy)]
pub struct RuleRef<'a> {
    pub rule: &'a StyleRule,
    /// `href` of the sheet that owns the rule.
    pub href: Option<&'a str>,
    /// Position of the rule in its immediate container.
    pub index: usize,
    /// Position of the enclosing `@media` rule in its own container.
    pub parent_index: Option<usize>,
    /// First medium of the enclosing `@media` rule.
    pub media: Option<&'a str>,
    /// Position in the flattened walk; ties between equal specificities are
    /// broken by this.
    pub order: usize,
}

#[derive(Debug, Default)]
pub struct StyleSheetSet {
    sheets: Vec<SheetEntry>,
    /// Sheets reachable only through `@import`, by href.
    imported: HashMap<String, Stylesheet>,
}

impl StyleSheetSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a linked or inline sheet in document order.
    pub fn push(&mut self, href: Option<&str>, media: &str, css: &str) -> usize {
        self.sheets.push(SheetEntry {
            href: href.map(str::to_string),
            disabled: false,
            media: MediaQueryList::parse(media),
            sheet: parse_stylesheet(css),
        });
        self.sheets.len() - 1
    }

    /// Register the contents served for an `@import` target.
    pub fn register_import(&mut self, href: &str, css: &str) {
        self.imported.insert(href.to_string(), parse_stylesheet(css));
    }

    pub fn set_disabled(&mut self, index: usize, disabled: bool) -> bool {
        match self.sheets.get_mut(index) {
            Some(entry) => {
                entry.disabled = disabled;
                true
            }
            None => false,
        }
    }

    pub fn sheets(&self) -> &[SheetEntry] {
        &self.sheets
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Every style rule that is live under `env`, in cascade order.
    pub fn active_rules(&self, env: &MediaEnv) -> Vec<RuleRef<'_>> {
        let mut walk = Walk {
            set: self,
            env,
            out: Vec::new(),
            visiting: HashSet::new(),
        };
        for entry in &self.sheets {
            if entry.disabled || !entry.media.matches(env) {
                continue;
            }
            walk.rules(&entry.sheet.rules, entry.href.as_deref(), None, 0);
        }
        walk.out
    }
}

struct Walk<'a, 'e> {
    set: &'a StyleSheetSet,
    env: &'e MediaEnv,
    out: Vec<RuleRef<'a>>,
    visiting: HashSet<&'a str>,
}

impl<'a> Walk<'a, '_> {
    fn rules(
        &mut self,
        rules: &'a [CssRule],
        href: Option<&'a str>,
        parent: Option<(usize, Option<&'a str>)>,
        depth: usize,
    ) {
        for (index, rule) in rules.iter().enumerate() {
            match rule {
                CssRule::Style(style) => {
                    let order = self.out.len();
                    self.out.push(RuleRef {
                        rule: style,
                        href,
                        index,
                        parent_index: parent.map(|(i, _)| i),
                        media: parent.and_then(|(_, m)| m),
                        order,
                    });
                }
                CssRule::Media(media) if media.media.matches(self.env) => {
                    self.rules(&media.rules, href, Some((index, media.media.first_medium())), depth);
                }
                CssRule::Import(import) if import.media.matches(self.env) => {
                    self.import(&import.href, depth);
                }
                _ => {}
            }
        }
    }

    fn import(&mut self, href: &'a str, depth: usize) {
        if depth >= MAX_IMPORT_DEPTH || !self.visiting.insert(href) {
            return;
        }
        if let Some(sheet) = self.set.imported.get(href) {
            self.rules(&sheet.rules, Some(href), None, depth + 1);
        }
        self.visiting.remove(href);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selectors(rules: &[RuleRef<'_>]) -> Vec<String> {
        rules.iter().map(|r| r.rule.selector_text.clone()).collect()
    }

    #[test]
    fn walk_expands_imports_and_media_in_place() {
        let mut set = StyleSheetSet::new();
        set.register_import("/base.css", "b1 {} b2 {}");
        set.push(
            Some("/main.css"),
            "",
            "@import '/base.css'; m1 {} @media screen { m2 {} } @media print { never {} } m3 {}",
        );
        set.push(None, "", "inline {}");

        let rules = set.active_rules(&MediaEnv::default());
        assert_eq!(selectors(&rules), vec!["b1", "b2", "m1", "m2", "m3", "inline"]);
        assert_eq!(rules[0].href, Some("/base.css"));
        assert_eq!(rules[5].href, None);
        assert_eq!(rules.iter().map(|r| r.order).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn provenance_indices() {
        let mut set = StyleSheetSet::new();
        set.push(
            Some("/s.css"),
            "",
            "a {} @font-face { font-family: x } @media (min-width: 1px) { b {} c {} }",
        );
        let rules = set.active_rules(&MediaEnv::default());
        assert_eq!((rules[0].index, rules[0].parent_index), (0, None));
        assert_eq!((rules[2].index, rules[2].parent_index), (1, Some(2)));
        assert_eq!(rules[2].media, Some("(min-width: 1px)"));
    }

    #[test]
    fn disabled_and_media_gated_sheets_are_skipped() {
        let mut set = StyleSheetSet::new();
        let first = set.push(Some("/a.css"), "", "a {}");
        set.push(Some("/p.css"), "print", "p {}");
        set.push(Some("/w.css"), "(min-width: 2000px)", "w {}");
        assert_eq!(selectors(&set.active_rules(&MediaEnv::default())), vec!["a"]);

        assert!(set.set_disabled(first, true));
        assert!(set.active_rules(&MediaEnv::default()).is_empty());
        assert!(!set.set_disabled(9, true));
    }

    #[test]
    fn import_cycles_terminate() {
        let mut set = StyleSheetSet::new();
        set.register_import("/x.css", "@import '/y.css'; x {}");
        set.register_import("/y.css", "@import '/x.css'; y {}");
        set.push(None, "", "@import '/x.css';");
        assert_eq!(selectors(&set.active_rules(&MediaEnv::default())), vec!["y", "x"]);
    }
}
