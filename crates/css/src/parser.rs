//! Stylesheet parser.
//!
//! Style rules keep their selector text and raw declaration values. `@media`
//! and `@import` stay as containers so that rule positions can be reported
//! the way the editor indexes them; other at-rules are kept as opaque
//! placeholders for the same reason.

use crate::media::MediaQueryList;
use crate::selector::{ComplexSelector, parse_selector_list_from_tokens};
use crate::token::{CssToken, CssTokenizer, serialize_tokens, skip_ws};

/// A CSS declaration (property: value).
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Lower-cased property name, e.g. `color`, `margin-left`.
    pub name: String,
    /// Serialized value with `!important` removed.
    pub value: String,
    pub important: bool,
}

/// A CSS style rule: selectors + declarations.
#[derive(Debug, Clone)]
pub struct StyleRule {
    pub selector_text: String,
    pub selectors: Vec<ComplexSelector>,
    pub declarations: Vec<Declaration>,
}

impl StyleRule {
    /// The effective declaration for `name` within this block: the last
    /// important one, otherwise the last one.
    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        find_declaration(&self.declarations, name)
    }
}

/// Pick the winning declaration for `name` out of one block.
pub fn find_declaration<'a>(declarations: &'a [Declaration], name: &str) -> Option<&'a Declaration> {
    let mut candidates = declarations.iter().filter(|d| d.name == name);
    let last = candidates.clone().next_back();
    candidates.rfind(|d| d.important).or(last)
}

#[derive(Debug, Clone)]
pub struct MediaRule {
    pub media: MediaQueryList,
    pub rules: Vec<CssRule>,
}

#[derive(Debug, Clone)]
pub struct ImportRule {
    pub href: String,
    pub media: MediaQueryList,
}

#[derive(Debug, Clone)]
pub enum CssRule {
    Style(StyleRule),
    Media(MediaRule),
    Import(ImportRule),
    /// Any other at-rule (`@font-face`, `@keyframes`, …), by name.
    Other(String),
}

/// A parsed CSS stylesheet.
#[derive(Debug, Clone, Default)]
pub struct Stylesheet {
    /// Top-level rules in source order.
    pub rules: Vec<CssRule>,
}

/// Parse a complete CSS stylesheet from a string.
pub fn parse_stylesheet(input: &str) -> Stylesheet {
    let tokens = CssTokenizer::new(input).tokenize_all();
    Stylesheet {
        rules: parse_rules(&tokens),
    }
}

/// Parse the body of a `style` attribute.
pub fn parse_inline_style(input: &str) -> Vec<Declaration> {
    let tokens = CssTokenizer::new(input).tokenize_all();
    parse_declaration_block(&tokens)
}

fn parse_rules(tokens: &[CssToken]) -> Vec<CssRule> {
    let mut rules = Vec::new();
    let mut pos = 0;

    loop {
        pos = skip_ws(tokens, pos);
        let Some(token) = tokens.get(pos) else {
            break;
        };

        match token {
            CssToken::CDO | CssToken::CDC => pos += 1,
            CssToken::AtKeyword(name) => {
                let (rule, next) = parse_at_rule(tokens, pos, &name.to_ascii_lowercase());
                rules.extend(rule);
                pos = next;
            }
            _ => {
                let (rule, next) = parse_style_rule(tokens, pos);
                rules.extend(rule.map(CssRule::Style));
                pos = next;
            }
        }
    }

    rules
}

/// Parse the at-rule whose keyword sits at `start`. Returns `None` for a
/// statement that is dropped (`@charset`, malformed `@import`).
fn parse_at_rule(tokens: &[CssToken], start: usize, name: &str) -> (Option<CssRule>, usize) {
    let prelude_start = start + 1;
    let mut pos = prelude_start;
    while let Some(tok) = tokens.get(pos) {
        if matches!(tok, CssToken::Semicolon | CssToken::LBrace) {
            break;
        }
        pos += 1;
    }
    let prelude = &tokens[prelude_start..pos];

    match tokens.get(pos) {
        Some(CssToken::LBrace) => {
            let (body, next) = block_body(tokens, pos);
            let rule = match name {
                "media" => CssRule::Media(MediaRule {
                    media: MediaQueryList::from_tokens(prelude),
                    rules: parse_rules(body),
                }),
                other => CssRule::Other(other.to_string()),
            };
            (Some(rule), next)
        }
        // `;` or end of input terminates a statement at-rule.
        _ => {
            let next = (pos + 1).min(tokens.len());
            let rule = match name {
                "import" => parse_import(prelude).map(CssRule::Import),
                "charset" => None,
                other => Some(CssRule::Other(other.to_string())),
            };
            (rule, next)
        }
    }
}

fn parse_import(prelude: &[CssToken]) -> Option<ImportRule> {
    let at = skip_ws(prelude, 0);
    let (href, rest) = match prelude.get(at)? {
        CssToken::String(s) | CssToken::Url(s) => (s.clone(), at + 1),
        CssToken::Function(f) if f.eq_ignore_ascii_case("url") => {
            let arg = skip_ws(prelude, at + 1);
            match prelude.get(arg)? {
                CssToken::String(s) => {
                    let close = skip_ws(prelude, arg + 1);
                    (s.clone(), close + 1)
                }
                _ => return None,
            }
        }
        _ => return None,
    };
    Some(ImportRule {
        href,
        media: MediaQueryList::from_tokens(prelude.get(rest..).unwrap_or(&[])),
    })
}

/// Given `open` pointing at `{`, return the tokens inside the block and the
/// position after the matching `}`.
fn block_body(tokens: &[CssToken], open: usize) -> (&[CssToken], usize) {
    let mut depth = 0usize;
    for (i, tok) in tokens.iter().enumerate().skip(open) {
        match tok {
            CssToken::LBrace => depth += 1,
            CssToken::RBrace => {
                depth -= 1;
                if depth == 0 {
                    return (&tokens[open + 1..i], i + 1);
                }
            }
            _ => {}
        }
    }
    (&tokens[open + 1..], tokens.len())
}

/// Parse a qualified rule: `selectors { declarations }`. An invalid selector
/// drops the whole rule, block included.
fn parse_style_rule(tokens: &[CssToken], start: usize) -> (Option<StyleRule>, usize) {
    let Some(open) = tokens[start..]
        .iter()
        .position(|t| *t == CssToken::LBrace)
        .map(|i| start + i)
    else {
        return (None, tokens.len());
    };

    let prelude = &tokens[start..open];
    let (body, next) = block_body(tokens, open);
    let selectors = parse_selector_list_from_tokens(prelude);
    if selectors.is_empty() {
        return (None, next);
    }

    let rule = StyleRule {
        selector_text: serialize_tokens(prelude),
        selectors,
        declarations: parse_declaration_block(body),
    };
    (Some(rule), next)
}

/// Parse a declaration block (the content between `{` and `}`).
pub fn parse_declaration_block(tokens: &[CssToken]) -> Vec<Declaration> {
    tokens
        .split(|t| *t == CssToken::Semicolon)
        .filter_map(parse_declaration)
        .collect()
}

/// Parse a single declaration: `property: value [!important]`.
fn parse_declaration(tokens: &[CssToken]) -> Option<Declaration> {
    let at = skip_ws(tokens, 0);
    let name = match tokens.get(at)? {
        CssToken::Ident(name) => name.to_ascii_lowercase(),
        _ => return None,
    };
    let colon = skip_ws(tokens, at + 1);
    if tokens.get(colon)? != &CssToken::Colon {
        return None;
    }

    let (value_tokens, important) = strip_important(&tokens[colon + 1..]);
    let value = serialize_tokens(value_tokens);
    if value.is_empty() {
        return None;
    }
    Some(Declaration {
        name,
        value,
        important,
    })
}

/// Split a trailing `! important` off the value tokens.
fn strip_important(tokens: &[CssToken]) -> (&[CssToken], bool) {
    let significant: Vec<usize> = tokens
        .iter()
        .enumerate()
        .filter(|(_, t)| **t != CssToken::Whitespace)
        .map(|(i, _)| i)
        .collect();

    if let [.., bang, word] = significant[..] {
        let is_important =
            matches!(&tokens[word], CssToken::Ident(w) if w.eq_ignore_ascii_case("important"));
        if is_important && tokens[bang] == CssToken::Delim('!') {
            return (&tokens[..bang], true);
        }
    }
    (tokens, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaEnv;
    use crate::selector::SimpleSelector;

    fn style(rule: &CssRule) -> &StyleRule {
        match rule {
            CssRule::Style(s) => s,
            other => panic!("expected style rule, got {other:?}"),
        }
    }

    #[test]
    fn style_rule_keeps_text_and_values() {
        let sheet = parse_stylesheet("div  >  p.note { margin: 0 auto; border: 1px solid #ccc }");
        assert_eq!(sheet.rules.len(), 1);
        let rule = style(&sheet.rules[0]);
        assert_eq!(rule.selector_text, "div > p.note");
        assert_eq!(rule.declarations[0].name, "margin");
        assert_eq!(rule.declarations[0].value, "0 auto");
        assert_eq!(rule.declarations[1].value, "1px solid #ccc");
    }

    #[test]
    fn important_flag() {
        let sheet = parse_stylesheet("p { color: red ! important; width: 10px }");
        let rule = style(&sheet.rules[0]);
        assert!(rule.declarations[0].important);
        assert_eq!(rule.declarations[0].value, "red");
        assert!(!rule.declarations[1].important);
    }

    #[test]
    fn block_level_winner() {
        let sheet = parse_stylesheet("p { color: red !important; color: blue; width: 1px; width: 2px }");
        let rule = style(&sheet.rules[0]);
        assert_eq!(rule.declaration("color").unwrap().value, "red");
        assert_eq!(rule.declaration("width").unwrap().value, "2px");
        assert!(rule.declaration("height").is_none());
    }

    #[test]
    fn media_blocks_nest() {
        let sheet = parse_stylesheet(
            "h1 { color: red }
             @media (min-width: 768px) { h1 { color: green } @media print { h1 { color: black } } }
             p { margin: 1px }",
        );
        assert_eq!(sheet.rules.len(), 3);
        let CssRule::Media(media) = &sheet.rules[1] else {
            panic!("expected @media");
        };
        assert!(media.media.matches(&MediaEnv::default()));
        assert_eq!(media.rules.len(), 2);
        assert!(matches!(media.rules[1], CssRule::Media(_)));
    }

    #[test]
    fn import_forms() {
        let sheet = parse_stylesheet(
            r#"@charset "utf-8";
               @import "a.css";
               @import url(b.css) print;
               @import url("c.css") screen;
               body { color: red }"#,
        );
        let hrefs: Vec<&str> = sheet
            .rules
            .iter()
            .filter_map(|r| match r {
                CssRule::Import(i) => Some(i.href.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(hrefs, vec!["a.css", "b.css", "c.css"]);
        let CssRule::Import(print) = &sheet.rules[1] else {
            panic!("expected @import");
        };
        assert!(!print.media.matches(&MediaEnv::default()));
        assert_eq!(sheet.rules.len(), 4);
    }

    #[test]
    fn other_at_rules_hold_their_index() {
        let sheet = parse_stylesheet("@font-face { font-family: x } p { color: red }");
        assert!(matches!(&sheet.rules[0], CssRule::Other(n) if n == "font-face"));
        assert_eq!(
            style(&sheet.rules[1]).selectors[0].parts[0].0.simples,
            vec![SimpleSelector::Type("p".into())]
        );
    }

    #[test]
    fn invalid_selector_drops_rule_only() {
        let sheet = parse_stylesheet("p %% { color: red } a { color: blue }");
        assert_eq!(sheet.rules.len(), 1);
        assert_eq!(style(&sheet.rules[0]).selector_text, "a");
    }

    #[test]
    fn inline_style_block() {
        let decls = parse_inline_style("width: 50%; ; bogus; height:auto !important");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[0].value, "50%");
        assert!(decls[1].important);
    }

    #[test]
    fn empty_inputs() {
        assert!(parse_stylesheet("  \n ").rules.is_empty());
        assert!(style(&parse_stylesheet("div { }").rules[0]).declarations.is_empty());
    }
}
