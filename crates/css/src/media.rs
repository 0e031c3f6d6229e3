//! Media query lists for `@media` blocks, `@import` conditions and sheet
//! `media` attributes.

use crate::token::{CssToken, CssTokenizer, serialize_tokens, skip_ws};

/// Root font size used to resolve `em`/`rem` in media features.
const MEDIA_EM_PX: f32 = 16.0;

/// The rendering environment media queries are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediaEnv {
    pub width: f32,
    pub height: f32,
}

impl Default for MediaEnv {
    fn default() -> Self {
        Self {
            width: 1024.0,
            height: 768.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Orientation {
    Portrait,
    Landscape,
}

#[derive(Debug, Clone, PartialEq)]
enum MediaFeature {
    MinWidth(f32),
    MaxWidth(f32),
    MinHeight(f32),
    MaxHeight(f32),
    Orientation(Orientation),
    /// Anything this evaluator cannot decide. Never matches.
    Unsupported,
}

impl MediaFeature {
    fn matches(&self, env: &MediaEnv) -> bool {
        match *self {
            MediaFeature::MinWidth(v) => env.width >= v,
            MediaFeature::MaxWidth(v) => env.width <= v,
            MediaFeature::MinHeight(v) => env.height >= v,
            MediaFeature::MaxHeight(v) => env.height <= v,
            MediaFeature::Orientation(o) => {
                let portrait = env.height >= env.width;
                (o == Orientation::Portrait) == portrait
            }
            MediaFeature::Unsupported => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct MediaQuery {
    text: String,
    negated: bool,
    /// `None` means `all`.
    media_type: Option<String>,
    features: Vec<MediaFeature>,
}

impl MediaQuery {
    /// A query that failed to parse behaves as `not all`.
    fn never(text: String) -> Self {
        Self {
            text,
            negated: true,
            media_type: None,
            features: Vec::new(),
        }
    }

    fn matches(&self, env: &MediaEnv) -> bool {
        let type_ok = match self.media_type.as_deref() {
            None | Some("all") | Some("screen") => true,
            _ => false,
        };
        let result = type_ok && self.features.iter().all(|f| f.matches(env));
        result != self.negated
    }
}

/// A comma-separated list of media queries. The empty list matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaQueryList {
    queries: Vec<MediaQuery>,
}

impl MediaQueryList {
    pub fn parse(input: &str) -> Self {
        let tokens = CssTokenizer::new(input).tokenize_all();
        Self::from_tokens(&tokens)
    }

    pub fn from_tokens(tokens: &[CssToken]) -> Self {
        let queries = tokens
            .split(|t| *t == CssToken::Comma)
            .filter(|q| skip_ws(q, 0) < q.len())
            .map(parse_query)
            .collect();
        Self { queries }
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn matches(&self, env: &MediaEnv) -> bool {
        self.is_empty() || self.queries.iter().any(|q| q.matches(env))
    }

    /// Serialized form of the whole list.
    pub fn text(&self) -> String {
        self.queries
            .iter()
            .map(|q| q.text.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Serialized form of the first query, if any.
    pub fn first_medium(&self) -> Option<&str> {
        self.queries.first().map(|q| q.text.as_str())
    }
}

fn parse_query(tokens: &[CssToken]) -> MediaQuery {
    let text = serialize_tokens(tokens);
    let mut pos = skip_ws(tokens, 0);
    let mut negated = false;
    let mut media_type = None;

    if let Some(CssToken::Ident(word)) = tokens.get(pos) {
        let word = word.to_ascii_lowercase();
        let mut next = skip_ws(tokens, pos + 1);
        let type_word = match word.as_str() {
            "not" | "only" => {
                negated = word == "not";
                match tokens.get(next) {
                    Some(CssToken::Ident(t)) => {
                        next = skip_ws(tokens, next + 1);
                        t.to_ascii_lowercase()
                    }
                    _ => return MediaQuery::never(text),
                }
            }
            _ => word,
        };
        media_type = Some(type_word);
        pos = next;
    }

    let mut features = Vec::new();
    let mut expect_and = media_type.is_some();
    while pos < tokens.len() {
        if expect_and {
            match tokens.get(pos) {
                Some(CssToken::Ident(and)) if and.eq_ignore_ascii_case("and") => {
                    pos = skip_ws(tokens, pos + 1);
                }
                _ => return MediaQuery::never(text),
            }
        }
        let Some((feature, next)) = parse_feature(tokens, pos) else {
            return MediaQuery::never(text);
        };
        features.push(feature);
        pos = skip_ws(tokens, next);
        expect_and = true;
    }

    MediaQuery {
        text,
        negated,
        media_type,
        features,
    }
}

/// Parse `( name : value )` starting at `pos`.
fn parse_feature(tokens: &[CssToken], pos: usize) -> Option<(MediaFeature, usize)> {
    if tokens.get(pos) != Some(&CssToken::LParen) {
        return None;
    }
    let close = pos + tokens[pos..].iter().position(|t| *t == CssToken::RParen)?;
    let inner = &tokens[pos + 1..close];

    let name_at = skip_ws(inner, 0);
    let name = match inner.get(name_at) {
        Some(CssToken::Ident(n)) => n.to_ascii_lowercase(),
        _ => return None,
    };
    let colon_at = skip_ws(inner, name_at + 1);
    if inner.get(colon_at) != Some(&CssToken::Colon) {
        // Boolean form such as `(color)`.
        return Some((MediaFeature::Unsupported, close + 1));
    }
    let value_at = skip_ws(inner, colon_at + 1);
    let value = inner.get(value_at);

    let feature = match name.as_str() {
        "min-width" => length(value).map(MediaFeature::MinWidth),
        "max-width" => length(value).map(MediaFeature::MaxWidth),
        "min-height" => length(value).map(MediaFeature::MinHeight),
        "max-height" => length(value).map(MediaFeature::MaxHeight),
        "orientation" => match value {
            Some(CssToken::Ident(o)) if o.eq_ignore_ascii_case("portrait") => {
                Some(MediaFeature::Orientation(Orientation::Portrait))
            }
            Some(CssToken::Ident(o)) if o.eq_ignore_ascii_case("landscape") => {
                Some(MediaFeature::Orientation(Orientation::Landscape))
            }
            _ => None,
        },
        _ => None,
    };
    Some((feature.unwrap_or(MediaFeature::Unsupported), close + 1))
}

fn length(token: Option<&CssToken>) -> Option<f32> {
    match token? {
        CssToken::Number { value, .. } if *value == 0.0 => Some(0.0),
        CssToken::Dimension { value, unit } => match unit.to_ascii_lowercase().as_str() {
            "px" => Some(*value as f32),
            "em" | "rem" => Some(*value as f32 * MEDIA_EM_PX),
            _ => None,
        },
        _ => None,
    }
}
