//! Selector model, parser and specificity.

use crate::token::{CssToken, CssTokenizer, skip_ws};

/// Combinator between compound selectors in a complex selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Whitespace: ancestor descendant
    Descendant,
    /// `>`: parent > child
    Child,
    /// `+`: prev + next
    NextSibling,
    /// `~`: prev ~ subsequent
    SubsequentSibling,
}

/// Attribute selector operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOp {
    /// `[attr]`
    Exists,
    /// `[attr=val]`
    Eq,
    /// `[attr~=val]`
    Includes,
    /// `[attr|=val]`
    DashMatch,
    /// `[attr^=val]`
    Prefix,
    /// `[attr$=val]`
    Suffix,
    /// `[attr*=val]`
    Substring,
}

/// Pseudo-classes the matcher understands.
///
/// Interaction states (`:hover`, `:focus`, …) are parsed so that they count
/// toward specificity, but a static tree never satisfies them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PseudoClass {
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    /// `nth-child(an+b)` with coefficients `(a, b)`.
    NthChild(i32, i32),
    Root,
    Empty,
    /// `:not(...)` containing a compound selector.
    Not(Box<CompoundSelector>),
    /// Any dynamic state pseudo-class, by name.
    State(String),
}

/// Pseudo-element selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoElement {
    Before,
    After,
    FirstLine,
    FirstLetter,
    Selection,
}

/// A single simple selector component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// Type selector, e.g. `div`, `p`.
    Type(String),
    /// Universal selector `*`.
    Universal,
    /// ID selector `#foo`.
    Id(String),
    /// Class selector `.bar`.
    Class(String),
    /// Attribute selector `[name op value]`.
    Attribute {
        name: String,
        op: AttrOp,
        value: Option<String>,
    },
    PseudoClass(PseudoClass),
    PseudoElement(PseudoElement),
}

/// A compound selector is a sequence of simple selectors
/// without any combinator between them (e.g. `div.foo#bar`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

/// A complex selector is a chain of compound selectors separated by combinators.
/// Stored right-to-left for efficient matching: `parts[0]` is the rightmost
/// (subject) compound selector.
///
/// Each element is `(compound_selector, optional_combinator_to_the_left)`.
/// The last element's combinator is always `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexSelector {
    pub parts: Vec<(CompoundSelector, Option<Combinator>)>,
}

impl ComplexSelector {
    pub fn specificity(&self) -> Specificity {
        compute_specificity(self)
    }

    /// The subject compound carries a pseudo-element, so it never matches an element.
    pub fn targets_pseudo_element(&self) -> bool {
        self.parts.first().is_some_and(|(compound, _)| {
            compound
                .simples
                .iter()
                .any(|s| matches!(s, SimpleSelector::PseudoElement(_)))
        })
    }
}

/// CSS specificity as a triple `(a, b, c)`:
///   - `a`: count of ID selectors
///   - `b`: count of class selectors, attribute selectors, and pseudo-classes
///   - `c`: count of type selectors and pseudo-elements
///
/// Field order makes the derived ordering lexicographic with `a` most significant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Specificity {
    pub a: u32,
    pub b: u32,
    pub c: u32,
}

impl Specificity {
    pub const ZERO: Self = Self { a: 0, b: 0, c: 0 };

    pub const fn new(a: u32, b: u32, c: u32) -> Self {
        Self { a, b, c }
    }
}

impl std::ops::Add for Specificity {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self::new(self.a + other.a, self.b + other.b, self.c + other.c)
    }
}

impl std::iter::Sum for Specificity {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, |acc, s| acc + s)
    }
}

/// Compute the specificity of a complex selector.
pub fn compute_specificity(selector: &ComplexSelector) -> Specificity {
    selector
        .parts
        .iter()
        .map(|(compound, _)| compound_specificity(compound))
        .sum()
}

fn compound_specificity(compound: &CompoundSelector) -> Specificity {
    compound.simples.iter().map(simple_specificity).sum()
}

fn simple_specificity(simple: &SimpleSelector) -> Specificity {
    match simple {
        SimpleSelector::Id(_) => Specificity::new(1, 0, 0),
        SimpleSelector::Class(_) | SimpleSelector::Attribute { .. } => Specificity::new(0, 1, 0),
        // :not() counts as its argument
        SimpleSelector::PseudoClass(PseudoClass::Not(inner)) => compound_specificity(inner),
        SimpleSelector::PseudoClass(_) => Specificity::new(0, 1, 0),
        SimpleSelector::Type(_) | SimpleSelector::PseudoElement(_) => Specificity::new(0, 0, 1),
        SimpleSelector::Universal => Specificity::ZERO,
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a selector list from a CSS selector string.
pub fn parse_selector_list(input: &str) -> Vec<ComplexSelector> {
    let tokens = CssTokenizer::new(input).tokenize_all();
    parse_selector_list_from_tokens(&tokens)
}

/// Parse a comma-separated selector list. An unparseable member invalidates
/// the whole list, as it does for a style rule's prelude.
pub fn parse_selector_list_from_tokens(tokens: &[CssToken]) -> Vec<ComplexSelector> {
    let mut parser = SelectorParser { tokens, pos: 0 };
    let mut selectors = Vec::new();
    loop {
        parser.pos = skip_ws(tokens, parser.pos);
        match parser.complex() {
            Some(selector) => selectors.push(selector),
            None => return Vec::new(),
        }
        parser.pos = skip_ws(tokens, parser.pos);
        match parser.peek() {
            None => return selectors,
            Some(CssToken::Comma) => parser.pos += 1,
            Some(_) => return Vec::new(),
        }
    }
}

struct SelectorParser<'a> {
    tokens: &'a [CssToken],
    pos: usize,
}

impl<'a> SelectorParser<'a> {
    fn peek(&self) -> Option<&'a CssToken> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&'a CssToken> {
        self.tokens.get(self.pos + offset)
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        self.pos = skip_ws(self.tokens, self.pos);
        self.pos != start
    }

    fn complex(&mut self) -> Option<ComplexSelector> {
        let mut parts_ltr = vec![(self.compound()?, None)];

        loop {
            let had_whitespace = self.skip_ws();
            let combinator = match self.peek() {
                Some(CssToken::Delim('>')) => Combinator::Child,
                Some(CssToken::Delim('+')) => Combinator::NextSibling,
                Some(CssToken::Delim('~')) => Combinator::SubsequentSibling,
                None | Some(CssToken::Comma) => break,
                Some(_) if had_whitespace => Combinator::Descendant,
                Some(_) => return None,
            };
            if combinator != Combinator::Descendant {
                self.pos += 1;
                self.skip_ws();
            }
            parts_ltr.push((self.compound()?, Some(combinator)));
        }

        // Each LTR combinator links a compound to its left neighbour; after
        // reversing it describes how to step from a part to the next one.
        parts_ltr.reverse();
        Some(ComplexSelector { parts: parts_ltr })
    }

    fn compound(&mut self) -> Option<CompoundSelector> {
        let mut simples = Vec::new();

        match self.peek() {
            Some(CssToken::Ident(name)) => {
                simples.push(SimpleSelector::Type(name.to_ascii_lowercase()));
                self.pos += 1;
            }
            Some(CssToken::Delim('*')) => {
                simples.push(SimpleSelector::Universal);
                self.pos += 1;
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some(CssToken::Hash { value, .. }) => {
                    simples.push(SimpleSelector::Id(value.clone()));
                    self.pos += 1;
                }
                Some(CssToken::Delim('.')) => match self.peek_at(1) {
                    Some(CssToken::Ident(name)) => {
                        simples.push(SimpleSelector::Class(name.clone()));
                        self.pos += 2;
                    }
                    _ => return None,
                },
                Some(CssToken::LBracket) => simples.push(self.attribute()?),
                Some(CssToken::Colon) => simples.push(self.pseudo()?),
                _ => break,
            }
        }

        (!simples.is_empty()).then_some(CompoundSelector { simples })
    }

    /// `[name]` or `[name op value]`.
    fn attribute(&mut self) -> Option<SimpleSelector> {
        self.pos += 1;
        self.skip_ws();
        let name = match self.peek()? {
            CssToken::Ident(n) => n.to_ascii_lowercase(),
            _ => return None,
        };
        self.pos += 1;
        self.skip_ws();

        let op = match (self.peek()?, self.peek_at(1)) {
            (CssToken::RBracket, _) => {
                self.pos += 1;
                return Some(SimpleSelector::Attribute {
                    name,
                    op: AttrOp::Exists,
                    value: None,
                });
            }
            (CssToken::Delim('='), _) => {
                self.pos += 1;
                AttrOp::Eq
            }
            (CssToken::Delim(c), Some(CssToken::Delim('='))) => {
                let op = match c {
                    '~' => AttrOp::Includes,
                    '|' => AttrOp::DashMatch,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    '*' => AttrOp::Substring,
                    _ => return None,
                };
                self.pos += 2;
                op
            }
            _ => return None,
        };

        self.skip_ws();
        let value = match self.peek()? {
            CssToken::Ident(v) | CssToken::String(v) => v.clone(),
            CssToken::Number { value, .. } => value.to_string(),
            _ => return None,
        };
        self.pos += 1;
        self.skip_ws();
        if self.peek()? != &CssToken::RBracket {
            return None;
        }
        self.pos += 1;

        Some(SimpleSelector::Attribute {
            name,
            op,
            value: Some(value),
        })
    }

    fn pseudo(&mut self) -> Option<SimpleSelector> {
        self.pos += 1;
        let double_colon = self.peek() == Some(&CssToken::Colon);
        if double_colon {
            self.pos += 1;
        }

        match self.peek()? {
            CssToken::Ident(name) => {
                self.pos += 1;
                let lower = name.to_ascii_lowercase();
                if let Some(pe) = pseudo_element(&lower) {
                    return Some(SimpleSelector::PseudoElement(pe));
                }
                if double_colon {
                    return None;
                }
                let pc = match lower.as_str() {
                    "first-child" => PseudoClass::FirstChild,
                    "last-child" => PseudoClass::LastChild,
                    "only-child" => PseudoClass::OnlyChild,
                    "first-of-type" => PseudoClass::FirstOfType,
                    "last-of-type" => PseudoClass::LastOfType,
                    "root" => PseudoClass::Root,
                    "empty" => PseudoClass::Empty,
                    _ => PseudoClass::State(lower),
                };
                Some(SimpleSelector::PseudoClass(pc))
            }
            CssToken::Function(name) if !double_colon => {
                self.pos += 1;
                match name.to_ascii_lowercase().as_str() {
                    "not" => {
                        self.skip_ws();
                        let inner = self.compound()?;
                        self.skip_ws();
                        self.expect_rparen()?;
                        Some(SimpleSelector::PseudoClass(PseudoClass::Not(Box::new(inner))))
                    }
                    "nth-child" => {
                        let args = self.function_args()?;
                        let (a, b) = parse_nth(&args)?;
                        Some(SimpleSelector::PseudoClass(PseudoClass::NthChild(a, b)))
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn expect_rparen(&mut self) -> Option<()> {
        (self.peek()? == &CssToken::RParen).then(|| self.pos += 1)
    }

    /// Collect the tokens up to the matching `)` and consume it.
    fn function_args(&mut self) -> Option<Vec<CssToken>> {
        let mut depth = 1;
        let start = self.pos;
        while let Some(tok) = self.peek() {
            match tok {
                CssToken::Function(_) | CssToken::LParen => depth += 1,
                CssToken::RParen => {
                    depth -= 1;
                    if depth == 0 {
                        let args = self.tokens[start..self.pos].to_vec();
                        self.pos += 1;
                        return Some(args);
                    }
                }
                _ => {}
            }
            self.pos += 1;
        }
        None
    }
}

fn pseudo_element(name: &str) -> Option<PseudoElement> {
    Some(match name {
        "before" => PseudoElement::Before,
        "after" => PseudoElement::After,
        "first-line" => PseudoElement::FirstLine,
        "first-letter" => PseudoElement::FirstLetter,
        "selection" => PseudoElement::Selection,
        _ => return None,
    })
}

/// Parse `an+b` from its serialized argument text (`odd`, `even`, `3`,
/// `2n+1`, `-n+3`, …).
fn parse_nth(args: &[CssToken]) -> Option<(i32, i32)> {
    let mut text = String::new();
    let mut prev: Option<&CssToken> = None;
    for tok in args.iter().filter(|t| **t != CssToken::Whitespace) {
        // `2n+1` tokenizes as `2n` `+1`; the sign of `+1` is not kept.
        let unsigned = matches!(tok, CssToken::Number { value, .. } if *value >= 0.0);
        if unsigned && prev.is_some_and(|p| !matches!(p, CssToken::Delim(_))) {
            text.push('+');
        }
        text.push_str(&tok.to_string());
        prev = Some(tok);
    }
    let text = text.to_ascii_lowercase();

    match text.as_str() {
        "odd" => return Some((2, 1)),
        "even" => return Some((2, 0)),
        _ => {}
    }

    let Some(n_at) = text.find('n') else {
        return text.parse().ok().map(|b| (0, b));
    };
    let a = match &text[..n_at] {
        "" | "+" => 1,
        "-" => -1,
        coeff => coeff.parse().ok()?,
    };
    let b = match &text[n_at + 1..] {
        "" => 0,
        rest => rest.strip_prefix('+').unwrap_or(rest).parse().ok()?,
    };
    Some((a, b))
}
