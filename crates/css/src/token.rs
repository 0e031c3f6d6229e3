//! CSS tokenizer.
//!
//! Produces the token stream shared by the selector, declaration and media
//! query parsers. Tokens serialize back to CSS text through `Display`, which
//! is how declaration values and selector text are kept in their source form.

use std::fmt;

/// CSS token types per CSS Syntax Level 3.
#[derive(Debug, Clone, PartialEq)]
pub enum CssToken {
    Ident(String),
    Function(String),
    AtKeyword(String),
    Hash { value: String, is_id: bool },
    String(String),
    Url(String),
    Number { value: f64, is_integer: bool },
    Percentage(f64),
    Dimension { value: f64, unit: String },
    Whitespace,
    Colon,
    Semicolon,
    Comma,
    LBracket,
    RBracket,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Delim(char),
    /// `<!--`
    CDO,
    /// `-->`
    CDC,
    EOF,
}

impl fmt::Display for CssToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CssToken::Ident(s) => f.write_str(s),
            CssToken::Function(name) => write!(f, "{name}("),
            CssToken::AtKeyword(name) => write!(f, "@{name}"),
            CssToken::Hash { value, .. } => write!(f, "#{value}"),
            CssToken::String(s) => write!(f, "\"{}\"", s.replace('"', "\\\"")),
            CssToken::Url(u) => write!(f, "url({u})"),
            CssToken::Number { value, .. } => write!(f, "{value}"),
            CssToken::Percentage(v) => write!(f, "{v}%"),
            CssToken::Dimension { value, unit } => write!(f, "{value}{unit}"),
            CssToken::Whitespace => f.write_str(" "),
            CssToken::Colon => f.write_str(":"),
            CssToken::Semicolon => f.write_str(";"),
            CssToken::Comma => f.write_str(","),
            CssToken::LBracket => f.write_str("["),
            CssToken::RBracket => f.write_str("]"),
            CssToken::LParen => f.write_str("("),
            CssToken::RParen => f.write_str(")"),
            CssToken::LBrace => f.write_str("{"),
            CssToken::RBrace => f.write_str("}"),
            CssToken::Delim(c) => write!(f, "{c}"),
            CssToken::CDO => f.write_str("<!--"),
            CssToken::CDC => f.write_str("-->"),
            CssToken::EOF => Ok(()),
        }
    }
}

/// Serialize a token run back to text, trimming outer whitespace.
pub fn serialize_tokens(tokens: &[CssToken]) -> String {
    let mut out = String::new();
    for token in tokens {
        out.push_str(&token.to_string());
    }
    out.trim().to_string()
}

/// Skip whitespace tokens starting at `pos`, returning the first
/// non-whitespace position.
pub(crate) fn skip_ws(tokens: &[CssToken], mut pos: usize) -> usize {
    while tokens.get(pos) == Some(&CssToken::Whitespace) {
        pos += 1;
    }
    pos
}

/// A CSS tokenizer that processes an input string into a stream of `CssToken`s.
pub struct CssTokenizer {
    input: Vec<char>,
    pos: usize,
}

impl CssTokenizer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            pos: 0,
        }
    }

    /// Tokenize the entire input into a vector of tokens (excluding EOF).
    pub fn tokenize_all(&mut self) -> Vec<CssToken> {
        std::iter::from_fn(|| match self.next_token() {
            CssToken::EOF => None,
            tok => Some(tok),
        })
        .collect()
    }

    /// Consume and return the next token.
    pub fn next_token(&mut self) -> CssToken {
        self.skip_comments();

        let Some(ch) = self.peek() else {
            return CssToken::EOF;
        };

        match ch {
            c if is_whitespace(c) => {
                while self.peek().is_some_and(is_whitespace) {
                    self.pos += 1;
                }
                CssToken::Whitespace
            }
            '"' | '\'' => self.consume_string(ch),
            '#' => {
                self.pos += 1;
                if self.peek().is_some_and(is_name_char) || self.escape_at(self.pos) {
                    let is_id = self.ident_starts_at(self.pos);
                    CssToken::Hash {
                        value: self.consume_name(),
                        is_id,
                    }
                } else {
                    CssToken::Delim('#')
                }
            }
            '+' | '.' if self.number_starts_at(self.pos) => self.consume_numeric(),
            '-' => {
                if self.number_starts_at(self.pos) {
                    self.consume_numeric()
                } else if self.lookahead("-->") {
                    self.pos += 3;
                    CssToken::CDC
                } else if self.ident_starts_at(self.pos) {
                    self.consume_ident_like()
                } else {
                    self.pos += 1;
                    CssToken::Delim('-')
                }
            }
            c if c.is_ascii_digit() => self.consume_numeric(),
            '@' => {
                self.pos += 1;
                if self.ident_starts_at(self.pos) {
                    CssToken::AtKeyword(self.consume_name())
                } else {
                    CssToken::Delim('@')
                }
            }
            '<' if self.lookahead("<!--") => {
                self.pos += 4;
                CssToken::CDO
            }
            c if is_name_start_char(c) || self.escape_at(self.pos) => self.consume_ident_like(),
            _ => {
                self.pos += 1;
                match ch {
                    ':' => CssToken::Colon,
                    ';' => CssToken::Semicolon,
                    ',' => CssToken::Comma,
                    '[' => CssToken::LBracket,
                    ']' => CssToken::RBracket,
                    '(' => CssToken::LParen,
                    ')' => CssToken::RParen,
                    '{' => CssToken::LBrace,
                    '}' => CssToken::RBrace,
                    other => CssToken::Delim(other),
                }
            }
        }
    }

    // --- Helper methods ---

    fn peek(&self) -> Option<char> {
        self.input.get(self.pos).copied()
    }

    fn char_at(&self, idx: usize) -> Option<char> {
        self.input.get(idx).copied()
    }

    fn lookahead(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.char_at(self.pos + i) == Some(c))
    }

    fn skip_comments(&mut self) {
        while self.lookahead("/*") {
            self.pos += 2;
            while self.pos < self.input.len() && !self.lookahead("*/") {
                self.pos += 1;
            }
            self.pos = (self.pos + 2).min(self.input.len());
        }
    }

    fn consume_string(&mut self, quote: char) -> CssToken {
        self.pos += 1;
        let mut value = String::new();
        while let Some(ch) = self.peek() {
            self.pos += 1;
            match ch {
                c if c == quote => break,
                // Unescaped newline ends the string (parse error).
                '\n' => break,
                '\\' => match self.peek() {
                    None => break,
                    Some('\n') => self.pos += 1,
                    Some(_) => value.push(self.consume_escape()),
                },
                c => value.push(c),
            }
        }
        CssToken::String(value)
    }

    /// Consume the escape body following a backslash.
    fn consume_escape(&mut self) -> char {
        let Some(first) = self.peek() else {
            return '\u{FFFD}';
        };
        self.pos += 1;
        if !first.is_ascii_hexdigit() {
            return first;
        }
        let mut code = first.to_digit(16).unwrap_or(0);
        for _ in 0..5 {
            match self.peek().and_then(|c| c.to_digit(16)) {
                Some(d) => {
                    code = code * 16 + d;
                    self.pos += 1;
                }
                None => break,
            }
        }
        if self.peek().is_some_and(is_whitespace) {
            self.pos += 1;
        }
        char::from_u32(code).unwrap_or('\u{FFFD}')
    }

    fn escape_at(&self, idx: usize) -> bool {
        self.char_at(idx) == Some('\\') && self.char_at(idx + 1).is_some_and(|c| c != '\n')
    }

    fn ident_starts_at(&self, idx: usize) -> bool {
        match self.char_at(idx) {
            Some(c) if is_name_start_char(c) => true,
            Some('-') => match self.char_at(idx + 1) {
                Some(c) if is_name_start_char(c) || c == '-' => true,
                Some('\\') => self.escape_at(idx + 1),
                _ => false,
            },
            Some('\\') => self.escape_at(idx),
            _ => false,
        }
    }

    fn number_starts_at(&self, idx: usize) -> bool {
        let digit_at = |i: usize| self.char_at(i).is_some_and(|c| c.is_ascii_digit());
        match self.char_at(idx) {
            Some(c) if c.is_ascii_digit() => true,
            Some('+') | Some('-') => {
                digit_at(idx + 1) || (self.char_at(idx + 1) == Some('.') && digit_at(idx + 2))
            }
            Some('.') => digit_at(idx + 1),
            _ => false,
        }
    }

    fn consume_name(&mut self) -> String {
        let mut name = String::new();
        loop {
            match self.peek() {
                Some(c) if is_name_char(c) => {
                    name.push(c);
                    self.pos += 1;
                }
                Some('\\') if self.escape_at(self.pos) => {
                    self.pos += 1;
                    name.push(self.consume_escape());
                }
                _ => break,
            }
        }
        name
    }

    fn consume_numeric(&mut self) -> CssToken {
        let (value, is_integer) = self.consume_number();
        if self.ident_starts_at(self.pos) {
            let unit = self.consume_name();
            return CssToken::Dimension { value, unit };
        }
        if self.peek() == Some('%') {
            self.pos += 1;
            return CssToken::Percentage(value);
        }
        CssToken::Number { value, is_integer }
    }

    fn consume_number(&mut self) -> (f64, bool) {
        let start = self.pos;
        let mut is_integer = true;
        let digits = |t: &mut Self| {
            while t.peek().is_some_and(|c| c.is_ascii_digit()) {
                t.pos += 1;
            }
        };

        if matches!(self.peek(), Some('+') | Some('-')) {
            self.pos += 1;
        }
        digits(self);

        if self.peek() == Some('.') && self.char_at(self.pos + 1).is_some_and(|c| c.is_ascii_digit()) {
            is_integer = false;
            self.pos += 1;
            digits(self);
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            let sign = matches!(self.char_at(self.pos + 1), Some('+') | Some('-'));
            let digit_idx = self.pos + 1 + usize::from(sign);
            if self.char_at(digit_idx).is_some_and(|c| c.is_ascii_digit()) {
                is_integer = false;
                self.pos = digit_idx;
                digits(self);
            }
        }

        let repr: String = self.input[start..self.pos].iter().collect();
        (repr.parse().unwrap_or(0.0), is_integer)
    }

    fn consume_ident_like(&mut self) -> CssToken {
        let name = self.consume_name();
        if self.peek() != Some('(') {
            return CssToken::Ident(name);
        }
        self.pos += 1;
        if name.eq_ignore_ascii_case("url") {
            return self.consume_url();
        }
        CssToken::Function(name)
    }

    fn consume_url(&mut self) -> CssToken {
        while self.peek().is_some_and(is_whitespace) {
            self.pos += 1;
        }
        // url("...") stays a function token with a string argument.
        if matches!(self.peek(), Some('"') | Some('\'')) {
            return CssToken::Function("url".to_string());
        }

        let mut url = String::new();
        while let Some(ch) = self.peek() {
            match ch {
                ')' => {
                    self.pos += 1;
                    break;
                }
                c if is_whitespace(c) => {
                    while self.peek().is_some_and(is_whitespace) {
                        self.pos += 1;
                    }
                    if self.peek() == Some(')') {
                        self.pos += 1;
                    }
                    break;
                }
                '\\' if self.escape_at(self.pos) => {
                    self.pos += 1;
                    url.push(self.consume_escape());
                }
                c => {
                    url.push(c);
                    self.pos += 1;
                }
            }
        }
        CssToken::Url(url)
    }
}

fn is_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '\x0C')
}

fn is_name_start_char(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_' || !ch.is_ascii()
}

fn is_name_char(ch: char) -> bool {
    is_name_start_char(ch) || ch.is_ascii_digit() || ch == '-'
}
