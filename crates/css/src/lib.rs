//! CSS crate: tokenizer, selectors, stylesheet parsing, media queries and
//! the live stylesheet set.

pub mod media;
pub mod parser;
pub mod selector;
pub mod sheets;
pub mod token;

pub use media::{MediaEnv, MediaQueryList};
pub use parser::{
    CssRule, Declaration, ImportRule, MediaRule, StyleRule, Stylesheet, find_declaration,
    parse_declaration_block, parse_inline_style, parse_stylesheet,
};
pub use selector::{
    AttrOp, Combinator, ComplexSelector, CompoundSelector, PseudoClass, PseudoElement,
    SimpleSelector, Specificity, compute_specificity, parse_selector_list,
};
pub use sheets::{RuleRef, SheetEntry, StyleSheetSet};
pub use token::{CssToken, CssTokenizer, serialize_tokens};
