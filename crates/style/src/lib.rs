//! # Style Engine
//!
//! Selector matching, selector queries and cascade resolution over the live
//! stylesheet set.

pub mod cascade;
pub mod matching;
pub mod query;

pub use cascade::{CascadeMatch, MatchedRule, accepted_value, matched_rules};
pub use matching::{matches_any, matches_compound, matches_selector};
pub use query::{query_selector_all, select};
