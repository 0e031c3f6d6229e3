//! Character reference decoding for attribute values and inserted text.
//!
//! The value is parsed as an HTML fragment in body context and its text
//! content read back, so the full named-reference table applies, including
//! the legacy forms without a trailing semicolon. Markup inside the value
//! does not survive; only its text does.

use scraper::Html;

/// Decode the character references in `input`.
pub fn decode_entities(input: &str) -> String {
    if !input.contains(['&', '<', '\r', '\0']) {
        return input.to_string();
    }
    Html::parse_fragment(input).root_element().text().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_references() {
        assert_eq!(decode_entities("a &amp; b &lt;i&gt;"), "a & b <i>");
        assert_eq!(decode_entities("&quot;hi&apos;"), "\"hi'");
        assert_eq!(decode_entities("x&nbsp;y"), "x\u{00A0}y");
    }

    #[test]
    fn full_table_applies() {
        assert_eq!(decode_entities("caf&eacute;"), "café");
        assert_eq!(decode_entities("&hearts; &larr;"), "\u{2665} \u{2190}");
    }

    #[test]
    fn legacy_references_without_semicolon() {
        assert_eq!(decode_entities("AT&amp;T &copy 2024"), "AT&T \u{00A9} 2024");
        assert_eq!(decode_entities("caf&eacute"), "café");
    }

    #[test]
    fn numeric_references() {
        assert_eq!(decode_entities("&#65;&#x42;&#X43;"), "ABC");
        assert_eq!(decode_entities("&#0;"), "\u{FFFD}");
        assert_eq!(decode_entities("&#x110000;"), "\u{FFFD}");
    }

    #[test]
    fn unknown_references_pass_through() {
        assert_eq!(decode_entities("&bogus; & x"), "&bogus; & x");
        assert_eq!(decode_entities("fish & chips"), "fish & chips");
    }

    #[test]
    fn markup_keeps_only_its_text() {
        assert_eq!(decode_entities("<b>bold</b> &amp; plain"), "bold & plain");
    }
}
