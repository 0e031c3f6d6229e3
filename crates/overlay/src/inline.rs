//! Ordered inline style declarations for overlay nodes.

use dom::{Dom, NodeId};
use serde_json::Value;

/// An ordered `style` attribute. Setting an existing property replaces its
/// value in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineStyle {
    decls: Vec<(String, String)>,
}

impl InlineStyle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match self.decls.iter_mut().find(|(n, _)| n == name) {
            Some(existing) => existing.1 = value,
            None => self.decls.push((name.to_string(), value)),
        }
        self
    }

    /// Set a pixel length.
    pub fn px(&mut self, name: &str, value: f32) -> &mut Self {
        self.set(name, px(value))
    }

    /// Merge JSON-valued properties, later ones winning.
    pub fn extend_json<'a>(&mut self, values: impl IntoIterator<Item = (&'a String, &'a Value)>) {
        for (name, value) in values {
            self.set(name, css_value(value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.decls
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn declarations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.decls.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn to_css_text(&self) -> String {
        self.decls
            .iter()
            .map(|(n, v)| format!("{n}: {v};"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Write into `node`'s `style` attribute.
    pub fn apply(&self, dom: &mut Dom, node: NodeId) {
        dom.set_attribute(node, "style", &self.to_css_text());
    }

    /// Read back a `style` attribute written by [`InlineStyle::apply`].
    pub fn read(dom: &Dom, node: NodeId) -> Self {
        let mut style = Self::new();
        for decl in css::parse_inline_style(dom.attribute(node, "style").unwrap_or_default()) {
            style.set(&decl.name, decl.value);
        }
        style
    }
}

/// `12px`, `-3.5px`, `0px`.
pub fn px(value: f32) -> String {
    format!("{value}px")
}

/// A configured style value as CSS text. Numbers print bare.
pub fn css_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
