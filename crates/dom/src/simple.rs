//! Simplified JSON form of the page tree.
//!
//! Elements become `{tag, attributes, children}` and text nodes `{content}`.
//! Comments and overlay subtrees are left out. The stable id attribute is
//! written as a number so the editor can compare it against its own ids.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::node::{Attr, NodeData, NodeId, STABLE_ID_ATTR};
use crate::tree::Dom;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SimpleNode {
    Element {
        tag: String,
        #[serde(default)]
        attributes: Map<String, Value>,
        #[serde(default)]
        children: Vec<SimpleNode>,
    },
    Text {
        content: String,
    },
}

#[derive(Debug, Error)]
pub enum SimpleDomError {
    #[error("malformed simple DOM: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document root must be an element")]
    TextRoot,
}

impl Dom {
    /// Serialize the tree rooted at the document element.
    pub fn to_simple(&self) -> Option<SimpleNode> {
        self.document_element().and_then(|root| self.simple_node(root))
    }

    fn simple_node(&self, id: NodeId) -> Option<SimpleNode> {
        let node = self.nodes.get(id)?;
        match &node.data {
            NodeData::Text { data } => Some(SimpleNode::Text {
                content: data.clone(),
            }),
            NodeData::Element(elem) if !node.is_overlay() => {
                let attributes = elem
                    .attrs
                    .iter()
                    .map(|a| {
                        let value = if a.name == STABLE_ID_ATTR {
                            a.value
                                .trim()
                                .parse::<u64>()
                                .map(Value::from)
                                .unwrap_or(Value::Null)
                        } else {
                            Value::String(a.value.clone())
                        };
                        (a.name.clone(), value)
                    })
                    .collect();
                let children = self
                    .children(id)
                    .into_iter()
                    .filter_map(|c| self.simple_node(c))
                    .collect();
                Some(SimpleNode::Element {
                    tag: elem.tag_name.clone(),
                    attributes,
                    children,
                })
            }
            _ => None,
        }
    }

    /// Build a fresh document from its simple form.
    pub fn from_simple(root: &SimpleNode) -> Result<Dom, SimpleDomError> {
        if matches!(root, SimpleNode::Text { .. }) {
            return Err(SimpleDomError::TextRoot);
        }
        let mut dom = Dom::new();
        let document = dom.document();
        dom.build_simple(document, root);
        Ok(dom)
    }

    pub fn from_simple_json(json: &str) -> Result<Dom, SimpleDomError> {
        let root: SimpleNode = serde_json::from_str(json)?;
        Self::from_simple(&root)
    }

    fn build_simple(&mut self, parent: NodeId, node: &SimpleNode) {
        let id = match node {
            SimpleNode::Text { content } => self.create_text(content),
            SimpleNode::Element {
                tag,
                attributes,
                children,
            } => {
                let attrs = attributes
                    .iter()
                    .map(|(name, value)| {
                        let value = match value {
                            Value::String(s) => s.clone(),
                            Value::Null => String::new(),
                            other => other.to_string(),
                        };
                        Attr::new(name.as_str(), value)
                    })
                    .collect();
                let id = self.create_element(tag, attrs);
                for child in children {
                    self.build_simple(id, child);
                }
                id
            }
        };
        self.append_child(parent, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::OVERLAY_CLASS;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn serializes_with_numeric_ids_and_skips_noise() {
        let mut dom = Dom::new();
        let doc = dom.document();
        let html = dom.create_element("html", vec![Attr::new(STABLE_ID_ATTR, "1")]);
        let body = dom.create_element(
            "body",
            vec![Attr::new(STABLE_ID_ATTR, "2"), Attr::new("class", "main")],
        );
        let text = dom.create_text("hello");
        let comment = dom.create_comment("ignored");
        let overlay = dom.create_element("div", vec![Attr::new("class", OVERLAY_CLASS)]);
        dom.append_child(doc, html);
        dom.append_child(html, body);
        dom.append_child(body, text);
        dom.append_child(body, comment);
        dom.append_child(body, overlay);

        let value = serde_json::to_value(dom.to_simple().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "tag": "html",
                "attributes": { "data-live-id": 1 },
                "children": [{
                    "tag": "body",
                    "attributes": { "data-live-id": 2, "class": "main" },
                    "children": [{ "content": "hello" }]
                }]
            })
        );
    }

    #[test]
    fn builds_tree_from_json() {
        let dom = Dom::from_simple_json(
            r#"{"tag":"html","attributes":{"data-live-id":1},"children":[
                {"tag":"body","attributes":{"data-live-id":2},"children":[{"content":"hi"}]}
            ]}"#,
        )
        .unwrap();
        let body = dom.body().unwrap();
        assert_eq!(dom.attribute(body, STABLE_ID_ATTR), Some("2"));
        assert_eq!(dom.text_content(body), "hi");
        assert_eq!(dom.find_by_stable_id(crate::StableId(1)), dom.document_element());
    }

    #[test]
    fn rejects_text_root() {
        assert!(matches!(
            Dom::from_simple_json(r#"{"content":"x"}"#),
            Err(SimpleDomError::TextRoot)
        ));
        assert!(matches!(
            Dom::from_simple_json("{"),
            Err(SimpleDomError::Json(_))
        ));
    }
}
