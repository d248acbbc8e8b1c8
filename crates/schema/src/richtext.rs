//! Richtext document trees.
//!
//! The CMS stores formatted long-form text as a tree of nodes: `doc` → `paragraph` → `text`
//! spans with optional `marks`. Only `type` and `content` have schema meaning; every other
//! attribute (`text`, `attrs`, `marks`, ...) is carried through untouched.

use crate::error::{child_path, ViolationKind};
use crate::fields::Context;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One node of a richtext tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RichtextNode {
    #[serde(rename = "type")]
    pub node_type: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<RichtextNode>,

    /// Untyped attributes carried alongside the node.
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl RichtextNode {
    /// An empty `doc` node.
    pub fn empty_doc() -> Self {
        Self {
            node_type: "doc".into(),
            content: Vec::new(),
            attributes: Map::new(),
        }
    }

    /// The `text` attribute of a text span, if any.
    pub fn text(&self) -> Option<&str> {
        self.attributes.get("text").and_then(Value::as_str)
    }

    /// Concatenated text of every span in document order.
    ///
    /// Block-level children are separated by a single newline.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out.trim_end_matches('\n').to_string()
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(text) = self.text() {
            out.push_str(text);
        }
        for child in &self.content {
            child.collect_text(out);
        }
        if matches!(self.node_type.as_str(), "paragraph" | "heading" | "list_item") {
            out.push('\n');
        }
    }

    /// Returns true if any span in the tree has non-whitespace text.
    pub fn has_text(&self) -> bool {
        self.text().is_some_and(|t| !t.trim().is_empty())
            || self.content.iter().any(RichtextNode::has_text)
    }

    /// Validates a raw node, reporting problems at `path` and below.
    ///
    /// Returns `None` only when the value at `path` itself is not a node.
    pub(crate) fn from_value(cx: &mut Context, value: &Value, path: &str) -> Option<Self> {
        let Some(map) = value.as_object() else {
            cx.report(path, ViolationKind::WrongType { expected: "richtext object" });
            return None;
        };

        let node_type = match map.get("type") {
            Some(Value::String(t)) => t.clone(),
            Some(_) => {
                cx.report(
                    child_path(path, "type"),
                    ViolationKind::WrongType { expected: "string" },
                );
                String::new()
            }
            None => {
                cx.report(child_path(path, "type"), ViolationKind::Missing);
                String::new()
            }
        };

        let content_path = child_path(path, "content");
        let content = match map.get("content") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(children)) => children
                .iter()
                .enumerate()
                .filter_map(|(i, child)| {
                    RichtextNode::from_value(cx, child, &child_path(&content_path, &i.to_string()))
                })
                .collect(),
            Some(_) => {
                cx.report(content_path, ViolationKind::WrongType { expected: "array" });
                Vec::new()
            }
        };

        let attributes = map
            .iter()
            .filter(|(k, _)| k.as_str() != "type" && k.as_str() != "content")
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Some(Self {
            node_type,
            content,
            attributes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn disclaimer() -> Value {
        json!({
            "type": "doc",
            "content": [
                {
                    "type": "paragraph",
                    "content": [
                        { "type": "text", "text": "Forward-looking statements " },
                        { "type": "text", "text": "involve risk.", "marks": [{ "type": "bold" }] }
                    ]
                },
                { "type": "paragraph", "content": [{ "type": "text", "text": "Second." }] }
            ]
        })
    }

    #[test]
    fn parses_nested_tree_and_keeps_attributes() {
        let mut cx = Context::new();
        let node = RichtextNode::from_value(&mut cx, &disclaimer(), "legal").expect("node");
        assert!(cx.finish(()).is_ok());

        assert_eq!(node.node_type, "doc");
        assert_eq!(node.content.len(), 2);
        let bold = &node.content[0].content[1];
        assert_eq!(bold.text(), Some("involve risk."));
        assert_eq!(bold.attributes["marks"], json!([{ "type": "bold" }]));
    }

    #[test]
    fn plain_text_joins_paragraphs() {
        let mut cx = Context::new();
        let node = RichtextNode::from_value(&mut cx, &disclaimer(), "legal").expect("node");
        assert_eq!(
            node.plain_text(),
            "Forward-looking statements involve risk.\nSecond."
        );
    }

    #[test]
    fn serialises_back_to_the_same_shape() {
        let mut cx = Context::new();
        let node = RichtextNode::from_value(&mut cx, &disclaimer(), "legal").expect("node");
        assert_eq!(serde_json::to_value(&node).expect("serialise"), disclaimer());
    }

    #[test]
    fn empty_doc_has_no_text() {
        let value = json!({ "type": "doc", "content": [{ "type": "paragraph" }] });
        let mut cx = Context::new();
        let node = RichtextNode::from_value(&mut cx, &value, "legal").expect("node");
        assert!(!node.has_text());
    }

    #[test]
    fn reports_malformed_children_by_path() {
        let value = json!({
            "type": "doc",
            "content": [{ "content": [] }, "not a node"]
        });
        let mut cx = Context::new();
        RichtextNode::from_value(&mut cx, &value, "legal").expect("root is a node");
        let errors = cx.finish(()).expect_err("should fail");
        let errors = errors.errors().expect("field errors");

        assert_eq!(errors.at("legal.content.0.type").count(), 1);
        assert_eq!(errors.at("legal.content.1").count(), 1);
    }
}
