//! Tree-structured configuration documents.
//!
//! Documents are JSON trees. Paths are dotted (`info.vendor`). Lists decoded
//! from XML collapse to a single object when they hold one element, so
//! [`Document::list_at`] treats an object as a one-element list.

use crate::error::{DriverError, DriverResult};
use serde_json::{Map, Value};
use std::fmt;

/// Operation marker key attached to nodes that must be deleted.
pub const OPERATION_KEY: &str = "@operation";

/// Operation marker value for deletes.
pub const OPERATION_DELETE: &str = "delete";

/// A configuration or response document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document(Value);

impl Document {
    /// Wraps a JSON value.
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns an empty document (`{}`).
    pub fn empty() -> Self {
        Self(Value::Object(Map::new()))
    }

    /// Parses a JSON document.
    pub fn from_json_str(s: &str) -> DriverResult<Self> {
        serde_json::from_str(s)
            .map(Self)
            .map_err(|e| DriverError::document(e.to_string()))
    }

    /// Returns the underlying tree.
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the document, returning the tree.
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Returns the node at `path`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        value_at(&self.0, path)
    }

    /// Returns the leaf at `path` as a string.
    pub fn get_str(&self, path: &str) -> Option<String> {
        str_at(&self.0, path)
    }

    /// Returns the elements of the list at `path`.
    pub fn list_at(&self, path: &str) -> Vec<&Value> {
        list_in(&self.0, path)
    }

    /// Renders the document as pretty-printed JSON.
    pub fn to_pretty_string(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.0.to_string())
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Follows a dotted path through nested objects.
pub fn value_at<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(root);
    }
    path.split('.').try_fold(root, |node, key| node.get(key))
}

/// Reads a leaf as a string; numbers and booleans are rendered.
pub fn str_at(root: &Value, path: &str) -> Option<String> {
    match value_at(root, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Returns the list at `path`; a single object counts as one element.
pub fn list_in<'a>(root: &'a Value, path: &str) -> Vec<&'a Value> {
    match value_at(root, path) {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(node @ Value::Object(_)) => vec![node],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn response() -> Document {
        Document::new(json!({
            "data": {
                "org-openroadm-device": {
                    "info": {"vendor": "acme", "node-number": 7},
                    "roadm-connections": [
                        {"connection-name": "a-to-b"},
                        {"connection-name": "c-to-d"}
                    ]
                }
            }
        }))
    }

    #[test]
    fn test_get_str() {
        let doc = response();
        assert_eq!(
            doc.get_str("data.org-openroadm-device.info.vendor").as_deref(),
            Some("acme")
        );
        assert_eq!(
            doc.get_str("data.org-openroadm-device.info.node-number").as_deref(),
            Some("7")
        );
        assert_eq!(doc.get_str("data.org-openroadm-device.info.model"), None);
    }

    #[test]
    fn test_list_at_array() {
        let doc = response();
        let names: Vec<_> = doc
            .list_at("data.org-openroadm-device.roadm-connections")
            .into_iter()
            .filter_map(|c| str_at(c, "connection-name"))
            .collect();
        assert_eq!(names, vec!["a-to-b", "c-to-d"]);
    }

    #[test]
    fn test_list_at_single_object() {
        let doc = Document::new(json!({"circuit-packs": {"circuit-pack-name": "1/0"}}));
        assert_eq!(doc.list_at("circuit-packs").len(), 1);
        assert!(doc.list_at("missing").is_empty());
    }

    #[test]
    fn test_from_json_str() {
        let doc = Document::from_json_str(r#"{"1": 2}"#).unwrap();
        assert_eq!(doc.get_str("1").as_deref(), Some("2"));
        assert!(Document::from_json_str("{").is_err());
    }
}
