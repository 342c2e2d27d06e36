//! Assertions over recorded configuration documents.

use roadm_driver_common::document::{OPERATION_DELETE, OPERATION_KEY};
use roadm_driver_common::Document;
use serde_json::Value;

fn is_delete(node: &Value) -> bool {
    node.get(OPERATION_KEY).and_then(Value::as_str) == Some(OPERATION_DELETE)
}

fn collect_deletes(node: &Value, out: &mut Vec<String>) {
    match node {
        Value::Object(map) => {
            if is_delete(node) {
                let name = map
                    .get("connection-name")
                    .or_else(|| map.get("name"))
                    .and_then(Value::as_str);
                if let Some(name) = name {
                    out.push(name.to_string());
                }
            }
            for child in map.values() {
                collect_deletes(child, out);
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_deletes(item, out)),
        _ => {}
    }
}

/// Names of every object the document deletes, in document order.
pub fn deleted_names(doc: &Document) -> Vec<String> {
    let mut names = Vec::new();
    collect_deletes(doc.as_value(), &mut names);
    names
}

/// Names of the interfaces a create document carries.
pub fn created_interfaces(doc: &Document) -> Vec<String> {
    doc.list_at("org-openroadm-device.interface")
        .into_iter()
        .filter(|node| !is_delete(node))
        .filter_map(|node| node.get("name").and_then(Value::as_str))
        .map(str::to_string)
        .collect()
}

/// Name of the connection a create document carries.
pub fn created_connection(doc: &Document) -> Option<String> {
    let node = doc.get("org-openroadm-device.roadm-connections")?;
    if is_delete(node) {
        return None;
    }
    node.get("connection-name")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Whether any document in `docs` deletes something.
pub fn has_deletes(docs: &[Document]) -> bool {
    docs.iter().any(|doc| !deleted_names(doc).is_empty())
}
