//! Display order of articles.
//!
//! The stored list is edited by hand from the admin page while articles come
//! and go, so reads reconcile it against the live article ids.

use std::collections::HashSet;

use serde_json::Value;

/// Usable ids from a submitted `order` array: empty values dropped,
/// duplicates removed (first occurrence kept).
pub fn clean_order(items: &[Value]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
            _ => None,
        })
        .filter(|id| seen.insert(id.clone()))
        .collect()
}

/// Stored ids still present among `live`, in stored order, followed by live
/// ids the stored order does not mention yet, in live order.
pub fn reconcile(stored: &[String], live: &[String]) -> Vec<String> {
    let live_set: HashSet<&str> = live.iter().map(String::as_str).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut order = Vec::with_capacity(live.len());

    for id in stored {
        if live_set.contains(id.as_str()) && seen.insert(id.as_str()) {
            order.push(id.clone());
        }
    }
    for id in live {
        if seen.insert(id.as_str()) {
            order.push(id.clone());
        }
    }
    order
}

/// The `order` array of a stored ordering document.
pub fn stored_order(doc: &Value) -> Vec<String> {
    doc.get("order")
        .and_then(Value::as_array)
        .map(|items| clean_order(items))
        .unwrap_or_default()
}
