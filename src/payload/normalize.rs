//! Structural repair of partner JSON payloads.
//!
//! The partner API converts its XML mechanically, so a plural container such as
//!
//! ```xml
//! <credentials>
//!     <credential><name>a</name></credential>
//!     <credential><name>b</name></credential>
//! </credentials>
//! ```
//!
//! arrives as `{"credentials": [{"credential": {"name": "a"}}, {"credential": {"name": "b"}}]}`.
//! [`normalize`] strips the singular wrapper so callers get
//! `{"credentials": [{"name": "a"}, {"name": "b"}]}`.
//!
//! Only the keys in [`CONTAINER_KEYS`] are containers in the partner schema. Everything
//! else is recursed into when it is a mapping and left alone otherwise.

use serde_json::{Map, Value};
use tracing::debug;

use crate::payload::params::{extract_params_source, is_params_key};

/// Keys (compared lower-cased) whose values are pluralized wrapper lists.
pub const CONTAINER_KEYS: [&str; 5] = ["facets", "credentials", "options", "params", "rules"];

/// Normalizes a payload and returns it.
///
/// Apply it once per raw payload. Unwrapped container elements no longer carry their
/// singular key, so normalizing output that still has container keys drops every element.
///
/// # Examples
///
/// ```
/// use igb_client::payload::normalize;
/// use serde_json::json;
///
/// let raw = json!({"options": [{"option": {"x": 1}}, {"bogus": {}}]});
/// assert_eq!(normalize(raw), json!({"options": [{"x": 1}]}));
/// ```
#[must_use]
pub fn normalize(mut node: Value) -> Value {
    normalize_in_place(&mut node);
    node
}

/// Normalizes a payload in place.
///
/// For a mapping node:
/// - if it has a `params` key, [`extract_params_source`] runs first on the untouched node
///   and its result is merged in
/// - each container key with a non-empty value is unwrapped: every element holding the
///   singular key (container key minus its trailing `s`) is replaced by that key's value,
///   normalized; elements without it are dropped
/// - every other key is normalized recursively
///
/// Non-mapping nodes are left as they are.
pub fn normalize_in_place(node: &mut Value) {
    let Value::Object(map) = node else {
        return;
    };

    let keys: Vec<String> = map.keys().cloned().collect();

    if keys.iter().any(|key| is_params_key(key)) {
        for (key, value) in extract_params_source(map) {
            map.insert(key, value);
        }
    }

    for key in keys {
        let Some(value) = map.get_mut(&key) else {
            continue;
        };

        if is_container_key(&key) {
            if is_falsy(value) {
                continue;
            }
            unwrap_container(value, key.trim_end_matches('s'));
        } else {
            normalize_in_place(value);
        }
    }
}

/// Returns true if `key` is one of the [`CONTAINER_KEYS`], ignoring case.
#[must_use]
pub fn is_container_key(key: &str) -> bool {
    let lower = key.to_lowercase();
    CONTAINER_KEYS.contains(&lower.as_str())
}

fn unwrap_container(value: &mut Value, singular: &str) {
    let items = match std::mem::take(value) {
        Value::Array(items) => items,
        // A lone child may arrive as a bare mapping instead of a one-element list.
        Value::Object(single) => vec![Value::Object(single)],
        scalar => {
            debug!(singular, "container holds a scalar, left as is");
            *value = scalar;
            return;
        }
    };

    let unwrapped = items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(mut element) => match element.remove(singular) {
                Some(inner) => Some(normalize(inner)),
                None => {
                    debug!(singular, "dropping container element without singular key");
                    None
                }
            },
            _ => {
                debug!(singular, "dropping non-mapping container element");
                None
            }
        })
        .collect();

    *value = Value::Array(unwrapped);
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Convenience for callers holding a mapping rather than a [`Value`].
#[must_use]
pub fn normalize_map(map: Map<String, Value>) -> Map<String, Value> {
    match normalize(Value::Object(map)) {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
