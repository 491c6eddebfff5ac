//! Deep merge of canonical credential documents.
//!
//! Merge policy, applied key by key:
//! - list + list: the incoming items are appended
//! - mapping + mapping: merged recursively
//! - anything else: the incoming value replaces the existing one

use serde_json::Value;

/// Merges `incoming` into `base` in place.
///
/// # Examples
///
/// ```
/// use igb_client::model::deep_merge;
/// use serde_json::json;
///
/// let mut doc = json!({"company": {"id": "1"}, "jobboards": [{"class": "a"}]});
/// deep_merge(&mut doc, json!({"company": {"name": "ACME"}, "jobboards": [{"class": "b"}]}));
///
/// assert_eq!(
///     doc,
///     json!({
///         "company": {"id": "1", "name": "ACME"},
///         "jobboards": [{"class": "a"}, {"class": "b"}]
///     })
/// );
/// ```
pub fn deep_merge(base: &mut Value, incoming: Value) {
    match (base, incoming) {
        (Value::Object(base), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match base.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (Value::Array(base), Value::Array(incoming)) => base.extend(incoming),
        (slot, incoming) => *slot = incoming,
    }
}
