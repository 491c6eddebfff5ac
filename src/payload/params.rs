//! Recovery of parameter source bindings from a flat `params` list.
//!
//! The partner sends parameter declarations and their sources side by side:
//!
//! ```json
//! {
//!     "name": "\\IGB\\Property\\Custom\\Doelsite\\Vdab\\Sjabloon",
//!     "params": [
//!         {"param": "credentials"},
//!         {"param": "term1"},
//!         {"param": "term2"},
//!         {"term1": {"field": "title"}},
//!         {"term2": {"facet": "IGB_Competenties"}}
//!     ]
//! }
//! ```
//!
//! Normalizing `params` keeps only the declarations, so the bindings have to be read out
//! first. The result for the payload above is
//! `{"params_source": {"term1": {"field": "title"}, "term2": {"facet": "IGB_Competenties"}}}`.

use std::collections::HashSet;

use serde_json::{Map, Value};

/// Key under which the recovered bindings are merged into the payload.
pub const PARAMS_SOURCE_KEY: &str = "params_source";

/// Container key holding declarations and bindings, compared lower-cased.
pub(crate) const PARAMS_KEY: &str = "params";

/// Returns true if `key` names the `params` container, ignoring case.
pub(crate) fn is_params_key(key: &str) -> bool {
    key.to_lowercase() == PARAMS_KEY
}

/// Extracts `params_source` from a node holding a `params` list.
///
/// The `params` key is matched ignoring case, like every container key. Declarations are
/// read under its singular in the same case, so `Params` declares with `Param`.
///
/// Returns a mapping with the single key [`PARAMS_SOURCE_KEY`] when at least one
/// declared parameter has a binding, an empty mapping otherwise, so merging the result is
/// always safe.
///
/// When several entries bind the same name the last one wins. An entry whose keys match
/// more than one declared name cannot occur in well-formed payloads; the first matching
/// key in entry order is used.
///
/// # Examples
///
/// ```
/// use igb_client::payload::extract_params_source;
/// use serde_json::json;
///
/// let node = json!({"params": [{"param": "term"}, {"term": {"field": "title"}}]});
/// let extra = extract_params_source(node.as_object().unwrap());
///
/// assert_eq!(extra["params_source"], json!({"term": {"field": "title"}}));
/// ```
#[must_use]
pub fn extract_params_source(node: &Map<String, Value>) -> Map<String, Value> {
    let Some((key, Value::Array(params))) = node.iter().find(|(key, _)| is_params_key(key)) else {
        return Map::new();
    };

    // Declarations sit under the singular of the container key, as unwrapping expects.
    let declaration_key = key.trim_end_matches('s');
    let declared: HashSet<&str> =
        params.iter().filter_map(|entry| entry.get(declaration_key)?.as_str()).collect();

    let mut sources = Map::new();
    for entry in params.iter().filter_map(Value::as_object) {
        let binding = entry.iter().find(|(name, _)| declared.contains(name.as_str()));
        if let Some((name, source)) = binding {
            sources.insert(name.clone(), source.clone());
        }
    }

    let mut extra = Map::new();
    if !sources.is_empty() {
        extra.insert(PARAMS_SOURCE_KEY.to_owned(), Value::Object(sources));
    }
    extra
}
