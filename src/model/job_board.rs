//! Job board value objects.
//!
//! A [`JobBoard`] is built from a decoded partner response and never changes afterwards.
//! Its `klass` (the partner's `class` attribute) is the stable key.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{IgbError, Result};

/// A job board offered by the partner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobBoard {
    /// Display name.
    pub name: String,
    /// Partner class name, unique per board.
    #[serde(rename = "class")]
    pub klass: String,
    /// Free-form posting instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    /// Compliance statement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compliance: Option<String>,
    /// Logo URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    /// Classification tree, as normalized.
    #[serde(default = "empty_list")]
    pub classifications: Value,
    /// MOC section, as normalized.
    #[serde(default = "empty_map")]
    pub moc: Value,
    /// OFCCP section (credential requirements), as normalized.
    #[serde(default = "empty_map")]
    pub ofccp: Value,
    /// Board options, as normalized.
    #[serde(default = "empty_list")]
    pub options: Value,
    /// Selectable facets, as normalized.
    #[serde(default = "empty_list")]
    pub facets: Value,
}

fn empty_list() -> Value {
    Value::Array(Vec::new())
}

fn empty_map() -> Value {
    Value::Object(Map::new())
}

impl JobBoard {
    /// Creates a board with only its identity set.
    #[must_use]
    pub fn new(name: impl Into<String>, klass: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            klass: klass.into(),
            instructions: None,
            compliance: None,
            logo: None,
            classifications: empty_list(),
            moc: empty_map(),
            ofccp: empty_map(),
            options: empty_list(),
            facets: empty_list(),
        }
    }

    /// Primary key of the board.
    #[must_use]
    pub fn pk(&self) -> &str {
        &self.klass
    }

    /// Builds a board from one entry of the job board listing.
    ///
    /// Only identity and logo are present in listings.
    #[must_use]
    pub fn from_listing(entry: &Map<String, Value>) -> Self {
        let mut board = Self::new(
            string_field(entry, "name").unwrap_or_default(),
            string_field(entry, "class").unwrap_or_default(),
        );
        board.logo = string_field(entry, "logo");
        board
    }

    /// Builds a board from an already normalized detail payload.
    #[must_use]
    pub fn from_detail(detail: &Map<String, Value>) -> Self {
        let mut board = Self::new(
            string_field(detail, "name").unwrap_or_default(),
            string_field(detail, "class").unwrap_or_default(),
        );
        board.instructions = string_field(detail, "instructions");
        board.compliance = string_field(detail, "compliance");
        board.logo = string_field(detail, "logo");
        board.classifications = present_or(detail, "classifications", empty_list);
        board.moc = present_or(detail, "MOC", empty_map);
        board.ofccp = present_or(detail, "OFCCP", empty_map);
        board.options = present_or(detail, "options", empty_list);
        board.facets = present_or(detail, "facets", empty_list);
        board
    }
}

impl fmt::Display for JobBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.klass)
    }
}

/// One selectable option of a board facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardFacet {
    /// Value submitted back to the partner.
    pub key: String,
    /// Human readable label.
    pub label: String,
}

impl BoardFacet {
    /// Reads a facet option from a normalized `options` entry.
    ///
    /// # Errors
    ///
    /// Returns [`IgbError::SchemaMismatch`] if the entry is not a mapping or lacks
    /// `key` or `label`.
    pub fn from_option(option: &Value) -> Result<Self> {
        let map = option.as_object().ok_or_else(|| {
            IgbError::SchemaMismatch(format!("facet option is not a mapping: {option}"))
        })?;

        let key = string_field(map, "key")
            .ok_or_else(|| IgbError::SchemaMismatch("facet option lacks 'key'".to_owned()))?;
        let label = string_field(map, "label")
            .ok_or_else(|| IgbError::SchemaMismatch("facet option lacks 'label'".to_owned()))?;

        Ok(Self { key, label })
    }
}

/// Reads a scalar field as text. XML-derived payloads may carry numbers where text is meant.
fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn present_or(map: &Map<String, Value>, key: &str, default: fn() -> Value) -> Value {
    match map.get(key) {
        Some(Value::Null) | None => default(),
        Some(value) => value.clone(),
    }
}
