//! Rendering of canonical documents into the partner's XML dialect.
//!
//! The dialect is fixed:
//! - the document is wrapped in a single root element (`OFCCP` or `MyContract`)
//! - mapping keys become child elements, in document order
//! - items of a `credentials` list are `<credential>`, items of a `jobboards` list are
//!   `<jobboard>`, any other list item is `<item>`
//! - no attributes are ever written, in particular no type hints
//!
//! # Examples
//!
//! ```
//! use igb_client::xml::render;
//! use serde_json::json;
//!
//! # fn example() -> igb_client::Result<()> {
//! let doc = json!({"jobboards": [{"class": "indeed"}]});
//! let xml = render("MyContract", &doc)?;
//! assert!(xml.ends_with(
//!     "<MyContract><jobboards><jobboard><class>indeed</class></jobboard></jobboards></MyContract>"
//! ));
//! # Ok(())
//! # }
//! ```

use std::io::Write;

use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use serde_json::Value;

use crate::error::{IgbError, Result};

/// Tag used for list items whose parent has no dedicated item name.
pub const DEFAULT_ITEM_TAG: &str = "item";

/// Returns the element name for items of the list stored under `parent`.
#[must_use]
pub fn item_tag(parent: &str) -> &'static str {
    match parent {
        "credentials" => "credential",
        "jobboards" => "jobboard",
        _ => DEFAULT_ITEM_TAG,
    }
}

/// Renders `doc` under a `root` element, preceded by an XML declaration.
///
/// # Errors
///
/// Returns [`IgbError::Xml`] if `root` or a mapping key is not a valid element name.
pub fn render(root: &str, doc: &Value) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    write_element(&mut writer, root, doc)?;

    String::from_utf8(writer.into_inner()).map_err(|e| IgbError::Xml(e.to_string()))
}

fn write_element<W: Write>(writer: &mut Writer<W>, name: &str, value: &Value) -> Result<()> {
    validate_name(name)?;
    writer.write_event(Event::Start(BytesStart::new(name)))?;

    match value {
        Value::Object(map) => {
            for (key, child) in map {
                write_element(writer, key, child)?;
            }
        }
        Value::Array(items) => {
            let tag = item_tag(name);
            for item in items {
                write_element(writer, tag, item)?;
            }
        }
        Value::String(text) => write_text(writer, text)?,
        Value::Number(n) => write_text(writer, &n.to_string())?,
        Value::Bool(b) => write_text(writer, if *b { "true" } else { "false" })?,
        Value::Null => {}
    }

    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn write_text<W: Write>(writer: &mut Writer<W>, text: &str) -> Result<()> {
    if !text.is_empty() {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    Ok(())
}

fn validate_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars.next().is_some_and(|c| c.is_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid_start && valid_rest && !name.to_ascii_lowercase().starts_with("xml") {
        Ok(())
    } else {
        Err(IgbError::Xml(format!("invalid element name: {name:?}")))
    }
}
