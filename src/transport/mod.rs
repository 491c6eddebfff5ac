//! HTTP collaborator contract.
//!
//! The client only needs two calls from its HTTP layer, a GET and a POST, both
//! answering with a status and a body. [`HttpSession`] captures exactly that, so tests and
//! embedding applications can provide their own session. [`CachedSession`] is the default
//! implementation over a blocking `reqwest` client with a response cache.
//!
//! # Examples
//!
//! ```
//! use igb_client::transport::{HttpResponse, HttpSession, RequestBody};
//!
//! #[derive(Debug)]
//! struct Offline;
//!
//! impl HttpSession for Offline {
//!     fn get(&self, _url: &str) -> igb_client::Result<HttpResponse> {
//!         Ok(HttpResponse::new(200, r#"{"HAPI": {"jobboards": []}}"#))
//!     }
//!
//!     fn post(&self, _url: &str, _body: &RequestBody) -> igb_client::Result<HttpResponse> {
//!         Ok(HttpResponse::new(204, ""))
//!     }
//! }
//!
//! let response = Offline.get("https://example.com/").unwrap();
//! assert!(response.is_ok());
//! ```

use serde_json::Value;

use crate::error::{IgbError, Result};

pub mod cached;

pub use cached::CachedSession;

/// Content type of XML submissions.
pub const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

/// Content type of JSON requests.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Minimal HTTP session the client runs on.
///
/// Implementations attach whatever authentication the partner needs and may cache
/// responses. They must not retry on their own.
pub trait HttpSession: Send + Sync {
    /// Executes a GET request.
    ///
    /// # Errors
    ///
    /// Returns error only if no response was obtained. Non-success statuses are returned
    /// as a normal [`HttpResponse`].
    fn get(&self, url: &str) -> Result<HttpResponse>;

    /// Executes a POST request with `body`.
    ///
    /// # Errors
    ///
    /// Returns error only if no response was obtained.
    fn post(&self, url: &str, body: &RequestBody) -> Result<HttpResponse>;
}

/// Body of a POST request.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// JSON document.
    Json(Value),
    /// UTF-8 XML document.
    Xml(String),
}

impl RequestBody {
    /// Value of the `Content-Type` header for this body.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json(_) => JSON_CONTENT_TYPE,
            Self::Xml(_) => XML_CONTENT_TYPE,
        }
    }

    /// Encodes the body for the wire.
    ///
    /// # Errors
    ///
    /// Returns [`IgbError::Serialization`] if the JSON cannot be encoded.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::Json(value) => Ok(serde_json::to_vec(value)?),
            Self::Xml(xml) => Ok(xml.as_bytes().to_vec()),
        }
    }
}

/// Response from an [`HttpSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, body: body.into() }
    }

    /// True for 2xx statuses.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Turns a non-success response into [`IgbError::Transport`].
    ///
    /// # Errors
    ///
    /// Returns [`IgbError::Transport`] carrying the status if it is not 2xx.
    pub fn error_for_status(self) -> Result<Self> {
        if self.is_ok() { Ok(self) } else { Err(IgbError::Transport { status: self.status }) }
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`IgbError::Serialization`] if the body is not JSON.
    pub fn json(&self) -> Result<Value> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Body as text, with invalid UTF-8 replaced.
    #[must_use]
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
