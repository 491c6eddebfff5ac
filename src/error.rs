//! Error types for the IGB client.
//!
//! Every fallible operation in this crate returns [`Result`], whose error type is
//! [`IgbError`]. The variants are distinct so callers can tell a rejected request apart
//! from a tampered ciphertext or a malformed payload.
//!
//! # Error Categories
//!
//! - **Transport** ([`IgbError::Transport`], [`IgbError::Http`]): the partner API call failed
//! - **Cryptographic** ([`IgbError::Authentication`], [`IgbError::Decode`]): a credential
//!   value could not be decrypted
//! - **Schema** ([`IgbError::SchemaMismatch`]): data does not have the shape the partner
//!   schema requires
//! - **Local** ([`IgbError::Serialization`], [`IgbError::Xml`], [`IgbError::Config`])
//!
//! None of these are retried inside the crate.
//!
//! # Examples
//!
//! ```
//! use igb_client::error::{IgbError, Result};
//!
//! fn require_class(klass: &str) -> Result<&str> {
//!     if klass.is_empty() {
//!         return Err(IgbError::SchemaMismatch("job board class is empty".to_owned()));
//!     }
//!     Ok(klass)
//! }
//!
//! assert!(require_class("indeed").is_ok());
//! assert!(require_class("").is_err());
//! ```

use thiserror::Error;

/// Result type alias for IGB client operations.
pub type Result<T> = std::result::Result<T, IgbError>;

/// Errors that can occur while talking to the IGB partner API.
#[must_use = "errors should be handled, propagated, or explicitly panicked"]
#[derive(Debug, Error)]
pub enum IgbError {
    /// The partner API answered with a non-success status.
    ///
    /// # Recovery
    ///
    /// Inspect `status`. A 4xx usually means the submitted document or the api key was
    /// rejected; a 5xx is on the partner side. The client never retries on its own.
    #[error("partner API returned status {status}")]
    Transport {
        /// HTTP status code of the failed response.
        status: u16,
    },

    /// The HTTP request could not be completed at all.
    ///
    /// Wraps [`reqwest::Error`]: DNS failures, refused connections, TLS errors and timeouts.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// AEAD tag verification failed, or the key material is unusable.
    ///
    /// Common causes:
    /// - ciphertext produced with the transport key but opened with the storage key
    /// - corrupted or truncated ciphertext
    /// - key is not valid base64 or not 16, 24 or 32 bytes long
    ///
    /// # Recovery
    ///
    /// Not recoverable for the current value. Check which key the value was sealed with.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// Decrypted bytes are not valid text.
    ///
    /// The tag verified, so this is not tampering: the value was encrypted from something
    /// that was never UTF-8, which points at a bug in whatever produced it.
    #[error("decrypted value is not valid text: {0}")]
    Decode(String),

    /// Data does not match the partner schema.
    ///
    /// Raised for fields the partner document cannot do without, such as an empty job
    /// board class on a contract credential, or a response missing its `HAPI` envelope.
    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    /// JSON (de)serialization failed.
    #[error("JSON serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// XML rendering failed.
    #[error("XML rendering failed: {0}")]
    Xml(String),

    /// Configuration is invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use igb_client::error::IgbError;
    ///
    /// let err = IgbError::Config("base_url must use HTTPS".to_owned());
    /// assert!(err.to_string().contains("invalid configuration"));
    /// ```
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl IgbError {
    /// Returns the HTTP status for [`IgbError::Transport`], `None` otherwise.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status } => Some(*status),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for IgbError {
    fn from(err: quick_xml::Error) -> Self {
        Self::Xml(err.to_string())
    }
}
