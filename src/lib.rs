//! IGB partner API client.
//!
//! A client-side adapter for the IGB partner API that keeps job board credentials safe and
//! turns the partner's XML-derived JSON into something usable.
//!
//! # Overview
//!
//! - [`crypto`]: AES-GCM sealing of credential values under independent storage and
//!   transport keys
//! - [`payload`]: normalization of partner payloads, unwrapping `facets`, `credentials`,
//!   `options`, `params` and `rules` containers and recovering `params_source`
//! - [`model`]: job boards and the three credential submission shapes, with their canonical
//!   dictionary projection
//! - [`xml`]: rendering of canonical dictionaries under `OFCCP` or `MyContract`
//! - [`client`]: the partner API operations over a pluggable [`transport::HttpSession`]
//!
//! All operations are synchronous and hold no process-wide state.
//!
//! # Examples
//!
//! ```
//! use igb_client::{
//!     crypto::CredentialCipher,
//!     model::{ContractCredential, CredentialDocument, CredentialMap, JobBoard},
//! };
//!
//! # fn example() -> igb_client::Result<()> {
//! let cipher = CredentialCipher::new(
//!     "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=",
//!     "AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE=",
//! )?;
//!
//! let mut credentials = CredentialMap::new();
//! credentials.insert("password".to_owned(), "hunter2".to_owned());
//! let contract = ContractCredential::new(JobBoard::new("Indeed", "indeed"), credentials);
//!
//! // Sealed for storage, then opened again.
//! let stored = cipher.encrypt_credentials(&contract)?;
//! assert_eq!(cipher.decrypt_credentials(&stored)?, contract);
//!
//! // Sealed for the partner and rendered.
//! let xml = cipher.transport_credentials(&contract)?.to_xml()?;
//! assert!(xml.contains("<MyContract>"));
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest and aes-gcm"
)]

pub mod client;
pub mod config;
pub mod crypto;
pub mod error;
pub mod model;
pub mod payload;
pub mod transport;
pub mod xml;

pub use client::IgbClient;
pub use config::IgbConfig;
pub use error::{IgbError, Result};
