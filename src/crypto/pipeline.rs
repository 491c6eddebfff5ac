//! Credential encryption under the storage and transport keys.
//!
//! Two independent keys are in play:
//!
//! - the **storage key** protects credential values held by the calling application
//!   ([`encrypt_credentials`](CredentialCipher::encrypt_credentials) /
//!   [`decrypt_credentials`](CredentialCipher::decrypt_credentials))
//! - the **transport key** protects values on their way to the partner
//!   ([`transport_credentials`](CredentialCipher::transport_credentials))
//!
//! No transform mixes the two. Every transform returns a new value and leaves its argument
//! untouched, so the caller's plaintext object survives a submission.
//!
//! Stored values are sealed as `encrypt(storage, base64(plaintext))`; decryption opens the
//! envelope and decodes the base64 again.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde_json::{Map, Value};
use tracing::instrument;

use crate::{
    config::IgbConfig,
    crypto::Cipher,
    error::{IgbError, Result},
    model::{CredentialMap, CredentialValues},
};

/// Applies the storage and transport ciphers to credential submissions.
#[derive(Debug, Clone)]
pub struct CredentialCipher {
    storage: Cipher,
    transport: Cipher,
}

impl CredentialCipher {
    /// Creates the pipeline from the two base64 keys.
    ///
    /// # Errors
    ///
    /// Returns [`IgbError::Authentication`] if either key is malformed.
    pub fn new(storage_key: &str, transport_key: &str) -> Result<Self> {
        Ok(Self { storage: Cipher::new(storage_key)?, transport: Cipher::new(transport_key)? })
    }

    /// Creates the pipeline from a client configuration.
    ///
    /// # Errors
    ///
    /// Returns [`IgbError::Authentication`] if either configured key is malformed.
    pub fn from_config(config: &IgbConfig) -> Result<Self> {
        Self::new(&config.storage_key, &config.transport_key)
    }

    /// Cipher bound to the storage key.
    #[must_use]
    pub fn storage(&self) -> &Cipher {
        &self.storage
    }

    /// Cipher bound to the transport key.
    #[must_use]
    pub fn transport(&self) -> &Cipher {
        &self.transport
    }

    /// Seals every credential value under the storage key.
    ///
    /// # Errors
    ///
    /// Returns error if encryption fails.
    #[instrument(skip_all)]
    pub fn encrypt_credentials<C: CredentialValues>(&self, credential: &C) -> Result<C> {
        credential.map_values(|value| self.storage.encrypt(&STANDARD.encode(value)))
    }

    /// Opens every credential value sealed by
    /// [`encrypt_credentials`](Self::encrypt_credentials).
    ///
    /// # Errors
    ///
    /// - [`IgbError::Authentication`] if a value was not sealed under the storage key
    /// - [`IgbError::Decode`] if an opened value is not base64 encoded text
    #[instrument(skip_all)]
    pub fn decrypt_credentials<C: CredentialValues>(&self, credential: &C) -> Result<C> {
        credential.map_values(|value| {
            let envelope = self.storage.decrypt(value)?;
            let bytes = STANDARD
                .decode(envelope)
                .map_err(|e| IgbError::Decode(format!("stored value is not base64: {e}")))?;
            String::from_utf8(bytes).map_err(|e| IgbError::Decode(e.to_string()))
        })
    }

    /// Seals every credential value under the transport key, ready for the wire.
    ///
    /// For an [`OfccpCredential`](crate::model::OfccpCredential) the ATS child and each
    /// contract child are transported individually.
    ///
    /// # Errors
    ///
    /// Returns error if encryption fails.
    #[instrument(skip_all)]
    pub fn transport_credentials<C: CredentialValues>(&self, credential: &C) -> Result<C> {
        credential.map_values(|value| self.transport.encrypt(value))
    }

    /// Seals a loose credential mapping under the transport key, as JSON request params.
    ///
    /// # Errors
    ///
    /// Returns error if encryption fails.
    pub fn transport_params(&self, credentials: &CredentialMap) -> Result<Map<String, Value>> {
        credentials
            .iter()
            .map(|(name, value)| Ok((name.clone(), Value::String(self.transport.encrypt(value)?))))
            .collect()
    }
}
