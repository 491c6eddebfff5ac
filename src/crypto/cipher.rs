//! AES-GCM encryption of single credential values.
//!
//! The partner expects every credential value as
//! `base64(nonce || ciphertext || tag)` with a 16-byte nonce and a 16-byte tag. A 16-byte
//! GCM nonce is unusual (96 bits is the norm) but it is the framing every stored value
//! already uses, so it must not change.
//!
//! # Examples
//!
//! ```
//! use igb_client::crypto::Cipher;
//!
//! # fn example() -> igb_client::Result<()> {
//! let key = Cipher::generate_key();
//! let cipher = Cipher::new(&key)?;
//!
//! let sealed = cipher.encrypt("s3cret")?;
//! assert_eq!(cipher.decrypt(&sealed)?, "s3cret");
//! # Ok(())
//! # }
//! ```

use std::fmt;

use aes_gcm::{
    AesGcm, Nonce,
    aead::{Aead, AeadCore, KeyInit, OsRng, consts::U16},
    aes::{Aes128, Aes192, Aes256},
};
use base64::{Engine, engine::general_purpose::STANDARD};

use crate::error::{IgbError, Result};

/// Nonce length in bytes, prepended to every ciphertext.
pub const NONCE_SIZE: usize = 16;

/// Authentication tag length in bytes, appended to every ciphertext.
pub const TAG_SIZE: usize = 16;

type Aes128Gcm16 = AesGcm<Aes128, U16>;
type Aes192Gcm16 = AesGcm<Aes192, U16>;
type Aes256Gcm16 = AesGcm<Aes256, U16>;

#[derive(Clone)]
enum GcmCipher {
    Aes128(Aes128Gcm16),
    Aes192(Aes192Gcm16),
    Aes256(Aes256Gcm16),
}

/// AES-GCM cipher bound to one key.
///
/// The key size picks the AES variant: 16, 24 or 32 bytes. Apart from the key the
/// cipher is stateless, so one instance can seal any number of values.
#[derive(Clone)]
pub struct Cipher {
    inner: GcmCipher,
}

impl fmt::Debug for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cipher").field("key_bits", &self.key_bits()).finish_non_exhaustive()
    }
}

impl Cipher {
    /// Creates a cipher from a base64-encoded key.
    ///
    /// # Errors
    ///
    /// Returns [`IgbError::Authentication`] if the key is not valid base64 or does not
    /// decode to 16, 24 or 32 bytes.
    pub fn new(key_b64: &str) -> Result<Self> {
        let key = STANDARD
            .decode(key_b64.trim())
            .map_err(|e| IgbError::Authentication(format!("malformed key: {e}")))?;
        Self::from_key_bytes(&key)
    }

    /// Creates a cipher from raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`IgbError::Authentication`] if the key is not 16, 24 or 32 bytes long.
    pub fn from_key_bytes(key: &[u8]) -> Result<Self> {
        let invalid = |_| {
            IgbError::Authentication(format!(
                "malformed key: expected 16, 24 or 32 bytes, got {}",
                key.len()
            ))
        };

        let inner = match key.len() {
            16 => GcmCipher::Aes128(Aes128Gcm16::new_from_slice(key).map_err(invalid)?),
            24 => GcmCipher::Aes192(Aes192Gcm16::new_from_slice(key).map_err(invalid)?),
            32 => GcmCipher::Aes256(Aes256Gcm16::new_from_slice(key).map_err(invalid)?),
            len => {
                return Err(IgbError::Authentication(format!(
                    "malformed key: expected 16, 24 or 32 bytes, got {len}"
                )));
            }
        };

        Ok(Self { inner })
    }

    /// Generates a fresh random 256-bit key, base64-encoded.
    #[must_use]
    pub fn generate_key() -> String {
        STANDARD.encode(Aes256Gcm16::generate_key(&mut OsRng))
    }

    /// Returns the AES key size in bits.
    #[must_use]
    pub fn key_bits(&self) -> usize {
        match self.inner {
            GcmCipher::Aes128(_) => 128,
            GcmCipher::Aes192(_) => 192,
            GcmCipher::Aes256(_) => 256,
        }
    }

    /// Encrypts `plaintext` under a fresh random nonce.
    ///
    /// Returns `base64(nonce || ciphertext || tag)`. Two calls with the same input give
    /// different outputs.
    ///
    /// # Errors
    ///
    /// Returns [`IgbError::Authentication`] if the AEAD backend refuses the input, which
    /// only happens for plaintexts beyond the GCM length limit.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let nonce = Aes256Gcm16::generate_nonce(&mut OsRng);
        let sealed = match &self.inner {
            GcmCipher::Aes128(c) => c.encrypt(&nonce, plaintext.as_bytes()),
            GcmCipher::Aes192(c) => c.encrypt(&nonce, plaintext.as_bytes()),
            GcmCipher::Aes256(c) => c.encrypt(&nonce, plaintext.as_bytes()),
        }
        .map_err(|_| IgbError::Authentication("encryption failed".to_owned()))?;

        let mut framed = Vec::with_capacity(NONCE_SIZE + sealed.len());
        framed.extend_from_slice(&nonce);
        framed.extend_from_slice(&sealed);

        Ok(STANDARD.encode(framed))
    }

    /// Decrypts a value produced by [`Cipher::encrypt`].
    ///
    /// The decoded buffer is split at fixed offsets: the first 16 bytes are the nonce,
    /// the last 16 the tag, everything between is ciphertext.
    ///
    /// # Errors
    ///
    /// - [`IgbError::Authentication`] if the input is not base64, is too short to hold a
    ///   nonce and a tag, or the tag does not verify under this key
    /// - [`IgbError::Decode`] if the plaintext is not UTF-8
    pub fn decrypt(&self, ciphertext: &str) -> Result<String> {
        let raw = STANDARD
            .decode(ciphertext.trim())
            .map_err(|e| IgbError::Authentication(format!("ciphertext is not base64: {e}")))?;

        if raw.len() < NONCE_SIZE + TAG_SIZE {
            return Err(IgbError::Authentication(format!(
                "ciphertext too short: {} bytes, need at least {}",
                raw.len(),
                NONCE_SIZE + TAG_SIZE
            )));
        }

        let (nonce, sealed) = raw.split_at(NONCE_SIZE);
        let nonce = Nonce::<U16>::from_slice(nonce);

        let plaintext = match &self.inner {
            GcmCipher::Aes128(c) => c.decrypt(nonce, sealed),
            GcmCipher::Aes192(c) => c.decrypt(nonce, sealed),
            GcmCipher::Aes256(c) => c.decrypt(nonce, sealed),
        }
        .map_err(|_| IgbError::Authentication("tag verification failed".to_owned()))?;

        String::from_utf8(plaintext).map_err(|e| IgbError::Decode(e.to_string()))
    }

    /// Seals raw bytes. Only used to build fixtures for the non-text decode path.
    #[cfg(test)]
    pub(crate) fn encrypt_bytes(&self, plaintext: &[u8]) -> Result<String> {
        let nonce = Aes256Gcm16::generate_nonce(&mut OsRng);
        let sealed = match &self.inner {
            GcmCipher::Aes128(c) => c.encrypt(&nonce, plaintext),
            GcmCipher::Aes192(c) => c.encrypt(&nonce, plaintext),
            GcmCipher::Aes256(c) => c.encrypt(&nonce, plaintext),
        }
        .map_err(|_| IgbError::Authentication("encryption failed".to_owned()))?;

        let mut framed = nonce.to_vec();
        framed.extend_from_slice(&sealed);
        Ok(STANDARD.encode(framed))
    }
}
