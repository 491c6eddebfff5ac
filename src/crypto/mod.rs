//! Credential cryptography.
//!
//! - [`Cipher`]: AES-GCM sealing of single values, `base64(nonce || ciphertext || tag)`
//! - [`CredentialCipher`]: storage and transport transforms over whole credential sets

pub mod cipher;
pub mod pipeline;


pub use cipher::{Cipher, NONCE_SIZE, TAG_SIZE};
pub use pipeline::CredentialCipher;
