//! Sealed value envelope.
//!
//! The gateway keeps one envelope per handle, CBOR-encoded. The envelope
//! carries the nonce and ciphertext; the key is re-derived from the handle.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use veilstore_core::HandleId;

use crate::crypto::{EncryptionKey, EncryptionNonce};
use crate::error::{GatewayError, Result};

/// Format identifier for sealed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum SealFormat {
    /// ChaCha20-Poly1305 with 256-bit key, handle as associated data.
    ChaCha20Poly1305 = 1,
}

/// A sealed plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedEnvelope {
    /// Encryption algorithm used.
    pub format: SealFormat,

    /// Nonce used for encryption (unique per seal).
    pub nonce: EncryptionNonce,

    /// The encrypted data (includes authentication tag).
    pub ciphertext: Bytes,
}

impl SealedEnvelope {
    /// Seal `plaintext` under `key`, bound to `handle`.
    pub fn seal(plaintext: &[u8], handle: &HandleId, key: &EncryptionKey) -> Result<Self> {
        let nonce = EncryptionNonce::generate();
        let ciphertext = key.encrypt(plaintext, handle.as_bytes(), &nonce)?;

        Ok(Self {
            format: SealFormat::ChaCha20Poly1305,
            nonce,
            ciphertext: Bytes::from(ciphertext),
        })
    }

    /// Open with the key and handle it was sealed under.
    pub fn open(&self, handle: &HandleId, key: &EncryptionKey) -> Result<Vec<u8>> {
        match self.format {
            SealFormat::ChaCha20Poly1305 => {
                key.decrypt(&self.ciphertext, handle.as_bytes(), &self.nonce)
            }
        }
    }

    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)
            .map_err(|e| GatewayError::SerializationError(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| GatewayError::SerializationError(e.to_string()))
    }
}
