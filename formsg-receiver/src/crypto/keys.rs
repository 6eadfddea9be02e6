//! Fixed-size key and nonce decoding.

use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use crypto_box::{PublicKey, SecretKey};
use zeroize::Zeroizing;

use super::DecryptError;

/// Curve25519 key size (public and secret).
pub const KEY_SIZE: usize = 32;
/// XSalsa20 nonce size.
pub const NONCE_SIZE: usize = 24;

/// Decode a base64 value into exactly `N` bytes.
///
/// Inputs of any other length are rejected; nothing is truncated or padded.
pub fn decode_fixed<const N: usize>(
    field: &'static str,
    encoded: &str,
) -> Result<[u8; N], DecryptError> {
    let bytes = Zeroizing::new(
        BASE64
            .decode(encoded)
            .map_err(|_| DecryptError::InvalidEncoding { field })?,
    );

    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| DecryptError::SizeMismatch {
        field,
        expected: N,
        actual: bytes.len(),
    })
}

/// The form's long-lived secret key, used to open every envelope.
///
/// Loaded once at startup and shared read-only across requests.
pub struct RecipientKey {
    secret: SecretKey,
}

impl RecipientKey {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self {
            secret: SecretKey::from(bytes),
        }
    }

    /// Decode the base64 secret key from configuration.
    pub fn from_base64(encoded: &str) -> Result<Self, DecryptError> {
        let bytes = Zeroizing::new(decode_fixed::<KEY_SIZE>("form secret key", encoded)?);
        Ok(Self::from_bytes(*bytes))
    }

    /// The matching public key, as registered with the forms platform.
    pub fn public_key(&self) -> PublicKey {
        self.secret.public_key()
    }

    /// Base64 form of [`Self::public_key`], for setup logs.
    pub fn public_key_base64(&self) -> String {
        BASE64.encode(self.public_key().as_bytes())
    }

    pub(crate) fn secret(&self) -> &SecretKey {
        &self.secret
    }
}

impl fmt::Debug for RecipientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecipientKey")
            .field("public_key", &self.public_key_base64())
            .finish_non_exhaustive()
    }
}
