//! Public-key authenticated decryption for submission payloads and attachments.
//!
//! The forms platform encrypts each submission with an ephemeral curve25519 key
//! pair and a random nonce, sealing it to the form's long-lived key using the
//! NaCl `crypto_box` construction (X25519 + XSalsa20-Poly1305). Attachments are
//! sealed the same way, each with its own ephemeral key and nonce.
//!
//! ```text
//! "pubkey;nonce:ciphertext" ─┐
//!                            ├→ EncryptedEnvelope → open() → plaintext
//! { submissionPublicKey,  ───┘
//!   nonce, binary }
//! ```

pub mod envelope;
pub mod keys;
pub mod sealed_box;

use thiserror::Error;

pub use envelope::EncryptedEnvelope;
pub use keys::{decode_fixed, RecipientKey, KEY_SIZE, NONCE_SIZE};
pub use sealed_box::open;

/// Errors raised while preparing or opening an encrypted envelope.
///
/// None of the variants carry key material or plaintext.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecryptError {
    #[error("encrypted content is malformed: {0}")]
    MalformedEnvelope(&'static str),

    #[error("{field} is not valid base64")]
    InvalidEncoding { field: &'static str },

    #[error("{field} has wrong size: expected {expected} bytes, got {actual}")]
    SizeMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("authentication failed")]
    AuthenticationFailed,
}
