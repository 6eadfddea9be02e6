//! Encrypted envelope parsing.
//!
//! Submissions pack the three parts into one string,
//! `base64(publicKey) ";" base64(nonce) ":" base64(ciphertext)`.
//! Attachments deliver them as separate base64 fields.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use super::keys::{decode_fixed, RecipientKey, KEY_SIZE, NONCE_SIZE};
use super::sealed_box;
use super::DecryptError;

/// Sender ephemeral public key, nonce and ciphertext for one sealed payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedEnvelope {
    pub sender_public_key: [u8; KEY_SIZE],
    pub nonce: [u8; NONCE_SIZE],
    pub ciphertext: Vec<u8>,
}

impl EncryptedEnvelope {
    /// Parse the combined `pubkey;nonce:ciphertext` string.
    pub fn parse_combined(content: &str) -> Result<Self, DecryptError> {
        let (public_key, rest) = split_exactly_two(content, ';')
            .ok_or(DecryptError::MalformedEnvelope("expected exactly one ';'"))?;
        let (nonce, ciphertext) = split_exactly_two(rest, ':')
            .ok_or(DecryptError::MalformedEnvelope("expected exactly one ':'"))?;

        Self::from_parts(public_key, nonce, ciphertext)
    }

    /// Build an envelope from individually base64-encoded parts.
    pub fn from_parts(
        public_key: &str,
        nonce: &str,
        ciphertext: &str,
    ) -> Result<Self, DecryptError> {
        Ok(Self {
            sender_public_key: decode_fixed::<KEY_SIZE>("public key", public_key)?,
            nonce: decode_fixed::<NONCE_SIZE>("nonce", nonce)?,
            ciphertext: BASE64
                .decode(ciphertext)
                .map_err(|_| DecryptError::InvalidEncoding { field: "ciphertext" })?,
        })
    }

    pub fn open(&self, recipient: &RecipientKey) -> Result<Vec<u8>, DecryptError> {
        sealed_box::open(
            &self.ciphertext,
            &self.nonce,
            &self.sender_public_key,
            recipient,
        )
    }
}

fn split_exactly_two(input: &str, delimiter: char) -> Option<(&str, &str)> {
    let mut parts = input.split(delimiter);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(first), Some(second), None) => Some((first, second)),
        _ => None,
    }
}
