//! NaCl box opening (X25519 + XSalsa20-Poly1305).

use crypto_box::aead::Aead;
use crypto_box::{Nonce, PublicKey, SalsaBox};

use super::keys::{RecipientKey, KEY_SIZE, NONCE_SIZE};
use super::DecryptError;

/// Authenticate and decrypt `ciphertext` sealed by `sender_public_key` to `recipient`.
///
/// The Poly1305 tag is checked before any plaintext is released. On failure the
/// only signal is [`DecryptError::AuthenticationFailed`].
pub fn open(
    ciphertext: &[u8],
    nonce: &[u8; NONCE_SIZE],
    sender_public_key: &[u8; KEY_SIZE],
    recipient: &RecipientKey,
) -> Result<Vec<u8>, DecryptError> {
    let sender = PublicKey::from(*sender_public_key);
    let salsa_box = SalsaBox::new(&sender, recipient.secret());

    salsa_box
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|_| DecryptError::AuthenticationFailed)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crypto_box::SecretKey;

    pub(crate) const RECIPIENT_SECRET: [u8; KEY_SIZE] = [0x11; KEY_SIZE];
    pub(crate) const SENDER_SECRET: [u8; KEY_SIZE] = [0x22; KEY_SIZE];
    pub(crate) const NONCE: [u8; NONCE_SIZE] = [0x33; NONCE_SIZE];

    /// Seal `plaintext` the way the forms platform does.
    ///
    /// Returns the ephemeral sender public key and the ciphertext.
    pub(crate) fn seal(
        plaintext: &[u8],
        sender_secret: [u8; KEY_SIZE],
        nonce: &[u8; NONCE_SIZE],
        recipient: &RecipientKey,
    ) -> ([u8; KEY_SIZE], Vec<u8>) {
        let sender = SecretKey::from(sender_secret);
        let salsa_box = SalsaBox::new(&recipient.public_key(), &sender);
        let ciphertext = salsa_box
            .encrypt(Nonce::from_slice(nonce), plaintext)
            .unwrap();
        (*sender.public_key().as_bytes(), ciphertext)
    }

    #[test]
    fn test_open_roundtrip() {
        let recipient = RecipientKey::from_bytes(RECIPIENT_SECRET);
        let plaintext = br#"[{"_id":"a","answer":"b","fieldType":"textfield","question":"c"}]"#;

        let (sender_pk, ciphertext) = seal(plaintext, SENDER_SECRET, &NONCE, &recipient);
        let opened = open(&ciphertext, &NONCE, &sender_pk, &recipient).unwrap();

        assert_eq!(opened, plaintext);
    }

    #[test]
    fn test_open_rejects_every_flipped_byte() {
        let recipient = RecipientKey::from_bytes(RECIPIENT_SECRET);
        let (sender_pk, ciphertext) = seal(b"attachment bytes", SENDER_SECRET, &NONCE, &recipient);

        for i in 0..ciphertext.len() {
            let mut tampered = ciphertext.clone();
            tampered[i] ^= 0x01;
            assert_eq!(
                open(&tampered, &NONCE, &sender_pk, &recipient),
                Err(DecryptError::AuthenticationFailed),
                "byte {} flipped but box opened",
                i
            );
        }
    }

    #[test]
    fn test_open_wrong_recipient_fails() {
        let recipient = RecipientKey::from_bytes(RECIPIENT_SECRET);
        let other = RecipientKey::from_bytes([0x44; KEY_SIZE]);
        let (sender_pk, ciphertext) = seal(b"secret", SENDER_SECRET, &NONCE, &recipient);

        assert_eq!(
            open(&ciphertext, &NONCE, &sender_pk, &other),
            Err(DecryptError::AuthenticationFailed)
        );
    }

    #[test]
    fn test_open_wrong_nonce_fails() {
        let recipient = RecipientKey::from_bytes(RECIPIENT_SECRET);
        let (sender_pk, ciphertext) = seal(b"secret", SENDER_SECRET, &NONCE, &recipient);

        assert_eq!(
            open(&ciphertext, &[0x34; NONCE_SIZE], &sender_pk, &recipient),
            Err(DecryptError::AuthenticationFailed)
        );
    }

    #[test]
    fn test_open_truncated_ciphertext_fails() {
        let recipient = RecipientKey::from_bytes(RECIPIENT_SECRET);
        let (sender_pk, ciphertext) = seal(b"secret", SENDER_SECRET, &NONCE, &recipient);

        assert_eq!(
            open(&ciphertext[..10], &NONCE, &sender_pk, &recipient),
            Err(DecryptError::AuthenticationFailed)
        );
        assert_eq!(
            open(&[], &NONCE, &sender_pk, &recipient),
            Err(DecryptError::AuthenticationFailed)
        );
    }
}
