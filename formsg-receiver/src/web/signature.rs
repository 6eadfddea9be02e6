//! FormSG webhook signature verification.
//!
//! The forms platform signs every webhook with ed25519 over the base string
//! `{postUri}.{submissionId}.{formId}.{timestamp}` and sends the result in the
//! `X-FormSG-Signature` header alongside the signed fields.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use thiserror::Error;
use tracing::warn;

use super::header::{HeaderFormatError, SignatureHeader};

/// Default replay window: signatures older than five minutes are stale.
pub const DEFAULT_MAX_AGE_MS: i64 = 300_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("signature header is malformed: {0}")]
    MalformedHeader(#[from] HeaderFormatError),

    #[error("signature timestamp is not a valid integer")]
    InvalidTimestamp,

    #[error("signature is invalid")]
    InvalidSignature,

    #[error("signature is not recent")]
    StaleSignature,
}

/// Verifies webhook signatures against the platform's signing key.
///
/// Immutable after construction and safe to share across requests.
#[derive(Debug, Clone)]
pub struct SignatureVerifier {
    post_uri: String,
    public_key: VerifyingKey,
    max_age_ms: i64,
}

impl SignatureVerifier {
    /// `post_uri` must match byte-for-byte the URI registered with the forms platform.
    pub fn new(post_uri: impl Into<String>, public_key: VerifyingKey) -> Self {
        Self {
            post_uri: post_uri.into(),
            public_key,
            max_age_ms: DEFAULT_MAX_AGE_MS,
        }
    }

    pub fn with_max_age_ms(mut self, max_age_ms: i64) -> Self {
        self.max_age_ms = max_age_ms;
        self
    }

    pub fn post_uri(&self) -> &str {
        &self.post_uri
    }

    /// The exact string the platform signed.
    pub fn base_string(&self, header: &SignatureHeader) -> String {
        format!(
            "{}.{}.{}.{}",
            self.post_uri, header.submission_id, header.form_id, header.timestamp
        )
    }

    /// Verify a parsed header at `now_millis`.
    ///
    /// The signature and the replay window are both always checked, in that
    /// order. Timestamps in the future are accepted.
    pub fn verify(&self, header: &SignatureHeader, now_millis: i64) -> Result<(), AuthError> {
        let timestamp: i64 = header.timestamp.parse().map_err(|_| {
            warn!(
                submission_id = %header.submission_id,
                form_id = %header.form_id,
                "signature_invalid_timestamp"
            );
            AuthError::InvalidTimestamp
        })?;

        let signature_valid = self.signature_matches(header);

        // saturating: a timestamp near i64::MAX is far in the future, never stale
        let stale = timestamp.saturating_add(self.max_age_ms) < now_millis;

        if !signature_valid {
            warn!(
                submission_id = %header.submission_id,
                form_id = %header.form_id,
                "signature_mismatch"
            );
            return Err(AuthError::InvalidSignature);
        }

        if stale {
            warn!(
                submission_id = %header.submission_id,
                form_id = %header.form_id,
                signed_at_ms = timestamp,
                now_ms = now_millis,
                max_age_ms = self.max_age_ms,
                "signature_stale"
            );
            return Err(AuthError::StaleSignature);
        }

        Ok(())
    }

    fn signature_matches(&self, header: &SignatureHeader) -> bool {
        let Ok(bytes) = BASE64.decode(&header.signature) else {
            return false;
        };
        let Ok(signature) = Signature::from_slice(&bytes) else {
            return false;
        };

        self.public_key
            .verify(self.base_string(header).as_bytes(), &signature)
            .is_ok()
    }
}

/// Parse and verify a raw `X-FormSG-Signature` header value.
pub fn authenticate(
    raw_header: &str,
    verifier: &SignatureVerifier,
    now_millis: i64,
) -> Result<SignatureHeader, AuthError> {
    let header = SignatureHeader::parse(raw_header).map_err(|e| {
        warn!(error = %e, "signature_header_malformed");
        e
    })?;
    verifier.verify(&header, now_millis)?;
    Ok(header)
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// Decode the platform's base64 ed25519 public key.
pub fn verifying_key_from_base64(encoded: &str) -> Option<VerifyingKey> {
    let bytes = BASE64.decode(encoded).ok()?;
    let bytes: [u8; 32] = bytes.as_slice().try_into().ok()?;
    VerifyingKey::from_bytes(&bytes).ok()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};

    pub(crate) const POST_URI: &str = "https://example.com/submissions";
    pub(crate) const SIGNING_SEED: [u8; 32] = [0x5a; 32];

    const TIMESTAMP: i64 = 1582558358788;
    const SUBMISSION_ID: &str = "5e53ec96b10ee1010e00380b";
    const FORM_ID: &str = "5e4b8e3d1f61f00036c9937d";

    /// Build a header signed the way the forms platform signs it.
    pub(crate) fn signed_header(
        signing_key: &SigningKey,
        post_uri: &str,
        submission_id: &str,
        form_id: &str,
        timestamp: i64,
    ) -> String {
        let base = format!("{}.{}.{}.{}", post_uri, submission_id, form_id, timestamp);
        let signature = BASE64.encode(signing_key.sign(base.as_bytes()).to_bytes());
        format!(
            "t={},s={},f={},v1={}",
            timestamp, submission_id, form_id, signature
        )
    }

    fn setup() -> (SigningKey, SignatureVerifier) {
        let signing_key = SigningKey::from_bytes(&SIGNING_SEED);
        let verifier = SignatureVerifier::new(POST_URI, signing_key.verifying_key());
        (signing_key, verifier)
    }

    #[test]
    fn test_authenticate_valid() {
        let (key, verifier) = setup();
        let raw = signed_header(&key, POST_URI, SUBMISSION_ID, FORM_ID, TIMESTAMP);

        let header = authenticate(&raw, &verifier, TIMESTAMP + 1000).unwrap();
        assert_eq!(header.form_id, FORM_ID);
    }

    #[test]
    fn test_authenticate_changed_form_id() {
        let (key, verifier) = setup();
        let raw = signed_header(&key, POST_URI, SUBMISSION_ID, FORM_ID, TIMESTAMP);
        let tampered = raw.replace(FORM_ID, "5e4b8e3d1f61f00036c9937e");

        assert_eq!(
            authenticate(&tampered, &verifier, TIMESTAMP + 1000),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn test_authenticate_different_post_uri() {
        let (key, verifier) = setup();
        let raw = signed_header(&key, "https://example.com/submissions/", SUBMISSION_ID, FORM_ID, TIMESTAMP);

        assert_eq!(
            authenticate(&raw, &verifier, TIMESTAMP),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn test_verify_every_flipped_signature_bit() {
        let (key, verifier) = setup();
        let raw = signed_header(&key, POST_URI, SUBMISSION_ID, FORM_ID, TIMESTAMP);
        let header = SignatureHeader::parse(&raw).unwrap();
        let signature = BASE64.decode(&header.signature).unwrap();

        for bit in 0..signature.len() * 8 {
            let mut flipped = signature.clone();
            flipped[bit / 8] ^= 1 << (bit % 8);
            let tampered = SignatureHeader {
                signature: BASE64.encode(&flipped),
                ..header.clone()
            };
            assert_eq!(
                verifier.verify(&tampered, TIMESTAMP),
                Err(AuthError::InvalidSignature),
                "bit {} flipped but signature verified",
                bit
            );
        }
    }

    #[test]
    fn test_verify_wrong_public_key() {
        let (key, _) = setup();
        let other = SigningKey::from_bytes(&[0x6b; 32]);
        let verifier = SignatureVerifier::new(POST_URI, other.verifying_key());
        let raw = signed_header(&key, POST_URI, SUBMISSION_ID, FORM_ID, TIMESTAMP);

        assert_eq!(
            authenticate(&raw, &verifier, TIMESTAMP),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn test_verify_replay_window_boundary() {
        let (key, verifier) = setup();
        let raw = signed_header(&key, POST_URI, SUBMISSION_ID, FORM_ID, TIMESTAMP);

        assert!(authenticate(&raw, &verifier, TIMESTAMP + 300_000).is_ok());
        assert_eq!(
            authenticate(&raw, &verifier, TIMESTAMP + 300_001),
            Err(AuthError::StaleSignature)
        );
    }

    #[test]
    fn test_verify_future_timestamp_accepted() {
        let (key, verifier) = setup();
        let raw = signed_header(&key, POST_URI, SUBMISSION_ID, FORM_ID, TIMESTAMP);

        assert!(authenticate(&raw, &verifier, TIMESTAMP - 86_400_000).is_ok());
    }

    #[test]
    fn test_verify_stale_and_invalid_reports_invalid_signature() {
        let (key, verifier) = setup();
        let raw = signed_header(&key, POST_URI, SUBMISSION_ID, FORM_ID, TIMESTAMP);
        let tampered = raw.replace(SUBMISSION_ID, "000000000000000000000000");

        assert_eq!(
            authenticate(&tampered, &verifier, TIMESTAMP + 10_000_000),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn test_verify_custom_max_age() {
        let (key, verifier) = setup();
        let verifier = verifier.with_max_age_ms(1000);
        let raw = signed_header(&key, POST_URI, SUBMISSION_ID, FORM_ID, TIMESTAMP);

        assert!(authenticate(&raw, &verifier, TIMESTAMP + 1000).is_ok());
        assert_eq!(
            authenticate(&raw, &verifier, TIMESTAMP + 1001),
            Err(AuthError::StaleSignature)
        );
    }

    #[test]
    fn test_verify_non_numeric_timestamp() {
        let (_, verifier) = setup();
        let raw = "t=yesterday,s=sub,f=form,v1=c2ln";

        assert_eq!(
            authenticate(raw, &verifier, TIMESTAMP),
            Err(AuthError::InvalidTimestamp)
        );
    }

    #[test]
    fn test_verify_signature_not_base64() {
        let (_, verifier) = setup();
        let raw = format!("t={},s=sub,f=form,v1=***", TIMESTAMP);

        assert_eq!(
            authenticate(&raw, &verifier, TIMESTAMP),
            Err(AuthError::InvalidSignature)
        );
    }

    #[test]
    fn test_authenticate_malformed_header() {
        let (_, verifier) = setup();
        assert_eq!(
            authenticate("t=1,s=2,f=3", &verifier, TIMESTAMP),
            Err(AuthError::MalformedHeader(HeaderFormatError::ComponentCount(3)))
        );
    }

    #[test]
    fn test_verifying_key_from_base64() {
        let key = SigningKey::from_bytes(&SIGNING_SEED).verifying_key();
        let encoded = BASE64.encode(key.as_bytes());
        assert_eq!(verifying_key_from_base64(&encoded), Some(key));
        assert_eq!(verifying_key_from_base64(&BASE64.encode([1u8; 31])), None);
        assert_eq!(verifying_key_from_base64("???"), None);
    }

    #[test]
    fn test_now_millis_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(now_millis() > 1_577_836_800_000);
    }
}
