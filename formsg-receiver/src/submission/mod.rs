//! Submission and attachment decryption.
//!
//! ## Processing Flow
//!
//! ```text
//! EncryptedSubmission → EncryptedEnvelope::parse_combined → open → decode_submission → DecryptedSubmission
//! AttachmentEnvelope  → EncryptedEnvelope::from_parts     → open → file bytes
//! ```

pub mod attachment;
pub mod decoder;
pub mod types;

use thiserror::Error;
use tracing::{info, warn};

use crate::crypto::{DecryptError, EncryptedEnvelope, RecipientKey};

pub use attachment::{attachment_requests, decode_attachment, AttachmentRequest};
pub use decoder::{decode_submission, DecodeError};
pub use types::{
    AttachmentEnvelope, DecryptedBody, DecryptedField, DecryptedSubmission, EncryptedBody,
    EncryptedFile, EncryptedSubmission, SubmissionMeta, ATTACHMENT_FIELD_TYPE,
};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error(transparent)]
    Decrypt(#[from] DecryptError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Decrypts submissions and attachments with the form's secret key.
///
/// Holds no mutable state; one instance serves every request.
#[derive(Debug)]
pub struct Decryptor {
    recipient: RecipientKey,
}

impl Decryptor {
    pub fn new(recipient: RecipientKey) -> Self {
        Self { recipient }
    }

    /// Base64 public key matching the configured secret key.
    pub fn recipient_public_key(&self) -> String {
        self.recipient.public_key_base64()
    }

    pub fn decrypt_submission(
        &self,
        submission: &EncryptedSubmission,
    ) -> Result<DecryptedSubmission, SubmissionError> {
        let plaintext = EncryptedEnvelope::parse_combined(&submission.encrypted_content)
            .and_then(|envelope| envelope.open(&self.recipient))
            .map_err(|e| {
                warn!(
                    form_id = %submission.form_id,
                    submission_id = %submission.submission_id,
                    error = %e,
                    "submission_decrypt_failed"
                );
                e
            })?;

        let decrypted = decode_submission(&plaintext, SubmissionMeta::from(submission))
            .map_err(|e| {
                warn!(
                    submission_id = %submission.submission_id,
                    error = %e,
                    "submission_decode_failed"
                );
                e
            })?;

        info!(
            form_id = %decrypted.form_id,
            submission_id = %decrypted.submission_id,
            field_count = decrypted.decrypted_content.len(),
            "submission_decrypted"
        );

        Ok(decrypted)
    }

    pub fn decrypt_attachment(&self, envelope: &AttachmentEnvelope) -> Result<Vec<u8>, DecryptError> {
        decode_attachment(envelope, &self.recipient)
    }
}
