//! Attachment decryption.
//!
//! Each attachment is sealed independently with its own ephemeral key and nonce,
//! delivered pre-split in an [`AttachmentEnvelope`].

use std::collections::HashMap;

use crate::crypto::{DecryptError, EncryptedEnvelope, RecipientKey};

use super::types::{AttachmentEnvelope, DecryptedSubmission};

/// Decrypt one fetched attachment envelope into file bytes.
pub fn decode_attachment(
    envelope: &AttachmentEnvelope,
    recipient: &RecipientKey,
) -> Result<Vec<u8>, DecryptError> {
    let file = &envelope.encrypted_file;
    EncryptedEnvelope::from_parts(&file.submission_public_key, &file.nonce, &file.binary)?
        .open(recipient)
}

/// An attachment field paired with its download URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRequest {
    pub field_id: String,
    /// The field's answer, which holds the uploaded file name.
    pub file_name: String,
    pub url: String,
}

/// Attachment fields of `submission` that have a download URL, in field order.
pub fn attachment_requests(
    submission: &DecryptedSubmission,
    download_urls: &HashMap<String, String>,
) -> Vec<AttachmentRequest> {
    submission
        .decrypted_content
        .iter()
        .filter(|field| field.is_attachment())
        .filter_map(|field| {
            download_urls.get(&field.id).map(|url| AttachmentRequest {
                field_id: field.id.clone(),
                file_name: field.answer.clone(),
                url: url.clone(),
            })
        })
        .collect()
}
