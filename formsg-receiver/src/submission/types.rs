//! Wire formats for encrypted webhook bodies, attachments, and decrypted output.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Field type marking an answer that names an attachment.
pub const ATTACHMENT_FIELD_TYPE: &str = "attachment";

// =============================================================================
// Inbound
// =============================================================================

/// JSON body posted by the forms platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedBody {
    pub data: EncryptedSubmission,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedSubmission {
    pub form_id: String,
    pub submission_id: String,
    /// `base64(publicKey);base64(nonce):base64(ciphertext)`
    pub encrypted_content: String,
    pub version: i64,
    /// RFC 3339 timestamp, passed through unchanged.
    pub created: String,
    /// Field id to attachment download URL.
    #[serde(default)]
    pub attachment_download_urls: HashMap<String, String>,
}

/// Metadata that travels beside the ciphertext rather than inside it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionMeta {
    pub form_id: String,
    pub submission_id: String,
    pub version: i64,
    pub created: String,
}

impl From<&EncryptedSubmission> for SubmissionMeta {
    fn from(submission: &EncryptedSubmission) -> Self {
        Self {
            form_id: submission.form_id.clone(),
            submission_id: submission.submission_id.clone(),
            version: submission.version,
            created: submission.created.clone(),
        }
    }
}

/// JSON object returned by an attachment download URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentEnvelope {
    pub encrypted_file: EncryptedFile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedFile {
    pub submission_public_key: String,
    pub nonce: String,
    pub binary: String,
}

// =============================================================================
// Decrypted
// =============================================================================

/// One answered form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptedField {
    #[serde(rename = "_id")]
    pub id: String,
    /// Literal answer text, or the file name for attachment fields.
    #[serde(default)]
    pub answer: String,
    pub field_type: String,
    #[serde(default)]
    pub question: String,
}

impl DecryptedField {
    pub fn is_attachment(&self) -> bool {
        self.field_type == ATTACHMENT_FIELD_TYPE
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecryptedSubmission {
    pub form_id: String,
    pub submission_id: String,
    /// Fields in the platform's order.
    pub decrypted_content: Vec<DecryptedField>,
    pub version: i64,
    pub created: String,
}

/// Persisted output document, `{ "data": { ... } }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecryptedBody {
    pub data: DecryptedSubmission,
}
