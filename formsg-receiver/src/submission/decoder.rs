//! Decrypted submission decoding.

use thiserror::Error;

use super::types::{DecryptedField, DecryptedSubmission, SubmissionMeta};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Only the position is kept; serde messages can quote plaintext.
    #[error("decrypted content is malformed at line {line}, column {column}")]
    MalformedContent { line: usize, column: usize },
}

/// Decode the decrypted field list and attach the request metadata.
pub fn decode_submission(
    plaintext: &[u8],
    meta: SubmissionMeta,
) -> Result<DecryptedSubmission, DecodeError> {
    let fields: Vec<DecryptedField> =
        serde_json::from_slice(plaintext).map_err(|e| DecodeError::MalformedContent {
            line: e.line(),
            column: e.column(),
        })?;

    Ok(DecryptedSubmission {
        form_id: meta.form_id,
        submission_id: meta.submission_id,
        decrypted_content: fields,
        version: meta.version,
        created: meta.created,
    })
}
