//! `X-FormSG-Signature` header parsing.
//!
//! The header is four comma-separated `key=value` components in any order:
//!
//! ```text
//! t=1582558358788,s=5e53ec96b10ee1010e00380b,f=5e4b8e3d1f61f00036c9937d,v1=rUAgQ9kr...
//! ```

use std::fmt;

use thiserror::Error;

/// Name of the request header carrying the signature.
pub const SIGNATURE_HEADER: &str = "X-FormSG-Signature";

const TIMESTAMP: &str = "t=";
const SUBMISSION_ID: &str = "s=";
const FORM_ID: &str = "f=";
const SIGNATURE: &str = "v1=";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderFormatError {
    #[error("expected 4 comma-separated components, got {0}")]
    ComponentCount(usize),

    #[error("unrecognized component")]
    UnknownComponent,

    #[error("component {0} appears more than once")]
    DuplicateComponent(&'static str),

    #[error("component {0} is empty")]
    EmptyComponent(&'static str),

    #[error("component {0} is missing")]
    MissingComponent(&'static str),
}

/// Parsed signature header. Values are kept exactly as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    /// Epoch milliseconds, not yet validated as numeric.
    pub timestamp: String,
    pub submission_id: String,
    pub form_id: String,
    /// Base64 ed25519 signature.
    pub signature: String,
}

impl SignatureHeader {
    /// Parse the raw header value. Performs no cryptography.
    pub fn parse(raw: &str) -> Result<Self, HeaderFormatError> {
        let components: Vec<&str> = raw.split(',').collect();
        if components.len() != 4 {
            return Err(HeaderFormatError::ComponentCount(components.len()));
        }

        let mut timestamp = None;
        let mut submission_id = None;
        let mut form_id = None;
        let mut signature = None;

        for component in components {
            let (prefix, slot, value) = if let Some(v) = component.strip_prefix(TIMESTAMP) {
                (TIMESTAMP, &mut timestamp, v)
            } else if let Some(v) = component.strip_prefix(SUBMISSION_ID) {
                (SUBMISSION_ID, &mut submission_id, v)
            } else if let Some(v) = component.strip_prefix(FORM_ID) {
                (FORM_ID, &mut form_id, v)
            } else if let Some(v) = component.strip_prefix(SIGNATURE) {
                (SIGNATURE, &mut signature, v)
            } else {
                return Err(HeaderFormatError::UnknownComponent);
            };

            if slot.is_some() {
                return Err(HeaderFormatError::DuplicateComponent(prefix));
            }
            if value.is_empty() {
                return Err(HeaderFormatError::EmptyComponent(prefix));
            }
            *slot = Some(value.to_string());
        }

        Ok(Self {
            timestamp: timestamp.ok_or(HeaderFormatError::MissingComponent(TIMESTAMP))?,
            submission_id: submission_id
                .ok_or(HeaderFormatError::MissingComponent(SUBMISSION_ID))?,
            form_id: form_id.ok_or(HeaderFormatError::MissingComponent(FORM_ID))?,
            signature: signature.ok_or(HeaderFormatError::MissingComponent(SIGNATURE))?,
        })
    }
}

impl fmt::Display for SignatureHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{},{}{},{}{},{}{}",
            TIMESTAMP,
            self.timestamp,
            SUBMISSION_ID,
            self.submission_id,
            FORM_ID,
            self.form_id,
            SIGNATURE,
            self.signature
        )
    }
}
