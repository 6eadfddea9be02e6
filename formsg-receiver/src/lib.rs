//! FormSG receiver - webhook endpoint for end-to-end encrypted form submissions.
//!
//! ## Architecture
//!
//! ```text
//! X-FormSG-Signature → SignatureHeader::parse → SignatureVerifier::verify ─┐
//!                                                                         ↓
//! encrypted body → EncryptedEnvelope → open → decode_submission → DecryptedSubmission → OutputStore
//!                                                                         ↓
//! attachment URLs → AttachmentDownloader → decode_attachment → file bytes → OutputStore
//! ```
//!
//! The signature and decryption pipeline (`web::header`, `web::signature`,
//! `crypto`, `submission`) is synchronous and stateless apart from the
//! read-only keys injected at construction.

pub mod config;
pub mod crypto;
pub mod download;
pub mod store;
pub mod submission;
pub mod web;

// Re-export commonly used types
pub use config::{Config, ConfigError, FormKeys};
pub use crypto::{DecryptError, EncryptedEnvelope, RecipientKey};
pub use download::{AttachmentDownloader, AttachmentError, AttachmentOutcome, FetchError};
pub use store::{OutputStore, StoreError};
pub use submission::{
    DecodeError, DecryptedField, DecryptedSubmission, Decryptor, EncryptedBody, SubmissionError,
};
pub use web::{AppState, AuthError, HeaderFormatError, SignatureHeader, SignatureVerifier};
