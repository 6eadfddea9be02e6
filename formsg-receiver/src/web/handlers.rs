//! Webhook endpoint handlers.
//!
//! The submissions handler runs the whole pipeline for one request:
//! 1. Authenticate the signature header
//! 2. Decrypt and persist the submission
//! 3. Download, decrypt and persist attachments (if enabled)

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, info, warn};

use crate::download::AttachmentDownloader;
use crate::store::OutputStore;
use crate::submission::{attachment_requests, Decryptor, EncryptedBody};
use crate::web::header::SIGNATURE_HEADER;
use crate::web::signature::{authenticate, now_millis, SignatureVerifier};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<SignatureVerifier>,
    pub decryptor: Arc<Decryptor>,
    pub downloader: AttachmentDownloader,
    pub store: OutputStore,
    pub has_attachments: bool,
}

impl AppState {
    pub fn new(
        verifier: SignatureVerifier,
        decryptor: Decryptor,
        downloader: AttachmentDownloader,
        store: OutputStore,
        has_attachments: bool,
    ) -> Self {
        Self {
            verifier: Arc::new(verifier),
            decryptor: Arc::new(decryptor),
            downloader,
            store,
            has_attachments,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Submissions Webhook
// =============================================================================

/// Error response body.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

fn reject(status: StatusCode, message: &'static str) -> Response {
    (status, Json(MessageResponse { message })).into_response()
}

/// Encrypted submission webhook endpoint.
///
/// The body is read raw so authentication runs before any JSON parsing.
pub async fn submissions(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Response {
    let raw_header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let Some(raw_header) = raw_header else {
        warn!(body_length = body.len(), "signature_header_missing");
        return reject(StatusCode::UNAUTHORIZED, "Unauthorized");
    };

    let header = match authenticate(raw_header, &state.verifier, now_millis()) {
        Ok(header) => header,
        Err(e) => {
            warn!(error = %e, "webhook_unauthorized");
            return reject(StatusCode::UNAUTHORIZED, "Unauthorized");
        }
    };

    info!(
        form_id = %header.form_id,
        submission_id = %header.submission_id,
        body_length = body.len(),
        "submission_received"
    );

    let encrypted: EncryptedBody = match serde_json::from_slice(&body) {
        Ok(b) => b,
        Err(e) => {
            warn!(error = %e, "submission_body_invalid");
            return reject(StatusCode::BAD_REQUEST, "Invalid request");
        }
    };

    let decrypted = match state.decryptor.decrypt_submission(&encrypted.data) {
        Ok(d) => d,
        Err(_) => return reject(StatusCode::BAD_REQUEST, "decryption fail"),
    };

    if let Err(e) = state.store.save_submission(&decrypted).await {
        error!(
            submission_id = %decrypted.submission_id,
            error = %e,
            "submission_save_failed"
        );
        return reject(StatusCode::INTERNAL_SERVER_ERROR, "file write fail");
    }

    if state.has_attachments {
        let requests = attachment_requests(&decrypted, &encrypted.data.attachment_download_urls);
        let outcomes = state
            .downloader
            .download_all(Arc::clone(&state.decryptor), requests)
            .await;

        for outcome in outcomes {
            let bytes = match outcome.result {
                Ok(bytes) => bytes,
                Err(e) => {
                    error!(
                        submission_id = %decrypted.submission_id,
                        error = %e,
                        "attachment_failed"
                    );
                    return reject(StatusCode::BAD_REQUEST, "download attachment fail");
                }
            };

            if let Err(e) = state
                .store
                .save_attachment(&outcome.request.field_id, &outcome.request.file_name, &bytes)
                .await
            {
                error!(
                    submission_id = %decrypted.submission_id,
                    field_id = %outcome.request.field_id,
                    error = %e,
                    "attachment_save_failed"
                );
                return reject(StatusCode::INTERNAL_SERVER_ERROR, "file write fail");
            }
        }
    }

    info!(
        form_id = %decrypted.form_id,
        submission_id = %decrypted.submission_id,
        "submission_processed"
    );

    (StatusCode::OK, "ok").into_response()
}
