//! Attachment download and batch decryption.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::crypto::DecryptError;
use crate::submission::{AttachmentEnvelope, AttachmentRequest, Decryptor};

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("attachment request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("attachment download returned status {0}")]
    Status(u16),

    #[error("attachment envelope is not valid JSON: {0}")]
    Envelope(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum AttachmentError {
    #[error("download failed for field {field_id}: {source}")]
    Fetch {
        field_id: String,
        #[source]
        source: FetchError,
    },

    #[error("decryption failed for field {field_id}: {source}")]
    Decrypt {
        field_id: String,
        #[source]
        source: DecryptError,
    },
}

/// Result for one attachment in a batch.
#[derive(Debug)]
pub struct AttachmentOutcome {
    pub request: AttachmentRequest,
    pub result: Result<Vec<u8>, AttachmentError>,
}

/// Fetches encrypted attachment envelopes over HTTP.
#[derive(Clone)]
pub struct AttachmentDownloader {
    client: Client,
    timeout: Duration,
}

impl AttachmentDownloader {
    pub fn new(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// GET `url` and parse the encrypted attachment envelope.
    pub async fn fetch(&self, url: &str) -> Result<AttachmentEnvelope, FetchError> {
        let resp = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    error!(
                        url_length = url.len(),
                        timeout_seconds = self.timeout.as_secs_f64(),
                        "attachment_fetch_timeout"
                    );
                }
                FetchError::Request(e)
            })?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            warn!(status_code = status, "attachment_fetch_bad_status");
            return Err(FetchError::Status(status));
        }

        let body = resp.bytes().await?;

        info!(
            status_code = status,
            body_length = body.len(),
            "attachment_fetch_complete"
        );

        serde_json::from_slice(&body).map_err(FetchError::Envelope)
    }

    /// Fetch and decrypt one attachment.
    pub async fn download(
        &self,
        decryptor: &Decryptor,
        request: &AttachmentRequest,
    ) -> Result<Vec<u8>, AttachmentError> {
        let envelope = self
            .fetch(&request.url)
            .await
            .map_err(|source| AttachmentError::Fetch {
                field_id: request.field_id.clone(),
                source,
            })?;

        decryptor
            .decrypt_attachment(&envelope)
            .map_err(|source| AttachmentError::Decrypt {
                field_id: request.field_id.clone(),
                source,
            })
    }

    /// Fetch and decrypt every request concurrently.
    ///
    /// One outcome per request, in request order. A failure on one attachment
    /// does not affect the others.
    pub async fn download_all(
        &self,
        decryptor: Arc<Decryptor>,
        requests: Vec<AttachmentRequest>,
    ) -> Vec<AttachmentOutcome> {
        let futures: Vec<_> = requests
            .into_iter()
            .map(|request| {
                let decryptor = Arc::clone(&decryptor);
                async move {
                    let result = self.download(&decryptor, &request).await;
                    match &result {
                        Ok(bytes) => info!(
                            field_id = %request.field_id,
                            size = bytes.len(),
                            "attachment_decrypted"
                        ),
                        Err(e) => warn!(
                            field_id = %request.field_id,
                            error = %e,
                            "attachment_decrypt_failed"
                        ),
                    }
                    AttachmentOutcome { request, result }
                }
            })
            .collect();

        futures::future::join_all(futures).await
    }
}
