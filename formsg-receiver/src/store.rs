//! Persistence of decrypted submissions and attachments.

use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::submission::{DecryptedBody, DecryptedSubmission};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("refusing to write unsafe file name")]
    InvalidName,

    #[error("failed to serialize submission: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

/// Writes decrypted output into a single directory.
#[derive(Debug, Clone)]
pub struct OutputStore {
    dir: PathBuf,
}

impl OutputStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the output directory if it does not exist.
    pub async fn ensure_dir(&self) -> Result<(), StoreError> {
        if tokio::fs::try_exists(&self.dir).await? {
            info!(dir = %self.dir.display(), "output_dir_exists");
        } else {
            tokio::fs::create_dir_all(&self.dir).await?;
            info!(dir = %self.dir.display(), "output_dir_created");
        }
        Ok(())
    }

    /// Write `<submissionId>.json`. Returns the written path.
    pub async fn save_submission(
        &self,
        submission: &DecryptedSubmission,
    ) -> Result<PathBuf, StoreError> {
        let path = self.path_for(&format!("{}.json", submission.submission_id))?;
        let body = DecryptedBody {
            data: submission.clone(),
        };
        tokio::fs::write(&path, serde_json::to_vec(&body)?).await?;

        info!(
            submission_id = %submission.submission_id,
            path = %path.display(),
            "submission_saved"
        );
        Ok(path)
    }

    /// Write `<fieldId>.<fileName>`. Returns the written path.
    pub async fn save_attachment(
        &self,
        field_id: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<PathBuf, StoreError> {
        let path = self.path_for(&format!("{}.{}", field_id, file_name))?;
        tokio::fs::write(&path, bytes).await?;

        info!(
            field_id = %field_id,
            size = bytes.len(),
            path = %path.display(),
            "attachment_saved"
        );
        Ok(path)
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StoreError> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) if !name.contains('\\') => Ok(self.dir.join(name)),
            _ => Err(StoreError::InvalidName),
        }
    }
}
