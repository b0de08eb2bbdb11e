use crate::domain::audio::AudioFormat;
use crate::domain::document::extension_of;
use crate::error::AppError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

const STAGING_DIR: &str = "staging";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to prepare storage directory {path}: {source}")]
    Init {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// An artifact written to storage
#[derive(Debug, Clone)]
pub struct StoredArtifact {
    pub path: PathBuf,
    pub filename: String,
    pub size_bytes: u64,
}

/// Directory holding generated audio and staged uploads.
///
/// Without an explicit directory a process temp dir is used and removed
/// when the store is dropped.
pub struct ArtifactStore {
    root: PathBuf,
    _temp: Option<TempDir>,
}

impl ArtifactStore {
    pub fn open(dir: Option<&Path>) -> Result<Self, StorageError> {
        let (root, temp) = match dir {
            Some(dir) => (dir.to_path_buf(), None),
            None => {
                let temp = tempfile::Builder::new()
                    .prefix("docvoice_")
                    .tempdir()
                    .map_err(|source| StorageError::Init {
                        path: std::env::temp_dir(),
                        source,
                    })?;
                (temp.path().to_path_buf(), Some(temp))
            }
        };

        let staging = root.join(STAGING_DIR);
        std::fs::create_dir_all(&staging).map_err(|source| StorageError::Init {
            path: staging.clone(),
            source,
        })?;

        tracing::info!(storage_dir = %root.display(), "Artifact store ready");

        Ok(Self { root, _temp: temp })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist an assembled artifact as `audiobook_<id>.<ext>`
    pub async fn write_artifact(
        &self,
        id: Uuid,
        format: AudioFormat,
        bytes: &[u8],
    ) -> Result<StoredArtifact, StorageError> {
        let filename = format!("audiobook_{}.{}", id, format.extension());
        let path = self.root.join(&filename);

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| StorageError::Write {
                path: path.clone(),
                source,
            })?;

        Ok(StoredArtifact {
            path,
            filename,
            size_bytes: bytes.len() as u64,
        })
    }

    /// Remove an artifact that will never be registered
    pub async fn discard_artifact(&self, artifact: &StoredArtifact) {
        if let Err(e) = tokio::fs::remove_file(&artifact.path).await {
            tracing::warn!(
                error = %e,
                path = %artifact.path.display(),
                "Failed to discard unregistered artifact"
            );
        }
    }

    /// Create an empty staged file for an upload named `filename`.
    ///
    /// The name on disk is collision free; the file is deleted when the
    /// returned guard drops.
    pub async fn create_upload(
        &self,
        filename: &str,
    ) -> Result<(StagedUpload, tokio::fs::File), StorageError> {
        let extension = extension_of(filename).unwrap_or_default();
        let path = self
            .root
            .join(STAGING_DIR)
            .join(format!("upload_{}.{}", Uuid::new_v4(), extension));

        let file = tokio::fs::File::create(&path)
            .await
            .map_err(|source| StorageError::Write {
                path: path.clone(),
                source,
            })?;

        let upload = StagedUpload {
            path,
            filename: filename.to_string(),
            extension,
        };
        Ok((upload, file))
    }

    /// Stage an upload that is already in memory
    pub async fn stage_upload(
        &self,
        filename: &str,
        bytes: &[u8],
    ) -> Result<StagedUpload, StorageError> {
        let (upload, mut file) = self.create_upload(filename).await?;
        let write_error = |source| StorageError::Write {
            path: upload.path.clone(),
            source,
        };

        file.write_all(bytes).await.map_err(write_error)?;
        file.flush().await.map_err(write_error)?;

        Ok(upload)
    }

    /// Whether new files can currently be created
    pub async fn is_writable(&self) -> bool {
        let probe = self.root.join(format!(".probe_{}", Uuid::new_v4()));
        match tokio::fs::write(&probe, b"").await {
            Ok(()) => {
                let _ = tokio::fs::remove_file(&probe).await;
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Storage directory is not writable");
                false
            }
        }
    }
}

/// An uploaded document on disk, removed on drop
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    filename: String,
    extension: String,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name the client uploaded the document under
    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %e, "Failed to delete staged upload");
            }
        }
    }
}
