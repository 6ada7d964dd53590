use std::path::{Path, PathBuf};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::shared::AppError;

/// Filesystem blob store for uploaded photo and CV files.
///
/// Files are addressed by the filename returned from `save`; records keep
/// that name, never a path.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes the bytes under a fresh uuid-prefixed name, preserving the
    /// original extension, and returns the stored filename.
    #[instrument(skip(self, bytes))]
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, AppError> {
        let extension = Path::new(original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();
        let filename = format!("{}{}", Uuid::new_v4(), extension);

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to create upload directory: {e}")))?;
        tokio::fs::write(self.root.join(&filename), bytes)
            .await
            .map_err(|e| {
                warn!(error = %e, filename = %filename, "Failed to write uploaded file");
                AppError::Internal(format!("Failed to store file: {e}"))
            })?;

        debug!(filename = %filename, size = bytes.len(), "Stored uploaded file");
        Ok(filename)
    }

    /// Resolves a stored filename to its on-disk path. Names containing
    /// path separators or parent references are rejected.
    pub fn path_of(&self, filename: &str) -> Result<PathBuf, AppError> {
        if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
            return Err(AppError::Validation("Invalid file name".to_string()));
        }
        Ok(self.root.join(filename))
    }

    /// Reads a stored file, failing with `NotFound` when it is missing.
    #[instrument(skip(self))]
    pub async fn read(&self, filename: &str) -> Result<Vec<u8>, AppError> {
        let path = self.path_of(filename)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(filename = %filename, "Stored file not found on disk");
                Err(AppError::NotFound("File not found on server".to_string()))
            }
            Err(e) => Err(AppError::Internal(format!("Failed to read file: {e}"))),
        }
    }
}
