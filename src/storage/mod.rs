
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{PdfChatError, Result};

/// Durable storage for uploaded files.
///
/// Files are keyed by their original filename; a same-named upload
/// overwrites its predecessor. There is no delete API.
#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    #[inline]
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Persist raw bytes under the given filename, overwriting any
    /// previous upload with the same name.
    ///
    /// Only the final path component of the client-supplied name is used,
    /// so an upload cannot escape the uploads directory.
    #[inline]
    pub async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let name = Path::new(filename)
            .file_name()
            .ok_or_else(|| PdfChatError::Validation(format!("Invalid filename: {filename}")))?;

        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            PdfChatError::Storage(format!("Failed to create uploads directory: {e}"))
        })?;

        let path = self.dir.join(name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| PdfChatError::Storage(format!("Failed to write uploaded file: {e}")))?;

        debug!("Persisted upload to {:?} ({} bytes)", path, bytes.len());
        Ok(path)
    }

    /// List stored filenames, in no particular order.
    #[inline]
    pub async fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| PdfChatError::Storage(format!("Failed to read uploads directory: {e}")))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PdfChatError::Storage(format!("Failed to read uploads directory: {e}")))?
        {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }

        Ok(names)
    }
}
