//! Local disk storage for uploaded issue photos.

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use super::{BaseFileStore, StoredFile};

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("File exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Empty file")]
    Empty,
}

/// Writes uploads under `root` with generated names, served at `/uploads/<name>`.
pub struct LocalFileStore {
    root: PathBuf,
    max_bytes: usize,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    fn check(&self, mime: &str, bytes: &[u8]) -> Result<(), UploadError> {
        if !mime.starts_with("image/") {
            return Err(UploadError::UnsupportedType(mime.to_string()));
        }
        if bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        if bytes.len() > self.max_bytes {
            return Err(UploadError::TooLarge {
                limit: self.max_bytes,
            });
        }
        Ok(())
    }
}

/// Extension from the original name, else the first one known for the MIME type.
fn extension_for(original_name: Option<&str>, mime: &str) -> String {
    original_name
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .or_else(|| {
            mime_guess::get_mime_extensions_str(mime)
                .and_then(|exts| exts.first())
                .map(|ext| ext.to_string())
        })
        .unwrap_or_else(|| "bin".to_string())
}

#[async_trait]
impl BaseFileStore for LocalFileStore {
    fn validate(&self, mime: &str, bytes: &[u8]) -> Result<()> {
        self.check(mime, bytes)?;
        Ok(())
    }

    async fn store(
        &self,
        original_name: Option<&str>,
        mime: &str,
        bytes: &[u8],
    ) -> Result<StoredFile> {
        self.check(mime, bytes)?;

        let filename = format!("{}.{}", Uuid::now_v7(), extension_for(original_name, mime));
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.root.join(&filename), bytes).await?;

        info!(%filename, mime, size = bytes.len(), "Stored upload");

        Ok(StoredFile {
            url: format!("/uploads/{}", filename),
            filename,
            mime: mime.to_string(),
            size: bytes.len() as i64,
        })
    }

    async fn discard(&self, filename: &str) -> Result<()> {
        // Only names this store generated, never paths
        if filename.contains(['/', '\\']) || filename.starts_with('.') {
            warn!(%filename, "Refusing to discard unexpected upload name");
            return Ok(());
        }
        match tokio::fs::remove_file(self.root.join(filename)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
