use std::path::PathBuf;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;

/// Where finished exports are delivered, the local stand-in for a browser
/// download.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Delivers `bytes` under `file_name` and returns where they went.
    async fn deliver(&self, file_name: &str, bytes: Bytes) -> Result<PathBuf, AppError>;
}

/// Writes each download into a fixed directory.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl DownloadSink for DirectorySink {
    async fn deliver(&self, file_name: &str, bytes: Bytes) -> Result<PathBuf, AppError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            AppError::ExportFailure(format!("cannot create {}: {e}", self.dir.display()))
        })?;

        let path = self.dir.join(file_name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| AppError::ExportFailure(format!("cannot write {}: {e}", path.display())))?;

        info!(path = %path.display(), bytes = bytes.len(), "Download written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_directory_sink_creates_dir_and_writes() {
        let root = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(root.path().join("out"));
        let path = sink
            .deliver("resume.json", Bytes::from_static(b"{}"))
            .await
            .unwrap();
        assert_eq!(path, root.path().join("out").join("resume.json"));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"{}");
    }

    #[tokio::test]
    async fn test_directory_sink_failure_is_export_failure() {
        let root = tempfile::tempdir().unwrap();
        let blocker = root.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let sink = DirectorySink::new(blocker.join("nested"));
        let result = sink.deliver("a.pdf", Bytes::from_static(b"%PDF")).await;
        assert!(matches!(result, Err(AppError::ExportFailure(_))));
    }
}
