//! Local filesystem storage provider.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::StreamExt;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use attachhub_core::error::{AppError, ErrorKind};
use attachhub_core::result::AppResult;
use attachhub_core::traits::storage::{ByteStream, StorageProvider};

/// Suffix of the scratch file a write goes through before it is renamed
/// into place.
const PARTIAL_SUFFIX: &str = ".partial";

/// Local filesystem storage provider.
#[derive(Debug, Clone)]
pub struct LocalStorageProvider {
    /// Root directory for all stored files.
    root: PathBuf,
}

impl LocalStorageProvider {
    /// Create a new local storage provider rooted at the given path.
    pub async fn new(root_path: impl AsRef<Path>) -> AppResult<Self> {
        let root = root_path.as_ref().to_path_buf();
        fs::create_dir_all(&root).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create storage root: {}", root.display()),
                e,
            )
        })?;
        Ok(Self { root })
    }

    /// The storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path to an absolute path within the root.
    fn resolve(&self, path: &str) -> PathBuf {
        let clean = path.trim_start_matches('/');
        self.root.join(clean)
    }

    /// Ensure the parent directory of a path exists.
    async fn ensure_parent(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Write `data` to a scratch file beside `full_path` and rename it into
    /// place. The scratch file is removed again if any step fails.
    async fn write_through_scratch(&self, path: &str, full_path: &Path, data: &Bytes) -> AppResult<()> {
        let mut scratch = full_path.as_os_str().to_owned();
        scratch.push(PARTIAL_SUFFIX);
        let scratch = PathBuf::from(scratch);

        let result = fill_and_rename(path, &scratch, full_path, data).await;
        if result.is_err() {
            if let Err(e) = fs::remove_file(&scratch).await {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path, error = %e, "Failed to remove scratch file");
                }
            }
        }
        result
    }
}

async fn fill_and_rename(path: &str, scratch: &Path, full_path: &Path, data: &Bytes) -> AppResult<()> {
    let mut file = fs::File::create(scratch).await.map_err(|e| {
        AppError::with_source(ErrorKind::Storage, format!("Failed to create file: {path}"), e)
    })?;
    file.write_all(data).await.map_err(|e| {
        AppError::with_source(ErrorKind::Storage, format!("Failed to write file: {path}"), e)
    })?;
    file.sync_all()
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to flush file", e))?;
    drop(file);

    fs::rename(scratch, full_path).await.map_err(|e| {
        AppError::with_source(
            ErrorKind::Storage,
            format!("Failed to move file into place: {path}"),
            e,
        )
    })
}

fn open_error(path: &str, e: std::io::Error) -> AppError {
    if e.kind() == std::io::ErrorKind::NotFound {
        AppError::not_found(format!("File not found: {path}"))
    } else {
        AppError::with_source(ErrorKind::Storage, format!("Failed to open file: {path}"), e)
    }
}

#[async_trait]
impl StorageProvider for LocalStorageProvider {
    fn locate(&self, path: &str) -> PathBuf {
        self.resolve(path)
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(fs::metadata(&self.root)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false))
    }

    async fn read(&self, path: &str) -> AppResult<ByteStream> {
        let full_path = self.resolve(path);
        let file = fs::File::open(&full_path)
            .await
            .map_err(|e| open_error(path, e))?;

        let stream = ReaderStream::new(file);
        Ok(Box::pin(stream.map(|r| r.map(|b| b.into()))))
    }

    /// Writes land in a scratch file first and are renamed into place, so a
    /// reader never observes half-written content. Existing keys are never
    /// replaced.
    async fn write(&self, path: &str, data: Bytes) -> AppResult<()> {
        let full_path = self.resolve(path);
        if full_path.exists() {
            return Err(AppError::conflict(format!("Storage key already in use: {path}")));
        }
        self.ensure_parent(&full_path).await?;
        self.write_through_scratch(path, &full_path, &data).await?;

        debug!(path, bytes = data.len(), "Wrote file");
        Ok(())
    }

    async fn delete(&self, path: &str) -> AppResult<()> {
        let full_path = self.resolve(path);
        if full_path.exists() {
            fs::remove_file(&full_path).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to delete file: {path}"),
                    e,
                )
            })?;
            debug!(path, "Deleted file");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn provider() -> (tempfile::TempDir, LocalStorageProvider) {
        let dir = tempfile::tempdir().unwrap();
        let provider = LocalStorageProvider::new(dir.path()).await.unwrap();
        (dir, provider)
    }

    async fn read_all(provider: &LocalStorageProvider, path: &str) -> Vec<u8> {
        let mut stream = provider.read(path).await.unwrap();
        let mut collected = Vec::new();
        while let Some(chunk) = stream.next().await {
            collected.extend_from_slice(&chunk.unwrap());
        }
        collected
    }

    #[tokio::test]
    async fn test_write_read_delete() {
        let (_dir, provider) = provider().await;

        provider.write("test/file.txt", Bytes::from("hello world")).await.unwrap();

        assert_eq!(read_all(&provider, "test/file.txt").await, b"hello world");

        let on_disk = std::fs::read(provider.locate("test/file.txt")).unwrap();
        assert_eq!(on_disk, b"hello world");
        assert!(!provider.locate("test/file.txt.partial").exists());

        provider.delete("test/file.txt").await.unwrap();
        assert!(!provider.locate("test/file.txt").exists());
        provider.delete("test/file.txt").await.unwrap();
    }

    #[tokio::test]
    async fn test_write_never_replaces_existing_key() {
        let (_dir, provider) = provider().await;

        provider.write("a/b", Bytes::from("v1")).await.unwrap();
        let err = provider.write("a/b", Bytes::from("v2")).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert_eq!(read_all(&provider, "a/b").await, b"v1");
    }

    #[tokio::test]
    async fn test_failed_rename_removes_scratch_file() {
        let (_dir, provider) = provider().await;

        // A non-empty directory cannot be replaced by a file.
        let target = provider.locate("taken");
        std::fs::create_dir_all(target.join("inner")).unwrap();

        let err = provider
            .write_through_scratch("taken", &target, &Bytes::from("data"))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Storage);
        assert!(!provider.locate("taken.partial").exists());
        assert!(target.join("inner").is_dir());
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let (_dir, provider) = provider().await;
        let err = provider.read("nope").await.err().unwrap();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_health_check_tracks_root() {
        let (dir, provider) = provider().await;
        assert!(provider.health_check().await.unwrap());

        std::fs::remove_dir_all(dir.path()).unwrap();
        assert!(!provider.health_check().await.unwrap());
    }
}
