//! Storage provider trait for pluggable attachment content backends.

use std::path::PathBuf;
use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;

use crate::result::AppResult;

/// A byte stream type used for reading file contents.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Trait for attachment content backends.
///
/// Keys are relative, `/`-separated paths. A key is written once per
/// content change and never rewritten, so readers of an older key are not
/// disturbed by later writes.
#[async_trait]
pub trait StorageProvider: Send + Sync + std::fmt::Debug + 'static {
    /// Resolve a key to the location a reader can open directly.
    fn locate(&self, path: &str) -> PathBuf;

    /// Check whether the provider is healthy and reachable.
    async fn health_check(&self) -> AppResult<bool>;

    /// Read a file and return its byte stream.
    async fn read(&self, path: &str) -> AppResult<ByteStream>;

    /// Write bytes to a file at the given path.
    async fn write(&self, path: &str, data: Bytes) -> AppResult<()>;

    /// Delete a file at the given path. Deleting a missing key succeeds.
    async fn delete(&self, path: &str) -> AppResult<()>;
}
