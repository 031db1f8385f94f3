//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait so
/// the upload service and download handler can work against any backend.
///
/// **Key format:** keys are owner-scoped: `documents/{owner_id}/{filename}`.
/// See the crate root documentation.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload a file and return (storage_key, storage_url)
    ///
    /// The storage_key is the internal identifier used to reference the file;
    /// the storage_url is where the file can be fetched from.
    async fn upload(
        &self,
        owner_id: Uuid,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<(String, String)>;

    /// Download a file by its storage key
    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Delete a file by its storage key
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
