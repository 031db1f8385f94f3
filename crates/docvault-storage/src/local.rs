use crate::keys::generate_storage_key;
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/docvault/documents")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:4000/files")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// Rejects keys with path traversal sequences that could escape the base
    /// storage directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.contains("..") || storage_key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        let path = self.base_path.join(storage_key);

        let base_canonical = self.base_path.canonicalize().map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
        })?;

        if let Ok(canonical) = path.canonicalize() {
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    /// Generate public URL for file
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(
        &self,
        owner_id: Uuid,
        filename: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<(String, String)> {
        let key = generate_storage_key(owner_id, filename);
        let path = self.key_to_path(&key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let url = self.generate_url(&key);

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok((key, url))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(storage_key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Ok(data)
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            // Deleting a missing file is not an error; compensation paths may
            // retry after a partial failure.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "Failed to delete file {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
