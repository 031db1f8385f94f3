use crate::keys::generate_storage_key;
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload};
use uuid::Uuid;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        // Build AmazonS3 object store from environment and explicit settings.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }

    /// Generate public URL for S3 object
    ///
    /// For AWS S3, uses the standard format: https://{bucket}.s3.{region}.amazonaws.com/{key}
    /// For S3-compatible providers, uses the endpoint URL if provided
    fn generate_url(&self, key: &str) -> String {
        public_url(&self.bucket, &self.region, self.endpoint_url.as_deref(), key)
    }
}

fn public_url(bucket: &str, region: &str, endpoint_url: Option<&str>, key: &str) -> String {
    if let Some(endpoint) = endpoint_url {
        // Path-style for compatibility: {endpoint}/{bucket}/{key}
        let base_url = endpoint.trim_end_matches('/');
        format!("{}/{}/{}", base_url, bucket, key)
    } else {
        format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key)
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload(
        &self,
        owner_id: Uuid,
        filename: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<(String, String)> {
        let key = generate_storage_key(owner_id, filename);
        let size = data.len() as u64;
        let bytes = Bytes::from(data);
        let location = Path::from(key.clone());

        let start = std::time::Instant::now();

        self.store
            .put(&location, PutPayload::from(bytes))
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    size_bytes = size,
                    "S3 upload failed"
                );
                StorageError::UploadFailed(e.to_string())
            })?;

        let url = self.generate_url(&key);

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok((key, url))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let location = Path::from(storage_key.to_string());

        let result = self.store.get(&location).await.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(storage_key.to_string()),
            other => StorageError::DownloadFailed(other.to_string()),
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        Ok(bytes.to_vec())
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let location = Path::from(storage_key.to_string());

        match self.store.delete(&location).await {
            Ok(()) => Ok(()),
            // Deleting a missing object is fine; compensation may retry.
            Err(ObjectStoreError::NotFound { .. }) => Ok(()),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    "S3 delete failed"
                );
                Err(StorageError::DeleteFailed(e.to_string()))
            }
        }
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let location = Path::from(storage_key.to_string());

        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::DownloadFailed(e.to_string())),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_generation() {
        let url = public_url("my-bucket", "us-east-1", None, "documents/owner/file.pdf");
        assert_eq!(
            url,
            "https://my-bucket.s3.us-east-1.amazonaws.com/documents/owner/file.pdf"
        );
    }

    #[test]
    fn test_url_generation_with_custom_endpoint() {
        let url = public_url(
            "my-bucket",
            "us-east-1",
            Some("http://localhost:9000/"),
            "documents/owner/file.pdf",
        );
        assert_eq!(
            url,
            "http://localhost:9000/my-bucket/documents/owner/file.pdf"
        );
    }
}
