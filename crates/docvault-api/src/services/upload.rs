//! Document upload service.
//!
//! Upload is a two-step operation: the blob is written to storage first,
//! then the metadata row is inserted. If the insert fails the blob is
//! deleted so no unreferenced file stays behind.

use chrono::{DateTime, Utc};
use docvault_core::models::Document;
use docvault_core::{validation, AppError};
use docvault_db::DocumentRepository;
use docvault_storage::Storage;
use std::sync::Arc;
use uuid::Uuid;

pub struct DocumentUploadService {
    documents: DocumentRepository,
    storage: Arc<dyn Storage>,
}

pub struct UploadRequest {
    pub owner_id: Uuid,
    pub name: String,
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl DocumentUploadService {
    pub fn new(documents: DocumentRepository, storage: Arc<dyn Storage>) -> Self {
        Self { documents, storage }
    }

    /// Validate and persist a new document.
    #[tracing::instrument(
        skip(self, request),
        fields(owner_id = %request.owner_id, file_size = request.data.len())
    )]
    pub async fn upload(
        &self,
        request: UploadRequest,
        now: DateTime<Utc>,
    ) -> Result<Document, AppError> {
        validation::validate_new_document(
            &request.name,
            &request.filename,
            &request.content_type,
            request.data.len(),
            request.expires_at,
            now,
        )?;

        // Stored under a fresh name so concurrent uploads never collide.
        let stored_filename = format!("{}.pdf", Uuid::new_v4());

        let (storage_key, _url) = self
            .storage
            .upload(
                request.owner_id,
                &stored_filename,
                &request.content_type,
                request.data,
            )
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        match self
            .documents
            .create(
                request.owner_id,
                request.name.trim(),
                &storage_key,
                request.expires_at,
            )
            .await
        {
            Ok(document) => Ok(document),
            Err(db_error) => {
                // Compensate: the metadata insert failed, so the blob must go.
                if let Err(cleanup_error) = self.storage.delete(&storage_key).await {
                    tracing::error!(
                        storage_key = %storage_key,
                        error = %cleanup_error,
                        "Failed to clean up orphaned blob after insert failure"
                    );
                } else {
                    tracing::warn!(
                        storage_key = %storage_key,
                        "Rolled back stored blob after insert failure"
                    );
                }
                Err(db_error)
            }
        }
    }
}
