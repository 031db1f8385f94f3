use chrono::{DateTime, Utc};
use docvault_core::{models::Document, AppError};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const DOCUMENT_COLUMNS: &str =
    "id, owner_id, name, path, expires_at, archived_at, created_at, updated_at";

/// Repository for managing documents
#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new document row
    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "insert"))]
    pub async fn create(
        &self,
        owner_id: Uuid,
        name: &str,
        path: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Document, AppError> {
        let document = sqlx::query_as::<Postgres, Document>(
            r#"
            INSERT INTO documents (owner_id, name, path, expires_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, owner_id, name, path, expires_at, archived_at, created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .bind(path)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(document)
    }

    /// Get document by ID
    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Document>, AppError> {
        let document = sqlx::query_as::<Postgres, Document>(&format!(
            "SELECT {} FROM documents WHERE id = $1",
            DOCUMENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document)
    }

    /// List an owner's non-archived documents, optionally restricted to those
    /// expiring strictly before `expires_before`.
    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select"))]
    pub async fn list_active(
        &self,
        owner_id: Uuid,
        expires_before: Option<DateTime<Utc>>,
    ) -> Result<Vec<Document>, AppError> {
        let documents = sqlx::query_as::<Postgres, Document>(&format!(
            r#"
            SELECT {}
            FROM documents
            WHERE owner_id = $1
              AND archived_at IS NULL
              AND ($2::timestamptz IS NULL OR expires_at < $2)
            ORDER BY created_at ASC
            "#,
            DOCUMENT_COLUMNS
        ))
        .bind(owner_id)
        .bind(expires_before)
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }

    /// Set or clear a document's archive marker, returning the updated row.
    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "update", db.record_id = %id))]
    pub async fn set_archived(
        &self,
        id: Uuid,
        archived_at: Option<DateTime<Utc>>,
    ) -> Result<Option<Document>, AppError> {
        let document = sqlx::query_as::<Postgres, Document>(
            r#"
            UPDATE documents
            SET archived_at = $2, updated_at = now()
            WHERE id = $1
            RETURNING id, owner_id, name, path, expires_at, archived_at, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(archived_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(document)
    }

    /// Non-archived documents whose expiry falls inside `[from, until]`,
    /// inclusive on both ends. Used by the expiry notification job.
    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select"))]
    pub async fn expiring_between(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Document>, AppError> {
        let documents = sqlx::query_as::<Postgres, Document>(&format!(
            r#"
            SELECT {}
            FROM documents
            WHERE archived_at IS NULL
              AND expires_at BETWEEN $1 AND $2
            ORDER BY owner_id, expires_at ASC
            "#,
            DOCUMENT_COLUMNS
        ))
        .bind(from)
        .bind(until)
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }
}
