use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A stored document and its lifecycle markers.
///
/// `path` is the storage key of the uploaded blob. `archived_at` doubles as
/// the archive flag: a `Some` value means the document is hidden from
/// listings and skipped by expiry notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Document {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub path: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub archived_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

/// Wire representation of a document. Timestamps are epoch seconds.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub path: String,
    pub expires_at: Option<i64>,
    pub archived_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<Document> for DocumentResponse {
    fn from(doc: Document) -> Self {
        DocumentResponse {
            id: doc.id,
            owner_id: doc.owner_id,
            name: doc.name,
            path: doc.path,
            expires_at: doc.expires_at.map(|t| t.timestamp()),
            archived_at: doc.archived_at.map(|t| t.timestamp()),
            created_at: doc.created_at.timestamp(),
            updated_at: doc.updated_at.timestamp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_document_response_from_document() {
        let doc_id = Uuid::new_v4();
        let owner_id = Uuid::new_v4();
        let created_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let updated_at = Utc.with_ymd_and_hms(2024, 3, 2, 8, 30, 0).unwrap();
        let expires_at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

        let document = Document {
            id: doc_id,
            owner_id,
            name: "Insurance policy".to_string(),
            path: format!("documents/{}/policy.pdf", owner_id),
            expires_at: Some(expires_at),
            archived_at: None,
            created_at,
            updated_at,
        };

        let response = DocumentResponse::from(document);

        assert_eq!(response.id, doc_id);
        assert_eq!(response.owner_id, owner_id);
        assert_eq!(response.name, "Insurance policy");
        assert_eq!(response.expires_at, Some(expires_at.timestamp()));
        assert_eq!(response.archived_at, None);
        assert_eq!(response.created_at, created_at.timestamp());
        assert_eq!(response.updated_at, updated_at.timestamp());
    }

    #[test]
    fn timestamps_serialize_as_camel_case_epoch_seconds() {
        let document = Document {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Lease".to_string(),
            path: "documents/x/lease.pdf".to_string(),
            expires_at: None,
            archived_at: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            created_at: Utc.with_ymd_and_hms(2023, 12, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        };

        let response = DocumentResponse::from(document);
        let json = serde_json::to_value(&response).unwrap();

        assert!(json.get("ownerId").is_some());
        assert!(json.get("expiresAt").is_some());
        assert_eq!(json["expiresAt"], serde_json::Value::Null);
        assert_eq!(json["archivedAt"], serde_json::json!(1704067200));
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn archived_flag_tracks_archived_at() {
        let mut document = Document {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            name: "Receipt".to_string(),
            path: "documents/x/receipt.pdf".to_string(),
            expires_at: None,
            archived_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(!document.is_archived());
        document.archived_at = Some(Utc::now());
        assert!(document.is_archived());
    }
}
