//! Input validation for document operations.
//!
//! All checks take `now` as a parameter rather than reading the clock, so the
//! expiry window boundaries can be tested exactly.

use chrono::{DateTime, Days, Months, NaiveTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Maximum length of a document name, in characters.
pub const MAX_NAME_LEN: usize = 255;

/// Maximum accepted upload size: 10 MiB.
pub const MAX_FILE_SIZE_BYTES: usize = 10 * 1024 * 1024;

/// A single failed check, tied to the input field that caused it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Collection of per-field validation failures.
///
/// All checks for a request run to completion before this is returned, so a
/// client sees every problem at once instead of fixing them one at a time.
#[derive(Debug, Clone, Default, Serialize, thiserror::Error)]
#[error("Validation failed: {}", summarize(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// Earliest acceptable expiry: the start of the day one week from `now`.
pub fn expiry_floor(now: DateTime<Utc>) -> DateTime<Utc> {
    (now + Days::new(7))
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc()
}

/// First moment past the acceptable range: the start of the day after the
/// date five years from `now`. An expiry on the five-year boundary day itself
/// is still accepted.
pub fn expiry_cap(now: DateTime<Utc>) -> DateTime<Utc> {
    ((now + Months::new(60)).date_naive() + Days::new(1))
        .and_time(NaiveTime::MIN)
        .and_utc()
}

/// Validates the metadata and file attributes of a new document upload.
///
/// Returns every failed check at once. `file_size` is the byte length of the
/// uploaded payload; `content_type` is the multipart part's declared type.
pub fn validate_new_document(
    name: &str,
    filename: &str,
    content_type: &str,
    file_size: usize,
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    let name = name.trim();
    if name.is_empty() {
        errors.push(FieldError::new("name", "name is required"));
    } else if name.chars().count() > MAX_NAME_LEN {
        errors.push(FieldError::new(
            "name",
            format!("name must be at most {} characters", MAX_NAME_LEN),
        ));
    }

    let extension_ok = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    let content_type_ok = content_type
        .split(';')
        .next()
        .map(|t| t.trim().eq_ignore_ascii_case("application/pdf"))
        .unwrap_or(false);
    if !extension_ok || !content_type_ok {
        errors.push(FieldError::new("file", "file must be a PDF document"));
    }

    if file_size == 0 {
        errors.push(FieldError::new("file", "file is empty"));
    } else if file_size > MAX_FILE_SIZE_BYTES {
        errors.push(FieldError::new(
            "file",
            format!("file must be at most {} bytes", MAX_FILE_SIZE_BYTES),
        ));
    }

    if let Some(expires_at) = expires_at {
        let floor = expiry_floor(now);
        let cap = expiry_cap(now);
        if expires_at < floor {
            errors.push(FieldError::new(
                "expires_at",
                "expiry must be at least one week away",
            ));
        } else if expires_at >= cap {
            errors.push(FieldError::new(
                "expires_at",
                "expiry must be within five years",
            ));
        }
    }

    errors.into_result()
}

/// Validates an archive timestamp supplied as epoch seconds.
///
/// `None` clears the archive marker and is always valid. A timestamp must be
/// non-negative and must not lie in the future relative to `now`.
pub fn validate_archived_at(
    archived_at: Option<i64>,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, ValidationErrors> {
    let Some(ts) = archived_at else {
        return Ok(None);
    };

    let mut errors = ValidationErrors::new();
    if ts < 0 {
        errors.push(FieldError::new(
            "archived_at",
            "archive timestamp must not be negative",
        ));
    } else if ts > now.timestamp() {
        errors.push(FieldError::new(
            "archived_at",
            "archive timestamp must not be in the future",
        ));
    }
    errors.into_result()?;

    match DateTime::from_timestamp(ts, 0) {
        Some(dt) => Ok(Some(dt)),
        None => {
            let mut errors = ValidationErrors::new();
            errors.push(FieldError::new(
                "archived_at",
                "archive timestamp is out of range",
            ));
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap()
    }

    fn valid(expires_at: Option<DateTime<Utc>>) -> Result<(), ValidationErrors> {
        validate_new_document(
            "Quarterly report",
            "report.pdf",
            "application/pdf",
            1024,
            expires_at,
            now(),
        )
    }

    #[test]
    fn accepts_a_well_formed_upload() {
        assert!(valid(None).is_ok());
    }

    #[test]
    fn rejects_empty_and_overlong_names() {
        let err = validate_new_document("", "a.pdf", "application/pdf", 1, None, now())
            .unwrap_err();
        assert_eq!(err.errors[0].field, "name");

        let long = "x".repeat(256);
        let err = validate_new_document(&long, "a.pdf", "application/pdf", 1, None, now())
            .unwrap_err();
        assert_eq!(err.errors[0].field, "name");

        let ok = "x".repeat(255);
        assert!(validate_new_document(&ok, "a.pdf", "application/pdf", 1, None, now()).is_ok());
    }

    #[test]
    fn rejects_non_pdf_files() {
        let err = validate_new_document(
            "Doc",
            "notes.txt",
            "text/plain",
            1,
            None,
            now(),
        )
        .unwrap_err();
        assert!(err.errors.iter().any(|e| e.field == "file"));

        // Extension alone is not enough; the declared type must match too.
        let err = validate_new_document(
            "Doc",
            "notes.pdf",
            "application/octet-stream",
            1,
            None,
            now(),
        )
        .unwrap_err();
        assert!(err.errors.iter().any(|e| e.field == "file"));

        // Case and charset suffix are tolerated.
        assert!(validate_new_document(
            "Doc",
            "NOTES.PDF",
            "Application/PDF; charset=binary",
            1,
            None,
            now(),
        )
        .is_ok());
    }

    #[test]
    fn enforces_the_size_limit() {
        assert!(
            validate_new_document("Doc", "a.pdf", "application/pdf", MAX_FILE_SIZE_BYTES, None, now())
                .is_ok()
        );
        let err = validate_new_document(
            "Doc",
            "a.pdf",
            "application/pdf",
            MAX_FILE_SIZE_BYTES + 1,
            None,
            now(),
        )
        .unwrap_err();
        assert!(err.errors.iter().any(|e| e.field == "file"));

        let err =
            validate_new_document("Doc", "a.pdf", "application/pdf", 0, None, now()).unwrap_err();
        assert!(err.errors.iter().any(|e| e.field == "file"));
    }

    #[test]
    fn expiry_window_boundaries() {
        // now = 2024-03-15 10:30 UTC, so the floor is 2024-03-22 00:00.
        let floor = expiry_floor(now());
        assert_eq!(floor, Utc.with_ymd_and_hms(2024, 3, 22, 0, 0, 0).unwrap());
        assert!(valid(Some(floor)).is_ok());
        assert!(valid(Some(floor - chrono::Duration::seconds(1))).is_err());

        // The cap excludes the first instant after the five-year boundary day.
        let cap = expiry_cap(now());
        assert_eq!(cap, Utc.with_ymd_and_hms(2029, 3, 16, 0, 0, 0).unwrap());
        assert!(valid(Some(cap - chrono::Duration::seconds(1))).is_ok());
        assert!(valid(Some(cap)).is_err());
    }

    #[test]
    fn collects_multiple_failures_at_once() {
        let err = validate_new_document(
            "",
            "notes.txt",
            "text/plain",
            0,
            Some(now()),
            now(),
        )
        .unwrap_err();
        let fields: Vec<&str> = err.errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"name"));
        assert!(fields.contains(&"file"));
        assert!(fields.contains(&"expires_at"));
        assert!(err.errors.len() >= 4);
    }

    #[test]
    fn archive_timestamp_rules() {
        assert_eq!(validate_archived_at(None, now()).unwrap(), None);

        let ts = now().timestamp();
        assert_eq!(
            validate_archived_at(Some(ts), now()).unwrap(),
            DateTime::from_timestamp(ts, 0)
        );

        assert!(validate_archived_at(Some(ts + 1), now()).is_err());
        assert!(validate_archived_at(Some(-1), now()).is_err());
        assert_eq!(
            validate_archived_at(Some(0), now()).unwrap(),
            DateTime::from_timestamp(0, 0)
        );
    }
}
