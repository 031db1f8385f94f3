//! Shared key generation for storage backends.
//!
//! Key format: `documents/{owner_id}/{filename}`.

use uuid::Uuid;

/// Generate a storage key for the given owner and filename.
///
/// All backends must use this format for consistency.
pub fn generate_storage_key(owner_id: Uuid, filename: &str) -> String {
    format!("documents/{}/{}", owner_id, filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_owner_scoped() {
        let owner = Uuid::nil();
        assert_eq!(
            generate_storage_key(owner, "a1b2.pdf"),
            "documents/00000000-0000-0000-0000-000000000000/a1b2.pdf"
        );
    }
}
