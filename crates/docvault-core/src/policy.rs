//! Authorization policy.
//!
//! Every handler routes ownership decisions through [`authorize`] instead of
//! comparing ids inline, so the access rules live in one place.

use uuid::Uuid;

use crate::models::Document;

/// Actions an authenticated user can attempt on documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// List documents. Results are always scoped to the actor's own documents.
    ViewAny,
    /// Read a single document's metadata or content.
    View,
    /// Upload a new document.
    Create,
    /// Change a document, including archiving it.
    Update,
    /// Remove a document.
    Delete,
    /// Clear a document's archive marker.
    Restore,
}

/// Decides whether `actor_id` may perform `capability` on `document`.
///
/// `ViewAny` and `Create` never reference a specific document and always
/// pass. Everything else requires the actor to own the document; a missing
/// document is denied rather than treated as a policy error.
pub fn authorize(capability: Capability, actor_id: Uuid, document: Option<&Document>) -> bool {
    match capability {
        Capability::ViewAny | Capability::Create => true,
        Capability::View
        | Capability::Update
        | Capability::Delete
        | Capability::Restore => document.map(|d| d.owner_id == actor_id).unwrap_or(false),
    }
}
