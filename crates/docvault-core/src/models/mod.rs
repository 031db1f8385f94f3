pub mod document;
pub mod user;

pub use document::{Document, DocumentResponse};
pub use user::User;
