//! Database repositories for data access layer
//!
//! Each repository wraps a `PgPool` and owns the queries for one table.

pub mod documents;
pub mod users;

pub use documents::DocumentRepository;
pub use users::UserRepository;
