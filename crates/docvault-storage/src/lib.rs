//! Docvault Storage Library
//!
//! Storage abstraction and backends for document blobs. Includes the Storage
//! trait plus S3 and local filesystem implementations.
//!
//! # Storage key format
//!
//! Keys are owner-scoped: `documents/{owner_id}/{filename}`. Keys must not
//! contain `..` or a leading `/`. Key generation is centralized in the `keys`
//! module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use docvault_core::StorageBackend;
pub use factory::create_storage;
pub use keys::generate_storage_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
