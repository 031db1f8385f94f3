//! Docvault core library
//!
//! Domain models, validation rules, authorization policy, configuration and the
//! shared error taxonomy. This crate performs no I/O; everything time-dependent
//! takes the current time as an explicit parameter so callers (and tests) can
//! pin it.

pub mod config;
pub mod error;
pub mod models;
pub mod policy;
pub mod storage_types;
pub mod validation;

pub use config::Config;
pub use error::AppError;
pub use storage_types::StorageBackend;
