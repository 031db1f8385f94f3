//! Database access layer for docvault.

pub mod db;

pub use db::{DocumentRepository, UserRepository};
