//! Expiry notifications for docvault.
//!
//! Contains the SMTP email service and the daily job that warns document
//! owners about upcoming expirations.

pub mod email;
pub mod expiry;

pub use email::EmailService;
pub use expiry::{ExpiryNotifier, OwnerFailure, RunReport};
