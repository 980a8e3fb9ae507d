//! Shared leaf types for the SyncTeX bridge.
//!
//! This crate holds the small pieces every other crate in the workspace
//! depends on and nothing else:
//!
//! - **ErrorLocation**: call-site capture attached to every error variant
//! - **SharedSecret**: the inverse-search capability token
//!
//! It has no knowledge of viewers, editors or the wire protocol.

pub mod error;
pub mod shared_secret;

#[cfg(test)]
mod tests;

pub use error::error_location::ErrorLocation;
pub use error::redact_error::RedactError;
pub use shared_secret::SharedSecret;
