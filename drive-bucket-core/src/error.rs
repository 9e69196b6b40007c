//! Error types for the sync pipeline.
//!
//! Only remote failures and invalid configuration surface as errors. Malformed
//! listing entries, folders beyond the nesting limit and native documents
//! without an export format are recorded as skips in the report instead.

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that abort a sync run.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Settings were missing or invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Could not obtain an access token for the Drive API
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Drive API answered with a non-success status
    #[error("Google Drive API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Transport failure talking to the Drive API
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Drive API response could not be decoded
    #[error("Failed to parse API response: {0}")]
    Parse(String),

    /// The source byte stream broke off mid-transfer
    #[error("Source stream failed: {0}")]
    Stream(String),

    /// Object storage rejected a write
    #[error("Storage error: {0}")]
    Storage(#[from] opendal::Error),
}

/// Result type for sync operations
pub type Result<T> = std::result::Result<T, SyncError>;
