//! Domain error types
//!
//! This module defines the error hierarchy for eln-backup.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main backup error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum BackupError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Missing or unusable credentials
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Remote ELN API errors
    #[error("Nucleus API error: {0}")]
    Nucleus(#[from] NucleusError),

    /// Export process errors
    #[error("Export error: {0}")]
    Export(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Mirror/sync step errors
    #[error("Sync error: {0}")]
    Sync(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// CSV encoding errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Errors raised at the HTTP boundary with the ELN platform
///
/// Every variant that concerns a single remote item carries the item id,
/// so a failure surfaced by a worker pool can be traced back to it.
#[derive(Debug, Error)]
pub enum NucleusError {
    /// Could not reach the server
    #[error("Failed to connect to {endpoint} for {item_id}: {message}")]
    ConnectionFailed {
        endpoint: String,
        item_id: String,
        message: String,
    },

    /// Server answered with a non-success status
    #[error("{endpoint} failed for {item_id} with status {status}: {body}")]
    RequestFailed {
        endpoint: String,
        item_id: String,
        status: u16,
        body: String,
    },

    /// Response body did not match the expected schema
    #[error("Invalid response from {endpoint} for {item_id}: {message}")]
    InvalidResponse {
        endpoint: String,
        item_id: String,
        message: String,
    },

    /// Presigned download returned a non-success status
    #[error("Failed to download file {file_id}: status {status}")]
    DownloadFailed { file_id: String, status: u16 },

    /// Request exceeded the configured timeout
    #[error("Request timeout after {seconds}s: {context}")]
    Timeout { context: String, seconds: u64 },
}

impl NucleusError {
    /// Identifier of the remote item the error concerns
    pub fn item_id(&self) -> Option<&str> {
        match self {
            NucleusError::ConnectionFailed { item_id, .. }
            | NucleusError::RequestFailed { item_id, .. }
            | NucleusError::InvalidResponse { item_id, .. } => Some(item_id),
            NucleusError::DownloadFailed { file_id, .. } => Some(file_id),
            NucleusError::Timeout { .. } => None,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for BackupError {
    fn from(err: std::io::Error) -> Self {
        BackupError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for BackupError {
    fn from(err: serde_json::Error) -> Self {
        BackupError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for BackupError {
    fn from(err: toml::de::Error) -> Self {
        BackupError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<csv::Error> for BackupError {
    fn from(err: csv::Error) -> Self {
        BackupError::Csv(err.to_string())
    }
}
