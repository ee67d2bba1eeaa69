//! Error types for the Pulse application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Pulse application.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum PulseError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound { entity_type: String, id: String },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "JSON", "XML", etc.
        message: String,
    },

    /// Uploaded file was rejected (wrong extension, bad signature, oversize)
    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    /// Request-level validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// The analysis endpoint failed or returned a non-success status
    #[error("Analysis request failed: {0}")]
    Analysis(String),

    /// A run was triggered while another one is still in flight
    #[error("A run is already in progress")]
    RunInProgress,

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PulseError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an InvalidUpload error
    pub fn invalid_upload(message: impl Into<String>) -> Self {
        Self::InvalidUpload(message.into())
    }

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates an Analysis error
    pub fn analysis(message: impl Into<String>) -> Self {
        Self::Analysis(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error should be reported as a caller mistake rather than
    /// a server-side failure
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            Self::InvalidUpload(_) | Self::Validation(_) | Self::Serialization { .. }
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for PulseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for PulseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, PulseError>`.
pub type Result<T> = std::result::Result<T, PulseError>;
