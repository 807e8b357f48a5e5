//! Error types for the Aparat workspace.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Aparat application.
///
/// Flow failures (`Read`, `Gateway`, `Timeout`) and guard rejections
/// (`Exhausted`, `Busy`) are recoverable: the session controller always
/// returns to a stable hub state before surfacing them.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum AparatError {
    /// Asset ingestion failed (unreadable, empty or corrupt input)
    #[error("Failed to read '{name}': {message}")]
    Read { name: String, message: String },

    /// The generation gateway failed or returned no usable image
    #[error("Generation failed: {0}")]
    Gateway(String),

    /// The generation call did not resolve within the bounded wait
    #[error("Generation timed out after {secs}s")]
    Timeout { secs: u64 },

    /// No generation allowance left in this lock cycle
    #[error("Generation allowance exhausted")]
    Exhausted,

    /// A generation is already in flight
    #[error("A generation is already in progress")]
    Busy,

    /// Event is not valid for the current screen
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", "base64"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data access error (flag store / storage layer)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AparatError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Read error for the named asset
    pub fn read(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Read {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Creates a Gateway error
    pub fn gateway(message: impl Into<String>) -> Self {
        Self::Gateway(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a guard rejection rather than a fault.
    ///
    /// Rejections never dispatch a gateway call and never touch the session.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Exhausted | Self::Busy | Self::InvalidTransition(_))
    }

    /// Check if this error came out of a dispatched generation attempt.
    pub fn is_generation_failure(&self) -> bool {
        matches!(
            self,
            Self::Read { .. } | Self::Gateway(_) | Self::Timeout { .. }
        )
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for AparatError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for AparatError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for AparatError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for AparatError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<base64::DecodeError> for AparatError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Serialization {
            format: "base64".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (used by frontends that wrap library errors)
impl From<anyhow::Error> for AparatError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, AparatError>`.
pub type Result<T> = std::result::Result<T, AparatError>;
