//! Error handling for Amber
//!
//! This module provides error types and result aliases for share
//! persistence operations.

use std::io;
use thiserror::Error;

/// Errors that can occur in share persistence operations
#[derive(Error, Debug)]
pub enum Error {
    /// Errors related to storage tier operations
    #[error("Storage error: {0}")]
    Storage(String),

    /// Errors related to I/O operations
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Errors related to the structured on-device database
    #[error("Database error: {0}")]
    Database(String),

    /// Errors related to the remote HTTP backend
    #[error("Remote error: {0}")]
    Remote(String),

    /// Errors related to encoding or decoding link payloads
    #[error("Codec error: {0}")]
    Codec(String),

    /// Errors related to shareable link construction or parsing
    #[error("Link error: {0}")]
    Link(String),

    /// Errors related to configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors related to storage quota exhaustion
    #[error("Quota exceeded: {0}")]
    Quota(String),

    /// The requested share does not exist
    #[error("Share not found: {0}")]
    NotFound(String),

    /// Generic error type for other cases
    #[error("{0}")]
    Other(String),
}

/// Result type for share persistence operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a new storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create a new database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }

    /// Create a new remote error
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote(message.into())
    }

    /// Create a new codec error
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec(message.into())
    }

    /// Create a new link error
    pub fn link(message: impl Into<String>) -> Self {
        Self::Link(message.into())
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new quota error
    pub fn quota(message: impl Into<String>) -> Self {
        Self::Quota(message.into())
    }

    /// Create a new not-found error for a share identifier
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    /// Create a new generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Check if this is a not-found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a quota error
    pub fn is_quota_error(&self) -> bool {
        matches!(self, Self::Quota(_))
    }

    /// Check if this is an I/O error
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Io(_))
    }

    /// Check if this is a serialization error
    pub fn is_serialization_error(&self) -> bool {
        matches!(self, Self::Serialization(_))
    }

    /// Check if this is a remote error
    pub fn is_remote_error(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Check if this is a codec error
    pub fn is_codec_error(&self) -> bool {
        matches!(self, Self::Codec(_))
    }

    /// Get a developer-friendly description of the error
    pub fn dev_description(&self) -> String {
        match self {
            Self::Storage(msg) => format!("Storage error: {}", msg),
            Self::Io(err) => format!("I/O error: {}", err),
            Self::Serialization(err) => format!("Serialization error: {}", err),
            Self::Database(msg) => format!("Database error: {}", msg),
            Self::Remote(msg) => format!("Remote error: {}", msg),
            Self::Codec(msg) => format!("Codec error: {}", msg),
            Self::Link(msg) => format!("Link error: {}", msg),
            Self::Config(msg) => format!("Configuration error: {}", msg),
            Self::Quota(msg) => format!("Quota exceeded: {}", msg),
            Self::NotFound(id) => format!("Share not found: {}", id),
            Self::Other(msg) => format!("Error: {}", msg),
        }
    }

    /// Get a user-friendly suggestion for resolving the error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Io(err) if err.kind() == io::ErrorKind::NotFound => {
                Some("The specified file or directory does not exist".to_string())
            }
            Self::Io(err) if err.kind() == io::ErrorKind::PermissionDenied => {
                Some("You don't have permission to access this file or directory".to_string())
            }
            Self::Remote(_) => {
                Some("Check network connectivity and the configured base URL".to_string())
            }
            Self::Quota(_) => {
                Some("Free storage by removing old shares or raise the quota".to_string())
            }
            Self::NotFound(_) => Some(
                "The share may have been removed by cleanup or never replicated to this device"
                    .to_string(),
            ),
            Self::Codec(_) => {
                Some("The link payload is damaged or was produced by an incompatible version".to_string())
            }
            _ => None,
        }
    }
}

// Conversion from rusqlite error to Amber error
impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

// Conversion from reqwest error to Amber error
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Remote(err.to_string())
    }
}

// Conversion from URL parse error to Amber error
impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::Link(err.to_string())
    }
}

// Conversion from base64 decode error to Amber error
impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Self::Codec(format!("Invalid token encoding: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        // Test various error creation methods
        let storage_err = Error::storage("Failed to write blob");
        assert!(matches!(storage_err, Error::Storage(_)));

        let quota_err = Error::quota("5 KiB over limit");
        assert!(matches!(quota_err, Error::Quota(_)));
        assert!(quota_err.is_quota_error());

        let missing = Error::not_found("abc-123");
        assert!(missing.is_not_found());
        assert_eq!(missing.to_string(), "Share not found: abc-123");
    }

    #[test]
    fn test_error_conversion() {
        // Test conversion from io::Error
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
        assert!(err.is_io_error());

        // Test conversion from serde_json::Error
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = Error::from(json_err);
        assert!(matches!(err, Error::Serialization(_)));
        assert!(err.is_serialization_error());

        // Test conversion from url::ParseError
        let url_err = url::Url::parse("::not a url::").unwrap_err();
        let err = Error::from(url_err);
        assert!(matches!(err, Error::Link(_)));
    }

    #[test]
    fn test_error_description_and_suggestion() {
        let err = Error::quota("blob of 9000 bytes exceeds quota");
        assert!(err.dev_description().contains("Quota exceeded"));
        assert!(err.suggestion().unwrap().contains("quota"));

        let err = Error::remote("connection refused");
        assert!(err.dev_description().contains("Remote error"));
        assert!(err.suggestion().unwrap().contains("network"));

        let err = Error::storage("opaque failure");
        assert!(err.suggestion().is_none());
    }
}
