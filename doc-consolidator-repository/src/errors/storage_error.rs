//! Storage error types.
//!
//! This module defines the error types that can occur while reading relation
//! sources or writing the document stream.

use thiserror::Error;

/// Errors that can occur during storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// The requested source does not exist.
    #[error("Source not found: {0}")]
    NotFound(String),

    /// Failed to list or read a source.
    #[error("Read error: {0}")]
    ReadError(String),

    /// Failed to write the output stream.
    #[error("Write error: {0}")]
    WriteError(String),

    /// The configured location cannot be used.
    #[error("Invalid location: {0}")]
    InvalidLocation(String),
}

impl StorageError {
    /// Create a not found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a read error.
    pub fn read(msg: impl Into<String>) -> Self {
        Self::ReadError(msg.into())
    }

    /// Create a write error.
    pub fn write(msg: impl Into<String>) -> Self {
        Self::WriteError(msg.into())
    }

    /// Create an invalid location error.
    pub fn invalid_location(msg: impl Into<String>) -> Self {
        Self::InvalidLocation(msg.into())
    }

    /// Whether the error means the source is simply absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
