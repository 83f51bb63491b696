// src/error.rs
//! Public error types for the entire crate

use std::fmt;

use thiserror::Error;

/// Result type returned by every command and engine operation
pub type OperationResult<T> = std::result::Result<T, CryptoError>;

/// Failures reported by a [`SecureStorage`](crate::storage::SecureStorage) backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("no blob stored under identifier {0}")]
    NotFound(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("key size mismatch for {algorithm}: expected {expected} bytes, got {actual}")]
    KeySizeMismatch {
        algorithm: String,
        expected: usize,
        actual: usize,
    },

    #[error("unsupported key length: {0}")]
    UnsupportedKeyLength(String),

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("data not found: {0}")]
    DataNotFound(String),

    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("{operation} failed ({algorithm}): {reason}")]
    OperationFailed {
        operation: String,
        algorithm: String,
        reason: String,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("{operation} is not implemented by the {engine} engine")]
    OperationNotImplemented { engine: String, operation: String },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Classification of a [`CryptoError`], independent of its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    KeySizeMismatch,
    UnsupportedKeyLength,
    MalformedEnvelope,
    KeyNotFound,
    DataNotFound,
    UnsupportedOperation,
    OperationFailed,
    StorageUnavailable,
    OperationNotImplemented,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::KeySizeMismatch => "key_size_mismatch",
            ErrorKind::UnsupportedKeyLength => "unsupported_key_length",
            ErrorKind::MalformedEnvelope => "malformed_envelope",
            ErrorKind::KeyNotFound => "key_not_found",
            ErrorKind::DataNotFound => "data_not_found",
            ErrorKind::UnsupportedOperation => "unsupported_operation",
            ErrorKind::OperationFailed => "operation_failed",
            ErrorKind::StorageUnavailable => "storage_unavailable",
            ErrorKind::OperationNotImplemented => "operation_not_implemented",
            ErrorKind::Config => "config",
        };
        f.write_str(name)
    }
}

impl CryptoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CryptoError::InvalidInput(_) => ErrorKind::InvalidInput,
            CryptoError::KeySizeMismatch { .. } => ErrorKind::KeySizeMismatch,
            CryptoError::UnsupportedKeyLength(_) => ErrorKind::UnsupportedKeyLength,
            CryptoError::MalformedEnvelope(_) => ErrorKind::MalformedEnvelope,
            CryptoError::KeyNotFound(_) => ErrorKind::KeyNotFound,
            CryptoError::DataNotFound(_) => ErrorKind::DataNotFound,
            CryptoError::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
            CryptoError::OperationFailed { .. } => ErrorKind::OperationFailed,
            CryptoError::Storage(_) => ErrorKind::StorageUnavailable,
            CryptoError::OperationNotImplemented { .. } => ErrorKind::OperationNotImplemented,
            CryptoError::Config(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn operation_failed(
        operation: impl Into<String>,
        algorithm: impl fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        CryptoError::OperationFailed {
            operation: operation.into(),
            algorithm: algorithm.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn key_size(algorithm: impl fmt::Display, expected: usize, actual: usize) -> Self {
        CryptoError::KeySizeMismatch {
            algorithm: algorithm.to_string(),
            expected,
            actual,
        }
    }
}

impl From<toml::de::Error> for CryptoError {
    fn from(err: toml::de::Error) -> Self {
        CryptoError::Config(err.to_string())
    }
}
