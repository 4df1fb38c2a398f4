//! Error types
//!
//! Defines the failure taxonomy shared by the stores, the notifier and the server.

use std::fmt;
use std::io;

/// Broad failure category, used by the adapter to pick a response code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidInput,
    AccessDenied,
    NotFound,
    Conflict,
    MalformedPayload,
    StorageFailure,
}

/// Store module errors
#[derive(Debug)]
pub enum StoreError {
    InvalidName(String),
    InvalidKey(String),
    MissingClientId,
    MissingParameter(&'static str),
    UnsupportedType(String),
    InvalidJson(String),
    AccessDenied(String),
    NotFound(String),
    AlreadyExists(String),
    Storage(io::Error),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::InvalidName(_)
            | StoreError::InvalidKey(_)
            | StoreError::MissingClientId
            | StoreError::MissingParameter(_)
            | StoreError::UnsupportedType(_) => ErrorKind::InvalidInput,
            StoreError::InvalidJson(_) => ErrorKind::MalformedPayload,
            StoreError::AccessDenied(_) => ErrorKind::AccessDenied,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::AlreadyExists(_) => ErrorKind::Conflict,
            StoreError::Storage(_) => ErrorKind::StorageFailure,
        }
    }

    /// Stable signal name reported to callers.
    pub fn signal(&self) -> &'static str {
        match self {
            StoreError::InvalidName(_) => "INVALID_NAME",
            StoreError::InvalidKey(_) => "INVALID_KEY",
            StoreError::MissingClientId => "MISSING_CLIENT_ID",
            StoreError::MissingParameter(_) => "MISSING_PARAMETER",
            StoreError::UnsupportedType(_) => "UNSUPPORTED_TYPE",
            StoreError::InvalidJson(_) => "INVALID_JSON",
            StoreError::AccessDenied(_) => "FORBIDDEN",
            StoreError::NotFound(_) => "NOT_FOUND",
            StoreError::AlreadyExists(_) => "ALREADY_EXISTS",
            StoreError::Storage(_) => "STORAGE_FAILURE",
        }
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::InvalidName(n) => write!(
                f,
                "Invalid filename '{}': must be 1-64 characters without path separators",
                n
            ),
            StoreError::InvalidKey(k) => write!(f, "Invalid key format: {}", k),
            StoreError::MissingClientId => write!(f, "Client ID is required"),
            StoreError::MissingParameter(p) => write!(f, "Parameter '{}' is required", p),
            StoreError::UnsupportedType(t) => {
                write!(f, "Only file sources are supported (got '{}')", t)
            }
            StoreError::InvalidJson(e) => write!(f, "Invalid JSON data: {}", e),
            StoreError::AccessDenied(p) => {
                write!(f, "Access denied: '{}' is outside the allowed directory", p)
            }
            StoreError::NotFound(p) => write!(f, "Not found: {}", p),
            StoreError::AlreadyExists(p) => write!(
                f,
                "File already exists: {}. Use overwrite to replace it",
                p
            ),
            StoreError::Storage(e) => write!(f, "Storage error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(error: io::Error) -> Self {
        StoreError::Storage(error)
    }
}

/// Notification delivery errors. Never surfaced to the writer that triggered them.
#[derive(Debug)]
pub enum NotifyError {
    Rejected(String),
    Serialization(serde_json::Error),
    SinkPanicked,
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyError::Rejected(msg) => write!(f, "Sink rejected notification: {}", msg),
            NotifyError::Serialization(e) => write!(f, "Failed to serialize notification: {}", e),
            NotifyError::SinkPanicked => write!(f, "Sink panicked while emitting notification"),
        }
    }
}

impl std::error::Error for NotifyError {}

impl From<serde_json::Error> for NotifyError {
    fn from(error: serde_json::Error) -> Self {
        NotifyError::Serialization(error)
    }
}

/// Top-level error for server start-up and operation
#[derive(Debug)]
pub enum ServerError {
    Config(config::ConfigError),
    Io(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ServerError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<config::ConfigError> for ServerError {
    fn from(error: config::ConfigError) -> Self {
        ServerError::Config(error)
    }
}

impl From<io::Error> for ServerError {
    fn from(error: io::Error) -> Self {
        ServerError::Io(error)
    }
}
