//! Error handlers
//!
//! Maps store failures onto response codes for the transport adapter.

use crate::error::types::{ErrorKind, StoreError};
use log::{error, warn};

/// Log a failed operation at a level matching its kind
pub fn handle_error(operation: &str, err: &StoreError) {
    match err.kind() {
        ErrorKind::StorageFailure => error!("{} failed: {}", operation, err),
        _ => warn!("{} rejected ({}): {}", operation, err.signal(), err),
    }
}

/// Convert error to response code
pub fn error_to_status_code(err: &StoreError) -> u16 {
    match err.kind() {
        ErrorKind::InvalidInput => 400,
        ErrorKind::MalformedPayload => 400,
        ErrorKind::AccessDenied => 403,
        ErrorKind::NotFound => 404,
        ErrorKind::Conflict => 409,
        ErrorKind::StorageFailure => 500,
    }
}
