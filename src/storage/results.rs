//! Storage result types
//!
//! Defines result structures returned by storage operations.

use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// One entry of a document listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentEntry {
    pub name: String,
    /// Last modification time, milliseconds since the Unix epoch
    #[serde(rename = "modified")]
    pub modified_millis: u64,
}

/// Milliseconds since the Unix epoch, clamped to zero for earlier times
pub fn epoch_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
