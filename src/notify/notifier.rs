//! Settings change notifier

use log::{debug, error};
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::NotifyError;
use crate::notify::sink::NotificationSink;
use crate::storage::results::epoch_millis;

/// Topic carrying settings updates
pub const SETTINGS_UPDATE_TOPIC: &str = "settings-update";

/// Announcement that a settings document was rewritten
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeNotification {
    pub originating_client_id: String,
    pub key: String,
    pub level: String,
    pub timestamp_millis: u64,
}

impl ChangeNotification {
    /// Build a notification stamped with the current wall-clock time
    pub fn now(client_id: &str, key: &str, level: &str) -> Self {
        Self {
            originating_client_id: client_id.to_string(),
            key: key.to_string(),
            level: level.to_string(),
            timestamp_millis: epoch_millis(SystemTime::now()),
        }
    }
}

/// Hands settings updates to a fan-out sink, at most once, without retries
#[derive(Clone)]
pub struct ChangeNotifier {
    sink: Arc<dyn NotificationSink>,
}

impl ChangeNotifier {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    /// Announce a settings update. Failures are logged and swallowed.
    pub fn notify(&self, client_id: &str, key: &str, level: &str) {
        let notification = ChangeNotification::now(client_id, key, level);

        match self.deliver(&notification) {
            Ok(()) => debug!(
                "Notified observers about settings update: {} (level: {}, client: {})",
                key, level, client_id
            ),
            Err(e) => error!(
                "Failed to notify observers about settings update {} (level: {}): {}",
                key, level, e
            ),
        }
    }

    fn deliver(&self, notification: &ChangeNotification) -> Result<(), NotifyError> {
        let payload = serde_json::to_value(notification)?;

        // A misbehaving sink must not take the save path down with it
        panic::catch_unwind(AssertUnwindSafe(|| {
            self.sink.emit(SETTINGS_UPDATE_TOPIC, &payload)
        }))
        .unwrap_or(Err(NotifyError::SinkPanicked))
    }
}
