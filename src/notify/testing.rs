//! Sinks for tests

use serde_json::Value;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::NotifyError;
use crate::notify::notifier::ChangeNotification;
use crate::notify::sink::NotificationSink;

/// Records every emitted notification
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(String, ChangeNotification)>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<(String, ChangeNotification)> {
        self.events.lock().unwrap().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn emit(&self, topic: &str, payload: &Value) -> Result<(), NotifyError> {
        let notification: ChangeNotification = serde_json::from_value(payload.clone())?;
        self.events
            .lock()
            .unwrap()
            .push((topic.to_string(), notification));
        Ok(())
    }
}

/// Rejects everything, counting attempts
#[derive(Default)]
pub struct FailingSink {
    attempts: AtomicUsize,
}

impl FailingSink {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl NotificationSink for FailingSink {
    fn emit(&self, _topic: &str, _payload: &Value) -> Result<(), NotifyError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(NotifyError::Rejected("observers unreachable".into()))
    }
}

pub struct PanickingSink;

impl NotificationSink for PanickingSink {
    fn emit(&self, _topic: &str, _payload: &Value) -> Result<(), NotifyError> {
        panic!("sink exploded");
    }
}
