//! Fan-out sinks
//!
//! A sink takes `(topic, payload)` pairs and hands them to every connected
//! observer. Emitting must never block the caller.

use log::debug;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::error::NotifyError;

/// Destination for notification payloads
pub trait NotificationSink: Send + Sync {
    /// Hand `payload` to all observers of `topic` without blocking.
    fn emit(&self, topic: &str, payload: &Value) -> Result<(), NotifyError>;
}

/// A payload as seen by an observer
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationEvent {
    pub topic: String,
    pub payload: Value,
}

/// Broadcast receiver handed to each observer
pub type EventStream = broadcast::Receiver<NotificationEvent>;

/// In-process fan-out over a bounded broadcast ring.
///
/// Observers that fall more than `capacity` events behind lose the oldest ones.
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<NotificationEvent>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Register a new observer
    pub fn subscribe(&self) -> EventStream {
        self.sender.subscribe()
    }

    pub fn observer_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl NotificationSink for BroadcastSink {
    fn emit(&self, topic: &str, payload: &Value) -> Result<(), NotifyError> {
        let event = NotificationEvent {
            topic: topic.to_string(),
            payload: payload.clone(),
        };

        // Sending only fails when nobody is listening, which is not an error here
        match self.sender.send(event) {
            Ok(observers) => debug!("Emitted '{}' to {} observers", topic, observers),
            Err(_) => debug!("Emitted '{}' with no observers connected", topic),
        }
        Ok(())
    }
}
