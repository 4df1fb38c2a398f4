//! Change notification
//!
//! Tells observers which settings document changed, at what level and by whom.
//! Delivery is best effort and never affects the write that triggered it.

pub mod notifier;
pub mod sink;

#[cfg(test)]
pub(crate) mod testing;

pub use notifier::{ChangeNotification, ChangeNotifier, SETTINGS_UPDATE_TOPIC};
pub use sink::{BroadcastSink, NotificationEvent, NotificationSink};
