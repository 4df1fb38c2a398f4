//! Response handling
//!
//! Response codes and wire formatting. A plain response is one line,
//! `<code> <text>\r\n`. A payload response is `<code> DATA <len>\r\n` followed by
//! exactly `len` bytes. Observers receive `EVENT <topic> <json>\r\n`.

use crate::notify::NotificationEvent;

pub const OK: u16 = 200;
pub const NO_CONTENT: u16 = 204;
pub const WELCOME: u16 = 220;
pub const GOODBYE: u16 = 221;
pub const BAD_REQUEST: u16 = 400;
pub const PAYLOAD_TOO_LARGE: u16 = 413;
pub const TOO_MANY_CONNECTIONS: u16 = 421;
pub const INTERNAL_ERROR: u16 = 500;
pub const UNKNOWN_COMMAND: u16 = 502;

/// Format a one-line response
pub fn format_response(code: u16, message: &str) -> String {
    format!("{} {}\r\n", code, message)
}

/// Format a payload response: header line plus raw body
pub fn format_payload(code: u16, payload: &str) -> Vec<u8> {
    let mut out = format!("{} DATA {}\r\n", code, payload.len()).into_bytes();
    out.extend_from_slice(payload.as_bytes());
    out
}

/// Format a notification pushed to an observer
pub fn format_event(event: &NotificationEvent) -> String {
    format!("EVENT {} {}\r\n", event.topic, event.payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_event_is_single_line() {
        let event = NotificationEvent {
            topic: "settings-update".into(),
            payload: json!({"key": "theme", "level": "user"}),
        };
        let line = format_event(&event);
        assert!(line.starts_with("EVENT settings-update {"));
        assert!(line.ends_with("}\r\n"));
        assert_eq!(line.matches('\n').count(), 1);
    }
}
