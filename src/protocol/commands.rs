//! Module `commands`
//!
//! Request parsing and the command/result types passed between the
//! connection loop and the handlers.

use crate::protocol::responses::{format_payload, format_response};
use crate::storage::DEFAULT_LEVEL;
use crate::storage::dictionaries::FILE_SOURCE_TYPE;

/// A request parsed from one line of client input.
///
/// Names and sources are taken verbatim from the rest of the line, so they may
/// contain spaces.
#[derive(Debug, PartialEq)]
pub enum Command {
    GetSettings {
        key: String,
        level: String,
    },
    PutSettings {
        key: String,
        level: String,
        client_id: String,
        length: usize,
    },
    Data {
        source_type: String,
        source: String,
    },
    List {
        search: Option<String>,
    },
    Get(String),
    Put {
        name: String,
        overwrite: bool,
        length: usize,
    },
    Del(String),
    Subscribe,
    Ready,
    Quit,
    Malformed(&'static str),
    Unknown,
}

impl Command {
    /// Number of body bytes that follow the request line
    pub fn body_length(&self) -> Option<usize> {
        match self {
            Command::PutSettings { length, .. } | Command::Put { length, .. } => Some(*length),
            _ => None,
        }
    }
}

/// Outcome of executing a command
#[derive(Debug, PartialEq)]
pub enum CommandStatus {
    Success,
    Failure(String),
    Subscribe,
    CloseConnection,
}

/// Full result of a command: status, response code, and either a message or a payload
#[derive(Debug)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub code: u16,
    pub message: String,
    pub payload: Option<String>,
}

impl CommandResult {
    pub fn message(code: u16, message: impl Into<String>) -> Self {
        Self {
            status: CommandStatus::Success,
            code,
            message: message.into(),
            payload: None,
        }
    }

    pub fn payload(code: u16, payload: String) -> Self {
        Self {
            status: CommandStatus::Success,
            code,
            message: String::new(),
            payload: Some(payload),
        }
    }

    pub fn failure(code: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status: CommandStatus::Failure(message.clone()),
            code,
            message,
            payload: None,
        }
    }

    pub fn with_status(mut self, status: CommandStatus) -> Self {
        self.status = status;
        self
    }

    /// Bytes to send back to the client
    pub fn to_wire(&self) -> Vec<u8> {
        match &self.payload {
            Some(payload) => format_payload(self.code, payload),
            None => format_response(self.code, &self.message).into_bytes(),
        }
    }
}

fn parse_length(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|s| s.parse::<usize>().ok())
}

/// Parses a raw request line into a [`Command`].
///
/// Known commands with missing or unparsable arguments become
/// [`Command::Malformed`].
pub fn parse_command(raw: &str) -> Command {
    let line = raw.trim_end_matches(['\r', '\n']);
    let (cmd, arg) = line.split_once(' ').unwrap_or((line, ""));

    match cmd.to_ascii_uppercase().as_str() {
        "GETSET" => {
            let mut parts = arg.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(key), level, None) => Command::GetSettings {
                    key: key.to_string(),
                    level: level.unwrap_or(DEFAULT_LEVEL).to_string(),
                },
                _ => Command::Malformed("usage: GETSET <key> [level]"),
            }
        }
        "PUTSET" => {
            let parts: Vec<&str> = arg.split_whitespace().collect();
            match parts.as_slice() {
                [key, level, client_id, length] => match parse_length(Some(*length)) {
                    Some(length) => Command::PutSettings {
                        key: key.to_string(),
                        level: level.to_string(),
                        client_id: client_id.to_string(),
                        length,
                    },
                    None => Command::Malformed("PUTSET length must be a number"),
                },
                _ => Command::Malformed("usage: PUTSET <key> <level> <client_id> <length>"),
            }
        }
        "DATA" => {
            let (source_type, source) = arg.split_once(' ').unwrap_or((arg, ""));
            let source_type = if source_type.is_empty() {
                FILE_SOURCE_TYPE
            } else {
                source_type
            };
            Command::Data {
                source_type: source_type.to_string(),
                source: source.to_string(),
            }
        }
        "LIST" => Command::List {
            search: (!arg.is_empty()).then(|| arg.to_string()),
        },
        "GET" if !arg.is_empty() => Command::Get(arg.to_string()),
        "DEL" if !arg.is_empty() => Command::Del(arg.to_string()),
        "GET" | "DEL" => Command::Malformed("a document name is required"),
        "PUT" => {
            let mut parts = arg.splitn(3, ' ');
            match (parts.next(), parse_length(parts.next()), parts.next()) {
                (Some(overwrite), Some(length), Some(name)) if !name.is_empty() => Command::Put {
                    name: name.to_string(),
                    overwrite: overwrite.eq_ignore_ascii_case("true"),
                    length,
                },
                _ => Command::Malformed("usage: PUT <overwrite> <length> <name>"),
            }
        }
        "SUBSCRIBE" => Command::Subscribe,
        "READY" => Command::Ready,
        "QUIT" => Command::Quit,
        _ => Command::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_settings_commands() {
        assert_eq!(
            parse_command("GETSET theme\r\n"),
            Command::GetSettings {
                key: "theme".into(),
                level: "user".into()
            }
        );
        assert_eq!(
            parse_command("getset theme workspace"),
            Command::GetSettings {
                key: "theme".into(),
                level: "workspace".into()
            }
        );
        assert_eq!(
            parse_command("PUTSET theme user abc 17\r\n"),
            Command::PutSettings {
                key: "theme".into(),
                level: "user".into(),
                client_id: "abc".into(),
                length: 17
            }
        );
        assert!(matches!(parse_command("PUTSET theme user 17"), Command::Malformed(_)));
        assert!(matches!(parse_command("PUTSET theme user abc x"), Command::Malformed(_)));
        assert!(matches!(parse_command("GETSET"), Command::Malformed(_)));
    }

    #[test]
    fn test_parse_document_commands() {
        assert_eq!(
            parse_command("GET my notes\r\n"),
            Command::Get("my notes".into())
        );
        assert_eq!(parse_command("DEL a"), Command::Del("a".into()));
        assert_eq!(
            parse_command("PUT true 5 two words"),
            Command::Put {
                name: "two words".into(),
                overwrite: true,
                length: 5
            }
        );
        assert_eq!(
            parse_command("PUT no 0 a"),
            Command::Put {
                name: "a".into(),
                overwrite: false,
                length: 0
            }
        );
        assert!(matches!(parse_command("PUT true five a"), Command::Malformed(_)));
        assert!(matches!(parse_command("PUT true 5"), Command::Malformed(_)));
        assert!(matches!(parse_command("GET"), Command::Malformed(_)));
        assert_eq!(parse_command("LIST"), Command::List { search: None });
        assert_eq!(
            parse_command("LIST foo"),
            Command::List {
                search: Some("foo".into())
            }
        );
    }

    #[test]
    fn test_parse_data_and_misc() {
        assert_eq!(
            parse_command("DATA file tags/my colors.csv"),
            Command::Data {
                source_type: "file".into(),
                source: "tags/my colors.csv".into()
            }
        );
        assert_eq!(
            parse_command("DATA"),
            Command::Data {
                source_type: "file".into(),
                source: "".into()
            }
        );
        assert_eq!(parse_command("SUBSCRIBE"), Command::Subscribe);
        assert_eq!(parse_command("ready"), Command::Ready);
        assert_eq!(parse_command("QUIT\r\n"), Command::Quit);
        assert_eq!(parse_command("STOR x"), Command::Unknown);
    }

    #[test]
    fn test_body_length() {
        assert_eq!(parse_command("PUT true 12 a").body_length(), Some(12));
        assert_eq!(parse_command("PUTSET k user c 3").body_length(), Some(3));
        assert_eq!(parse_command("GET a").body_length(), None);
    }

    #[test]
    fn test_result_wire_format() {
        assert_eq!(
            CommandResult::message(204, "Deleted").to_wire(),
            b"204 Deleted\r\n".to_vec()
        );
        assert_eq!(
            CommandResult::payload(200, "héllo".into()).to_wire(),
            b"200 DATA 6\r\nh\xc3\xa9llo".to_vec()
        );
    }
}
