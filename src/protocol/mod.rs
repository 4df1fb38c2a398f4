//! Request protocol
//!
//! Line-oriented request parsing, dispatch to the stores, and response formatting.

pub mod commands;
pub mod handlers;
pub mod responses;

pub use commands::{Command, CommandResult, CommandStatus, parse_command};
pub use handlers::handle_command;
