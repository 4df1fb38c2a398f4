//! Command handlers
//!
//! Maps each parsed command onto a store operation and turns the outcome into a
//! [`CommandResult`].

use log::error;

use crate::context::AppContext;
use crate::error::StoreError;
use crate::error::handlers::{error_to_status_code, handle_error};
use crate::notify::SETTINGS_UPDATE_TOPIC;
use crate::protocol::responses::{
    BAD_REQUEST, GOODBYE, INTERNAL_ERROR, NO_CONTENT, OK, UNKNOWN_COMMAND,
};
use crate::protocol::{Command, CommandResult, CommandStatus};

fn failure(operation: &str, err: StoreError) -> CommandResult {
    handle_error(operation, &err);
    CommandResult::failure(error_to_status_code(&err), err.to_string())
}

/// Dispatches a command to its handler. `body` carries the request body for
/// commands that declare one.
pub async fn handle_command(
    ctx: &AppContext,
    command: &Command,
    body: Option<&str>,
) -> CommandResult {
    match command {
        Command::GetSettings { key, level } => handle_cmd_getset(ctx, key, level).await,
        Command::PutSettings {
            key,
            level,
            client_id,
            ..
        } => handle_cmd_putset(ctx, key, level, client_id, body.unwrap_or_default()).await,
        Command::Data {
            source_type,
            source,
        } => handle_cmd_data(ctx, source_type, source).await,
        Command::List { .. } => handle_cmd_list(ctx).await,
        Command::Get(name) => handle_cmd_get(ctx, name).await,
        Command::Put {
            name, overwrite, ..
        } => handle_cmd_put(ctx, name, *overwrite, body.unwrap_or_default()).await,
        Command::Del(name) => handle_cmd_del(ctx, name).await,
        Command::Subscribe => CommandResult::message(
            OK,
            format!("Subscribed to {}", SETTINGS_UPDATE_TOPIC),
        )
        .with_status(CommandStatus::Subscribe),
        Command::Ready => CommandResult::message(NO_CONTENT, "Ready"),
        Command::Quit => {
            CommandResult::message(GOODBYE, "Goodbye").with_status(CommandStatus::CloseConnection)
        }
        Command::Malformed(usage) => CommandResult::failure(BAD_REQUEST, *usage),
        Command::Unknown => CommandResult::failure(UNKNOWN_COMMAND, "Unknown command"),
    }
}

async fn handle_cmd_getset(ctx: &AppContext, key: &str, level: &str) -> CommandResult {
    match ctx.settings.load(key, level).await {
        Ok(content) => CommandResult::payload(OK, content),
        Err(e) => failure("GETSET", e),
    }
}

async fn handle_cmd_putset(
    ctx: &AppContext,
    key: &str,
    level: &str,
    client_id: &str,
    content: &str,
) -> CommandResult {
    match ctx.settings.save(key, level, content, client_id).await {
        Ok(()) => CommandResult::message(OK, "Settings saved successfully"),
        Err(e) => failure("PUTSET", e),
    }
}

async fn handle_cmd_data(ctx: &AppContext, source_type: &str, source: &str) -> CommandResult {
    match ctx.dictionaries.fetch(source_type, source).await {
        Ok(data) => CommandResult::payload(OK, data),
        Err(e) => failure("DATA", e),
    }
}

/// LIST replies with a JSON array of `{name, modified}`, newest first
async fn handle_cmd_list(ctx: &AppContext) -> CommandResult {
    let entries = match ctx.documents.list().await {
        Ok(entries) => entries,
        Err(e) => return failure("LIST", e),
    };

    match serde_json::to_string(&entries) {
        Ok(json) => CommandResult::payload(OK, json),
        Err(e) => {
            error!("Failed to encode document listing: {}", e);
            CommandResult::failure(INTERNAL_ERROR, "Failed to encode listing")
        }
    }
}

async fn handle_cmd_get(ctx: &AppContext, name: &str) -> CommandResult {
    match ctx.documents.get(name).await {
        Ok(content) => CommandResult::payload(OK, content),
        Err(e) => failure("GET", e),
    }
}

async fn handle_cmd_put(ctx: &AppContext, name: &str, overwrite: bool, content: &str) -> CommandResult {
    match ctx.documents.put(name, content, overwrite).await {
        Ok(stored) => CommandResult::payload(OK, stored),
        Err(e) => failure("PUT", e),
    }
}

async fn handle_cmd_del(ctx: &AppContext, name: &str) -> CommandResult {
    match ctx.documents.delete(name).await {
        Ok(()) => CommandResult::message(NO_CONTENT, "Deleted"),
        Err(e) => failure("DEL", e),
    }
}
