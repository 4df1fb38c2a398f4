use log::{debug, error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::client::ClientRegistry;
use crate::config::ServerConfig;
use crate::context::AppContext;
use crate::notify::sink::EventStream;
use crate::protocol::responses::{BAD_REQUEST, PAYLOAD_TOO_LARGE, format_event, format_response};
use crate::protocol::{CommandStatus, handle_command, parse_command};

/// Write half shared between the request loop and the event forwarder
type SharedWriter = Arc<Mutex<OwnedWriteHalf>>;

async fn send(writer: &SharedWriter, bytes: &[u8]) -> io::Result<()> {
    let mut guard = writer.lock().await;
    guard.write_all(bytes).await?;
    guard.flush().await
}

async fn read_body(reader: &mut BufReader<OwnedReadHalf>, length: usize) -> io::Result<Vec<u8>> {
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).await?;
    Ok(body)
}

/// Pushes settings-update events to a subscribed client until it goes away.
fn spawn_event_forwarder(
    mut events: EventStream,
    writer: SharedWriter,
    client_addr: SocketAddr,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Err(e) = send(&writer, format_event(&event).as_bytes()).await {
                        debug!("Stopped forwarding events to {}: {}", client_addr, e);
                        break;
                    }
                }
                Err(RecvError::Lagged(missed)) => {
                    warn!("Observer {} fell behind, {} events dropped", client_addr, missed);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

/// Serves one client connection.
///
/// - Reads request lines, and for commands that declare a body, exactly that
///   many bytes after the line.
/// - Dispatches each request through `handle_command`.
/// - After `SUBSCRIBE`, a forwarder task shares the write half to push events.
pub async fn handle_client(
    stream: TcpStream,
    client_addr: SocketAddr,
    ctx: Arc<AppContext>,
    clients: Arc<Mutex<ClientRegistry>>,
    config: Arc<ServerConfig>,
) {
    let (read_half, write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let writer: SharedWriter = Arc::new(Mutex::new(write_half));
    let mut forwarder: Option<JoinHandle<()>> = None;
    let mut line = String::new();

    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                info!("Connection closed by client {}", client_addr);
                break;
            }
            Ok(_) => {
                // Past the limit we can no longer trust where the next request starts
                if line.len() > config.max_command_length {
                    let _ = send(&writer, format_response(BAD_REQUEST, "Command too long").as_bytes()).await;
                    break;
                }

                let command = parse_command(&line);
                info!("Received from {}: {:?}", client_addr, &command);

                let body = match command.body_length() {
                    Some(length) if length > config.max_body_bytes => {
                        let message = format!("Body exceeds {} bytes", config.max_body_bytes);
                        let _ = send(&writer, format_response(PAYLOAD_TOO_LARGE, &message).as_bytes()).await;
                        break;
                    }
                    Some(length) => match read_body(&mut reader, length).await {
                        Ok(bytes) => Some(String::from_utf8(bytes)),
                        Err(e) => {
                            error!("Failed to read body from {}: {}", client_addr, e);
                            break;
                        }
                    },
                    None => None,
                };

                let body = match body.transpose() {
                    Ok(body) => body,
                    Err(_) => {
                        let reply = format_response(BAD_REQUEST, "Body must be UTF-8 text");
                        if send(&writer, reply.as_bytes()).await.is_err() {
                            break;
                        }
                        continue;
                    }
                };

                if let Some(client) = clients.lock().await.get_mut(&client_addr) {
                    client.record_command();
                }

                let result = handle_command(&ctx, &command, body.as_deref()).await;
                let wire = result.to_wire();

                let written = if result.status == CommandStatus::Subscribe && forwarder.is_none() {
                    // Subscribe and confirm under one lock so no event precedes the reply
                    let mut guard = writer.lock().await;
                    let events = ctx.events.subscribe();
                    let written = guard.write_all(&wire).await;
                    drop(guard);
                    forwarder = Some(spawn_event_forwarder(events, Arc::clone(&writer), client_addr));
                    let mut clients_guard = clients.lock().await;
                    if let Some(client) = clients_guard.get_mut(&client_addr) {
                        client.set_subscribed(true);
                    }
                    info!(
                        "Client {} subscribed to settings updates ({} subscribers)",
                        client_addr,
                        clients_guard.subscriber_count()
                    );
                    drop(clients_guard);
                    written
                } else {
                    send(&writer, &wire).await
                };

                if let Err(e) = written {
                    error!("Failed to write to {}: {}", client_addr, e);
                    break;
                }

                match result.status {
                    CommandStatus::CloseConnection => {
                        info!("Client {} requested to quit", client_addr);
                        break;
                    }
                    CommandStatus::Failure(reason) => {
                        debug!("Request from {} failed: {}", client_addr, reason);
                    }
                    CommandStatus::Success | CommandStatus::Subscribe => {}
                }
            }
            Err(e) => {
                error!("Failed to read from {}: {}", client_addr, e);
                break;
            }
        }
    }

    if let Some(handle) = forwarder {
        handle.abort();
    }

    let mut clients_guard = clients.lock().await;
    match clients_guard.remove(&client_addr) {
        Some(client) => info!(
            "Client {} disconnected after {:?} ({} commands)",
            client_addr,
            client.connected_for(),
            client.commands_served()
        ),
        None => info!("Client {} disconnected", client_addr),
    }
}
