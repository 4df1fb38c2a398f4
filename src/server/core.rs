use log::{error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::client::{Client, ClientRegistry, handle_client};
use crate::config::ServerConfig;
use crate::context::AppContext;
use crate::error::ServerError;
use crate::protocol::responses::{TOO_MANY_CONNECTIONS, WELCOME, format_response};

pub struct Server {
    client_registry: Arc<Mutex<ClientRegistry>>,
    context: Arc<AppContext>,
    listener: TcpListener,
    config: Arc<ServerConfig>,
}

impl Server {
    /// Prepare the store roots and bind the listening socket
    pub async fn bind(config: ServerConfig) -> Result<Self, ServerError> {
        let context = AppContext::bootstrap(&config).await?;

        let socket = config.socket_address();
        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => listener,
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                return Err(ServerError::Io(e));
            }
        };
        info!("Server bound to {}", listener.local_addr()?);

        Ok(Self {
            client_registry: Arc::new(Mutex::new(ClientRegistry::new(config.max_clients))),
            context: Arc::new(context),
            listener,
            config: Arc::new(config),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn context(&self) -> Arc<AppContext> {
        Arc::clone(&self.context)
    }

    pub async fn start(self) {
        info!(
            "Starting document store on {} (max {} clients)",
            self.config.socket_address(),
            self.config.max_clients
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let client_registry = Arc::clone(&self.client_registry);
                    let context = Arc::clone(&self.context);
                    let config = Arc::clone(&self.config);

                    // Spawn a task for each client so accept loop doesn't block
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_new_client(stream, addr, client_registry, context, config).await
                        {
                            warn!("Failed to handle client {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

/// Greets a new client, registers it, and hands it to the session handler.
async fn handle_new_client(
    mut stream: TcpStream,
    client_addr: SocketAddr,
    client_registry: Arc<Mutex<ClientRegistry>>,
    context: Arc<AppContext>,
    config: Arc<ServerConfig>,
) -> Result<(), io::Error> {
    {
        let mut clients = client_registry.lock().await;
        if !clients.try_insert(Client::new(client_addr)) {
            stream
                .write_all(
                    format_response(TOO_MANY_CONNECTIONS, "Too many connections. Try again later.")
                        .as_bytes(),
                )
                .await?;
            warn!("Rejected client {}: connection limit reached", client_addr);
            return Ok(());
        }
        info!(
            "Accepted client {} ({}/{} clients)",
            client_addr,
            clients.len(),
            clients.max_clients()
        );
    }

    if let Err(e) = stream
        .write_all(format_response(WELCOME, "rax-docstore ready").as_bytes())
        .await
    {
        client_registry.lock().await.remove(&client_addr);
        return Err(e);
    }

    handle_client(stream, client_addr, context, client_registry, config).await;
    Ok(())
}
