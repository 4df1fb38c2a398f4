//! rax-docstore - Entry Point
//!
//! A sandboxed document and settings store served over a line protocol.

use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;

use rax_docstore::{Server, ServerConfig};

#[tokio::main]
async fn main() {
    // RUST_LOG overrides the default filter
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    info!("Launching document store...");

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = match ServerConfig::load_from(config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let server = match Server::bind(config).await {
        Ok(server) => server,
        Err(e) => {
            error!("Server startup failed: {}", e);
            std::process::exit(1);
        }
    };

    server.start().await;
}
