pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod notify;
pub mod protocol;
pub mod server;
pub mod storage;

pub use config::ServerConfig;
pub use context::AppContext;
pub use server::Server;
