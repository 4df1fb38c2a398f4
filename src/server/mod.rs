//! Server core functionality
//!
//! Listener, connection admission and the accept loop.

pub mod core;

pub use self::core::Server;
