//! Module `state`
//!
//! Per-connection bookkeeping kept in the client registry.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// State of one connected client.
///
/// Tracks when the client connected, how many requests it has issued, and
/// whether it has subscribed to settings updates.
pub struct Client {
    client_addr: SocketAddr,
    connected_at: Instant,
    commands_served: u64,
    is_subscribed: bool,
}

impl Client {
    pub fn new(client_addr: SocketAddr) -> Self {
        Self {
            client_addr,
            connected_at: Instant::now(),
            commands_served: 0,
            is_subscribed: false,
        }
    }

    // --------------------
    // Getter methods
    // --------------------

    pub fn client_addr(&self) -> SocketAddr {
        self.client_addr
    }

    /// Returns how long the client has been connected.
    pub fn connected_for(&self) -> Duration {
        self.connected_at.elapsed()
    }

    pub fn commands_served(&self) -> u64 {
        self.commands_served
    }

    /// Returns whether the client receives settings-update events.
    pub fn is_subscribed(&self) -> bool {
        self.is_subscribed
    }

    // --------------------
    // Setter methods
    // --------------------

    pub fn record_command(&mut self) {
        self.commands_served += 1;
    }

    pub fn set_subscribed(&mut self, subscribed: bool) {
        self.is_subscribed = subscribed;
    }
}
