//! Client registry
//!
//! Tracks connected clients and enforces the connection limit.

use crate::client::Client;
use std::collections::HashMap;
use std::net::SocketAddr;

/// Registry for tracking active clients
pub struct ClientRegistry {
    clients: HashMap<SocketAddr, Client>,
    max_clients: usize,
}

impl ClientRegistry {
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: HashMap::new(),
            max_clients,
        }
    }

    /// Register a client unless the registry is full. Returns whether it was added.
    pub fn try_insert(&mut self, client: Client) -> bool {
        if self.clients.len() >= self.max_clients {
            return false;
        }
        self.clients.insert(client.client_addr(), client);
        true
    }

    pub fn remove(&mut self, addr: &SocketAddr) -> Option<Client> {
        self.clients.remove(addr)
    }

    pub fn get_mut(&mut self, addr: &SocketAddr) -> Option<&mut Client> {
        self.clients.get_mut(addr)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn max_clients(&self) -> usize {
        self.max_clients
    }

    /// Number of clients subscribed to settings updates
    pub fn subscriber_count(&self) -> usize {
        self.clients.values().filter(|c| c.is_subscribed()).count()
    }
}
