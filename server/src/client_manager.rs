//! Connection roster for the multiplayer server
//!
//! This module tracks every open WebSocket connection, including:
//! - Client id assignment and capacity enforcement
//! - The outbound mailbox each connection task drains into its socket
//! - Targeted sends and broadcasts of already-encoded frames
//!
//! Every id held here has exactly one open connection behind it. The game loop
//! registers a client before spawning its player and unregisters it on the
//! connection's disconnect event.

use log::{debug, info};
use shared::PlayerId;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// Outbound half of a connection, drained by that connection's writer task
pub type Mailbox = mpsc::UnboundedSender<Message>;

/// Represents one open connection
#[derive(Debug)]
pub struct Client {
    /// Unique client identifier, also the player id
    pub id: PlayerId,
    /// Remote address, for logging
    pub addr: SocketAddr,
    /// When the connection was accepted
    pub connected_at: Instant,
    mailbox: Mailbox,
}

impl Client {
    pub fn new(id: PlayerId, addr: SocketAddr, mailbox: Mailbox) -> Self {
        Self {
            id,
            addr,
            connected_at: Instant::now(),
            mailbox,
        }
    }

    /// Queues a frame for this connection.
    ///
    /// Returns false when the writer task is gone; its reader will report the
    /// disconnect, so the failure is not handled here.
    pub fn send(&self, message: Message) -> bool {
        self.mailbox.send(message).is_ok()
    }

    pub fn session_length(&self) -> Duration {
        self.connected_at.elapsed()
    }
}

/// Manages all open connections and fans frames out to them
pub struct ClientManager {
    /// Connected clients indexed by their unique ID
    clients: HashMap<PlayerId, Client>,
    /// Next available client ID for new connections
    next_client_id: PlayerId,
    /// Maximum number of concurrent clients allowed
    max_clients: usize,
}

impl ClientManager {
    /// Creates an empty roster. Client IDs start from 1.
    pub fn new(max_clients: usize) -> Self {
        Self {
            clients: HashMap::new(),
            next_client_id: 1,
            max_clients,
        }
    }

    /// Registers a connection and returns its id, or None if the server is full
    pub fn add_client(&mut self, addr: SocketAddr, mailbox: Mailbox) -> Option<PlayerId> {
        if self.clients.len() >= self.max_clients {
            return None;
        }

        let client_id = self.next_client_id;
        self.next_client_id += 1;

        info!("Client {} connected from {}", client_id, addr);
        self.clients
            .insert(client_id, Client::new(client_id, addr, mailbox));

        Some(client_id)
    }

    /// Unregisters a connection. Returns false if it was already gone.
    pub fn remove_client(&mut self, client_id: &PlayerId) -> bool {
        if let Some(client) = self.clients.remove(client_id) {
            info!(
                "Client {} disconnected after {:.1}s",
                client.id,
                client.session_length().as_secs_f32()
            );
            true
        } else {
            false
        }
    }

    /// Queues a frame for a single client. Returns false if it is unknown or closed.
    pub fn send_to(&self, client_id: PlayerId, message: Message) -> bool {
        self.clients
            .get(&client_id)
            .is_some_and(|client| client.send(message))
    }

    /// Queues a frame for every client except `exclude`; returns how many accepted it
    pub fn broadcast(&self, message: &Message, exclude: Option<PlayerId>) -> usize {
        let mut delivered = 0;

        for (client_id, client) in &self.clients {
            if Some(*client_id) == exclude {
                continue;
            }

            if client.send(message.clone()) {
                delivered += 1;
            } else {
                debug!("Mailbox for client {} is closed", client_id);
            }
        }

        delivered
    }

    /// Returns the number of currently connected clients
    pub fn len(&self) -> usize {
        self.clients.len()
    }

    /// Returns true if no clients are currently connected
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
