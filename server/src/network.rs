//! Server network layer handling WebSocket connections and the broadcast loop

use crate::client_manager::{ClientManager, Mailbox};
use crate::game::GameState;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::{ClientEvent, PlayerId, ServerEvent};
use std::error::Error;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval, MissedTickBehavior};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

pub type ServerResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// Messages sent from connection tasks to the game loop
#[derive(Debug)]
pub enum ServerMessage {
    Connected {
        addr: SocketAddr,
        mailbox: Mailbox,
        respond_to: oneshot::Sender<Option<PlayerId>>,
    },
    EventReceived {
        client_id: PlayerId,
        event: ClientEvent,
    },
    Disconnected {
        client_id: PlayerId,
    },
    Shutdown,
}

/// Owns the world state and every connection's mailbox.
///
/// Connection tasks never touch the world; they forward decoded events through
/// `server_tx` and the loop in [`Server::run`] applies them one at a time.
pub struct Server {
    listener: Option<TcpListener>,
    local_addr: SocketAddr,
    clients: ClientManager,
    game_state: GameState,
    rng: StdRng,
    tick_duration: Duration,

    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl Server {
    pub async fn new(addr: &str, tick_duration: Duration, max_clients: usize) -> ServerResult<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        info!("Server listening on ws://{}", local_addr);

        let mut rng = StdRng::from_entropy();
        let game_state = GameState::new(&mut rng);
        let (server_tx, server_rx) = mpsc::unbounded_channel();

        Ok(Server {
            listener: Some(listener),
            local_addr,
            clients: ClientManager::new(max_clients),
            game_state,
            rng,
            tick_duration,
            server_tx,
            server_rx,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Channel into the game loop; send [`ServerMessage::Shutdown`] to stop [`Server::run`]
    pub fn handle(&self) -> mpsc::UnboundedSender<ServerMessage> {
        self.server_tx.clone()
    }

    /// Spawns task that accepts TCP connections and upgrades them
    fn spawn_acceptor(&mut self) -> ServerResult<()> {
        let listener = self.listener.take().ok_or("server is already running")?;
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, addr)) => {
                        tokio::spawn(handle_connection(stream, addr, server_tx.clone()));
                    }
                    Err(e) => {
                        error!("Error accepting connection: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });

        Ok(())
    }

    fn handle_message(&mut self, message: ServerMessage) {
        match message {
            ServerMessage::Connected {
                addr,
                mailbox,
                respond_to,
            } => self.handle_connect(addr, mailbox, respond_to),
            ServerMessage::EventReceived { client_id, event } => {
                self.handle_event(client_id, event)
            }
            ServerMessage::Disconnected { client_id } => self.handle_disconnect(client_id),
            ServerMessage::Shutdown => {}
        }
    }

    fn handle_connect(
        &mut self,
        addr: SocketAddr,
        mailbox: Mailbox,
        respond_to: oneshot::Sender<Option<PlayerId>>,
    ) {
        let Some(client_id) = self.clients.add_client(addr, mailbox) else {
            warn!("Server full, refusing connection from {}", addr);
            let _ = respond_to.send(None);
            return;
        };

        if respond_to.send(Some(client_id)).is_err() {
            // The connection task is gone before it learned its id.
            self.clients.remove_client(&client_id);
            return;
        }

        let player = self.game_state.add_player(client_id, &mut self.rng);

        if let Some(message) = encode(&self.game_state.init_event(client_id)) {
            self.clients.send_to(client_id, message);
        }

        let joined = ServerEvent::NewPlayer {
            id: client_id,
            player,
        };
        if let Some(message) = encode(&joined) {
            self.clients.broadcast(&message, Some(client_id));
        }
    }

    /// Applies a client event.
    ///
    /// Positions are trusted as sent. Server-side movement validation would go here.
    fn handle_event(&mut self, client_id: PlayerId, event: ClientEvent) {
        match event {
            ClientEvent::PlayerMove { x, y } => {
                if !x.is_finite() || !y.is_finite() {
                    warn!("Dropping non-finite move from client {}", client_id);
                    return;
                }

                if self.game_state.apply_move(client_id, x, y).is_some() {
                    self.broadcast_game_state();
                }
            }
        }
    }

    fn handle_disconnect(&mut self, client_id: PlayerId) {
        if !self.clients.remove_client(&client_id) {
            return;
        }
        self.game_state.remove_player(&client_id);

        if let Some(message) = encode(&ServerEvent::PlayerDisconnect { id: client_id }) {
            self.clients.broadcast(&message, None);
        }
    }

    /// Broadcasts the full world state to all connected clients
    fn broadcast_game_state(&self) {
        if self.clients.is_empty() {
            return;
        }

        if let Some(message) = encode(&self.game_state.snapshot()) {
            self.clients.broadcast(&message, None);
        }
    }

    /// Main server loop: applies connection events and broadcasts on every tick
    pub async fn run(&mut self) -> ServerResult<()> {
        self.spawn_acceptor()?;

        let mut tick_interval = interval(self.tick_duration);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!("Server started successfully");

        loop {
            tokio::select! {
                message = self.server_rx.recv() => {
                    match message {
                        Some(ServerMessage::Shutdown) | None => {
                            info!("Server shutting down");
                            break;
                        }
                        Some(message) => self.handle_message(message),
                    }
                },

                _ = tick_interval.tick() => {
                    self.game_state.tick = self.game_state.tick.wrapping_add(1);
                    self.broadcast_game_state();

                    if self.game_state.tick % 60 == 0 && !self.clients.is_empty() {
                        debug!(
                            "Tick {}: {} clients, {} coins left",
                            self.game_state.tick,
                            self.clients.len(),
                            self.game_state.remaining_coins()
                        );
                    }
                },
            }
        }

        Ok(())
    }
}

fn encode(event: &ServerEvent) -> Option<Message> {
    match event.to_json() {
        Ok(json) => Some(Message::Text(json)),
        Err(e) => {
            error!("Failed to encode server event: {}", e);
            None
        }
    }
}

/// Drives one WebSocket connection from handshake to disconnect
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    server_tx: mpsc::UnboundedSender<ServerMessage>,
) {
    let ws_stream = match tokio_tungstenite::accept_async(stream).await {
        Ok(ws_stream) => ws_stream,
        Err(e) => {
            error!("WebSocket handshake with {} failed: {}", addr, e);
            return;
        }
    };
    let (mut ws_write, mut ws_read) = ws_stream.split();

    let (mailbox, mut outbox) = mpsc::unbounded_channel();
    let (respond_to, assigned) = oneshot::channel();

    if server_tx
        .send(ServerMessage::Connected {
            addr,
            mailbox,
            respond_to,
        })
        .is_err()
    {
        return;
    }

    let client_id = match assigned.await {
        Ok(Some(client_id)) => client_id,
        _ => {
            let refusal = Message::Close(Some(CloseFrame {
                code: CloseCode::Again,
                reason: "Server full".into(),
            }));
            let _ = ws_write.send(refusal).await;
            return;
        }
    };

    let writer = tokio::spawn(async move {
        while let Some(message) = outbox.recv().await {
            if let Err(e) = ws_write.send(message).await {
                debug!("Failed to write to {}: {}", addr, e);
                break;
            }
        }
    });

    while let Some(frame) = ws_read.next().await {
        match frame {
            Ok(Message::Text(text)) => match ClientEvent::from_json(&text) {
                Ok(event) => {
                    if let Err(e) = server_tx.send(ServerMessage::EventReceived { client_id, event }) {
                        error!("Failed to forward event to game loop: {}", e);
                        break;
                    }
                }
                Err(e) => warn!("Malformed frame from client {}: {}", client_id, e),
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                debug!("Connection error for client {}: {}", client_id, e);
                break;
            }
        }
    }

    let _ = server_tx.send(ServerMessage::Disconnected { client_id });
    writer.abort();
}
