//! WebSocket connection running on a background Tokio runtime
//!
//! The render loop is synchronous, so the socket lives on its own thread with a
//! current-thread runtime. Decoded server events flow back over an unbounded
//! channel that the frame loop drains with [`NetworkClient::poll`]; moves go the
//! other way through [`NetworkClient::send`].

use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::{ClientEvent, ServerEvent};
use std::error::Error;
use std::thread;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::handshake::client::Request;
use tokio_tungstenite::tungstenite::Message;

pub type NetworkResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    /// Closed by either side, with the close reason or transport error if any
    Closed(Option<String>),
}

#[derive(Debug)]
enum NetworkEvent {
    Connected,
    Server(ServerEvent),
    Closed(Option<String>),
}

pub struct NetworkClient {
    outgoing: mpsc::UnboundedSender<ClientEvent>,
    incoming: mpsc::UnboundedReceiver<NetworkEvent>,
    status: ConnectionStatus,
}

impl NetworkClient {
    /// Starts connecting to `url` in the background.
    ///
    /// Fails immediately on a malformed URL; connection errors are reported
    /// later through [`NetworkClient::status`].
    pub fn connect(url: &str) -> NetworkResult<Self> {
        let request = url.into_client_request()?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let (outgoing, outgoing_rx) = mpsc::unbounded_channel();
        let (incoming_tx, incoming) = mpsc::unbounded_channel();

        thread::Builder::new()
            .name("network".to_string())
            .spawn(move || {
                let reason = match runtime.block_on(run_connection(
                    request,
                    outgoing_rx,
                    incoming_tx.clone(),
                )) {
                    Ok(reason) => reason,
                    Err(e) => {
                        error!("Connection failed: {}", e);
                        Some(e.to_string())
                    }
                };
                let _ = incoming_tx.send(NetworkEvent::Closed(reason));
            })?;

        Ok(NetworkClient {
            outgoing,
            incoming,
            status: ConnectionStatus::Connecting,
        })
    }

    /// Queues an event for the server; silently dropped once the connection is closed
    pub fn send(&self, event: ClientEvent) {
        if self.outgoing.send(event).is_err() {
            debug!("Connection closed, dropping outgoing event");
        }
    }

    /// Drains everything received since the last call, in arrival order
    pub fn poll(&mut self) -> Vec<ServerEvent> {
        let mut events = Vec::new();

        while let Ok(event) = self.incoming.try_recv() {
            match event {
                NetworkEvent::Connected => self.status = ConnectionStatus::Connected,
                NetworkEvent::Server(event) => events.push(event),
                NetworkEvent::Closed(reason) => self.status = ConnectionStatus::Closed(reason),
            }
        }

        events
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }
}

async fn run_connection(
    request: Request,
    mut outgoing: mpsc::UnboundedReceiver<ClientEvent>,
    incoming: mpsc::UnboundedSender<NetworkEvent>,
) -> NetworkResult<Option<String>> {
    let (ws_stream, _) = tokio_tungstenite::connect_async(request).await?;
    info!("Connected to server");
    let _ = incoming.send(NetworkEvent::Connected);

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            frame = read.next() => match frame {
                Some(Ok(Message::Text(text))) => match ServerEvent::from_json(&text) {
                    Ok(event) => {
                        if incoming.send(NetworkEvent::Server(event)).is_err() {
                            return Ok(None);
                        }
                    }
                    Err(e) => warn!("Malformed frame from server: {}", e),
                },
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame.map(|frame| frame.reason.to_string());
                    info!("Server closed the connection: {:?}", reason);
                    return Ok(reason);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(None),
            },

            event = outgoing.recv() => match event {
                Some(event) => write.send(Message::Text(event.to_json()?)).await?,
                None => {
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(None);
                }
            },
        }
    }
}
