//! WebSocket Relay Server
//!
//! Async WebSocket relay for co-op sessions. Connections join a room, then
//! chat and sync messages are fanned out to everyone else in that room.
//! The relay holds no game state.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, mpsc, RwLock};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::network::protocol::{ClientMessage, ServerMessage};
use crate::network::room::{ConnectionId, RoomRegistry};

/// Default bind address.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8787";

/// Default connection cap.
pub const DEFAULT_MAX_CONNECTIONS: usize = 256;

/// Outbound queue depth per connection.
const OUTBOUND_QUEUE: usize = 64;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub bind_addr: SocketAddr,
    /// Maximum concurrent connections.
    pub max_connections: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8787)),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl ServerConfig {
    /// Read `HALO_RELAY_ADDR` and `HALO_RELAY_MAX_CONNECTIONS`, falling back
    /// to defaults for unset or unparseable values.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let bind_addr = std::env::var("HALO_RELAY_ADDR")
            .ok()
            .and_then(|v| match v.parse() {
                Ok(addr) => Some(addr),
                Err(e) => {
                    warn!("Ignoring HALO_RELAY_ADDR={}: {}", v, e);
                    None
                }
            })
            .unwrap_or(defaults.bind_addr);
        let max_connections = std::env::var("HALO_RELAY_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_connections);
        Self {
            bind_addr,
            max_connections,
        }
    }
}

/// Relay errors.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Failed to bind or accept.
    #[error("Failed to bind: {0}")]
    BindFailed(#[from] std::io::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Connection limit reached.
    #[error("Connection limit reached")]
    ConnectionLimitReached,
}

type Senders = Arc<RwLock<BTreeMap<ConnectionId, mpsc::Sender<ServerMessage>>>>;
type Rooms = Arc<RwLock<RoomRegistry>>;

/// Holds one unit of the connection cap until dropped.
struct ConnectionSlot(Arc<AtomicUsize>);

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// The relay server.
pub struct RelayServer {
    /// Server configuration.
    config: ServerConfig,
    /// Room membership.
    rooms: Rooms,
    /// Outbound queue of every connection.
    senders: Senders,
    /// Accepted sockets, counted from accept until teardown.
    active: Arc<AtomicUsize>,
    /// Shutdown signal.
    shutdown_tx: broadcast::Sender<()>,
}

impl RelayServer {
    /// Create a new relay server.
    pub fn new(config: ServerConfig) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            rooms: Arc::new(RwLock::new(RoomRegistry::new())),
            senders: Arc::new(RwLock::new(BTreeMap::new())),
            active: Arc::new(AtomicUsize::new(0)),
            shutdown_tx,
        }
    }

    /// Bind the configured address and serve until shutdown.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<(), RelayError> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener until shutdown.
    pub async fn serve(&self, listener: TcpListener) -> Result<(), RelayError> {
        info!("HALO relay listening on ws://{}", listener.local_addr()?);
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            // Reserve before the handshake so pending sockets count too.
                            if self.active.fetch_add(1, Ordering::SeqCst) >= self.config.max_connections {
                                self.active.fetch_sub(1, Ordering::SeqCst);
                                warn!("{}, rejecting {}", RelayError::ConnectionLimitReached, addr);
                                continue;
                            }
                            let slot = ConnectionSlot(self.active.clone());

                            debug!("New connection from {}", addr);
                            self.handle_connection(stream, addr, slot);
                        }
                        Err(e) => {
                            error!("Accept error: {}", e);
                        }
                    }
                }
                _ = shutdown_rx.recv() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handle a new WebSocket connection.
    fn handle_connection(&self, stream: TcpStream, addr: SocketAddr, slot: ConnectionSlot) {
        let rooms = self.rooms.clone();
        let senders = self.senders.clone();
        let mut shutdown_rx = self.shutdown_tx.subscribe();

        tokio::spawn(async move {
            let _slot = slot;
            let ws_stream = match accept_async(stream).await {
                Ok(ws) => ws,
                Err(e) => {
                    error!("WebSocket handshake failed for {}: {}", addr, e);
                    return;
                }
            };

            let conn: ConnectionId = Uuid::new_v4();
            let (mut ws_sender, mut ws_receiver) = ws_stream.split();
            let (msg_tx, mut msg_rx) = mpsc::channel::<ServerMessage>(OUTBOUND_QUEUE);

            senders.write().await.insert(conn, msg_tx.clone());

            // Writer task
            let sender_task = tokio::spawn(async move {
                while let Some(msg) = msg_rx.recv().await {
                    let text = match msg.to_json() {
                        Ok(t) => t,
                        Err(e) => {
                            error!("Failed to serialize message: {}", e);
                            continue;
                        }
                    };
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
            });

            loop {
                tokio::select! {
                    msg = ws_receiver.next() => {
                        match msg {
                            Some(Ok(Message::Text(text))) => {
                                match ClientMessage::from_json(&text) {
                                    Ok(client_msg) => {
                                        Self::handle_client_message(conn, client_msg, &rooms, &senders, &msg_tx).await;
                                    }
                                    Err(e) => {
                                        debug!("Dropping invalid message from {}: {}", addr, e);
                                    }
                                }
                            }
                            Some(Ok(Message::Close(_))) | None => {
                                debug!("Client {} disconnected", addr);
                                break;
                            }
                            Some(Err(e)) => {
                                debug!("WebSocket error for {}: {}", addr, e);
                                break;
                            }
                            _ => {}
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        break;
                    }
                }
            }

            sender_task.abort();
            senders.write().await.remove(&conn);

            let left = rooms.write().await.leave(conn);
            if let Some(member) = left {
                let recipients = rooms.read().await.recipients(&member.room, conn);
                Self::deliver(&senders, &recipients, ServerMessage::left(&member.player, &member.room)).await;
                info!("{} left {}", member.player, member.room);
            }
            debug!("Client {} cleaned up", addr);
        });
    }

    /// Handle a parsed client message.
    async fn handle_client_message(
        conn: ConnectionId,
        msg: ClientMessage,
        rooms: &Rooms,
        senders: &Senders,
        sender: &mpsc::Sender<ServerMessage>,
    ) {
        match msg {
            ClientMessage::Join { room, player, .. } => {
                let (outcome, recipients) = {
                    let mut rooms = rooms.write().await;
                    let outcome = rooms.join(conn, room.as_deref(), player.as_deref());
                    let recipients = rooms.recipients(&outcome.room, conn);
                    (outcome, recipients)
                };
                info!("{} joined {} ({} peers)", outcome.player, outcome.room, outcome.peers);

                Self::deliver(senders, &recipients, ServerMessage::joined(&outcome.player, &outcome.room)).await;
                let _ = sender
                    .send(ServerMessage::Welcome {
                        room: outcome.room,
                        peers: outcome.peers,
                    })
                    .await;
            }
            ClientMessage::Chat { message } => {
                Self::relay(conn, rooms, senders, |from| ServerMessage::Chat { from, message }).await;
            }
            ClientMessage::Sync { payload } => {
                Self::relay(conn, rooms, senders, |from| ServerMessage::Sync { from, payload }).await;
            }
        }
    }

    /// Forward a message from a joined connection to the rest of its room.
    async fn relay<F>(conn: ConnectionId, rooms: &Rooms, senders: &Senders, build: F)
    where
        F: FnOnce(String) -> ServerMessage,
    {
        let routed = {
            let rooms = rooms.read().await;
            rooms
                .member(conn)
                .map(|m| (m.player.clone(), rooms.recipients(&m.room, conn)))
        };
        match routed {
            Some((from, recipients)) => Self::deliver(senders, &recipients, build(from)).await,
            None => debug!("Dropping message from {} before join", conn),
        }
    }

    /// Queue a message for each recipient. Full or closed queues drop it.
    async fn deliver(senders: &Senders, recipients: &[ConnectionId], msg: ServerMessage) {
        let senders = senders.read().await;
        for id in recipients {
            if let Some(tx) = senders.get(id) {
                if tx.try_send(msg.clone()).is_err() {
                    debug!("Dropping message for slow or closed peer {}", id);
                }
            }
        }
    }

    /// Signal the accept loop and every connection to stop.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }

    /// Get number of connected clients.
    pub async fn connection_count(&self) -> usize {
        self.senders.read().await.len()
    }

    /// Get number of non-empty rooms.
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.room_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.max_connections, 256);
    }

    #[tokio::test]
    async fn test_server_creation() {
        let config = ServerConfig {
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            ..Default::default()
        };
        let server = RelayServer::new(config);

        assert_eq!(server.connection_count().await, 0);
        assert_eq!(server.room_count().await, 0);
    }

    #[tokio::test]
    async fn test_server_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server = Arc::new(RelayServer::new(ServerConfig::default()));
        let handle = {
            let server = server.clone();
            tokio::spawn(async move { server.serve(listener).await })
        };
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        server.shutdown();
        let result = tokio::time::timeout(std::time::Duration::from_secs(5), handle).await;
        assert!(matches!(result, Ok(Ok(Ok(())))));
    }

    #[tokio::test]
    async fn test_pending_handshake_holds_connection_slot() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Arc::new(RelayServer::new(ServerConfig {
            bind_addr: addr,
            max_connections: 1,
        }));
        let handle = {
            let server = server.clone();
            tokio::spawn(async move { server.serve(listener).await })
        };

        // A raw socket that never finishes the WebSocket handshake.
        let idle = TcpStream::connect(addr).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(server.active.load(Ordering::SeqCst), 1);

        let url = format!("ws://{}", addr);
        let second = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            tokio_tungstenite::connect_async(url.as_str()),
        )
        .await
        .unwrap();
        assert!(second.is_err());
        assert_eq!(server.connection_count().await, 0);

        // Closing the idle socket frees the slot.
        drop(idle);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(server.active.load(Ordering::SeqCst), 0);
        let (ws, _) = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            tokio_tungstenite::connect_async(url.as_str()),
        )
        .await
        .unwrap()
        .unwrap();
        drop(ws);

        server.shutdown();
        let _ = tokio::time::timeout(std::time::Duration::from_secs(5), handle).await;
    }
}
