//! Relay Client
//!
//! Message-passing boundary between a game and the relay. The socket lives
//! in a spawned task: commands go in through [`RelayClient::send`], events
//! come out of the receiver returned by [`RelayClient::connect`]. The owner
//! of the `GameState` applies events with [`apply_relay_event`], which is
//! pure and never touches the network.

use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::game::run::fingerprint;
use crate::game::state::{GameState, OnlineStatus};
use crate::network::protocol::{ClientMessage, ServerMessage};
use crate::network::server::RelayError;

/// Sender name of relay notices in the online log.
pub const SYSTEM_SENDER: &str = "system";

/// Command and event queue depth.
const CHANNEL_DEPTH: usize = 64;

// =============================================================================
// BOUNDARY TYPES
// =============================================================================

/// Depth sync payload carried inside a relay `sync` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPayload {
    /// Sender's seed string.
    pub seed: String,
    /// Sender's run depth.
    pub depth: u32,
    /// Hex run fingerprint.
    #[serde(default)]
    pub fingerprint: String,
}

/// Outbound command.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayCommand {
    /// Enter a room.
    Join {
        /// Room id.
        room: String,
        /// Display name; empty lets the relay pick.
        player: String,
        /// Sender's seed.
        seed: String,
    },
    /// Chat line.
    Chat(String),
    /// Depth sync.
    Sync(SyncPayload),
    /// Close the socket.
    Close,
}

/// Inbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    /// Socket open.
    Connected,
    /// Socket closed or failed.
    Disconnected,
    /// Message from the relay.
    Message(ServerMessage),
}

impl RelayCommand {
    fn into_message(self) -> Option<ClientMessage> {
        match self {
            RelayCommand::Join { room, player, seed } => Some(ClientMessage::Join {
                room: Some(room),
                player: (!player.is_empty()).then_some(player),
                seed: Some(seed),
            }),
            RelayCommand::Chat(message) => Some(ClientMessage::Chat { message }),
            RelayCommand::Sync(payload) => match serde_json::to_value(payload) {
                Ok(payload) => Some(ClientMessage::Sync { payload }),
                Err(e) => {
                    warn!("Failed to encode sync payload: {}", e);
                    None
                }
            },
            RelayCommand::Close => None,
        }
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// Handle to a relay connection.
#[derive(Debug, Clone)]
pub struct RelayClient {
    commands: mpsc::Sender<RelayCommand>,
}

impl RelayClient {
    /// Open a connection. The first event is always [`RelayEvent::Connected`]
    /// and the last is [`RelayEvent::Disconnected`].
    pub async fn connect(url: &str) -> Result<(Self, mpsc::Receiver<RelayEvent>), RelayError> {
        let (ws_stream, _) = connect_async(url).await?;
        info!("Relay connected: {}", url);

        let (cmd_tx, mut cmd_rx) = mpsc::channel::<RelayCommand>(CHANNEL_DEPTH);
        let (event_tx, event_rx) = mpsc::channel::<RelayEvent>(CHANNEL_DEPTH);
        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        tokio::spawn(async move {
            let _ = event_tx.send(RelayEvent::Connected).await;

            loop {
                tokio::select! {
                    cmd = cmd_rx.recv() => {
                        let Some(cmd) = cmd else { break };
                        if cmd == RelayCommand::Close {
                            let _ = ws_sender.send(Message::Close(None)).await;
                            break;
                        }
                        let Some(msg) = cmd.into_message() else { continue };
                        let text = match msg.to_json() {
                            Ok(t) => t,
                            Err(e) => {
                                warn!("Failed to serialize relay message: {}", e);
                                continue;
                            }
                        };
                        if ws_sender.send(Message::Text(text)).await.is_err() {
                            break;
                        }
                    }
                    frame = ws_receiver.next() => {
                        match frame {
                            Some(Ok(Message::Text(text))) => match ServerMessage::from_json(&text) {
                                Ok(msg) => {
                                    let _ = event_tx.send(RelayEvent::Message(msg)).await;
                                }
                                Err(e) => debug!("Ignoring relay frame: {}", e),
                            },
                            Some(Ok(Message::Close(_))) | None => break,
                            Some(Err(e)) => {
                                debug!("Relay socket error: {}", e);
                                break;
                            }
                            _ => {}
                        }
                    }
                }
            }

            info!("Relay disconnected");
            let _ = event_tx.send(RelayEvent::Disconnected).await;
        });

        Ok((Self { commands: cmd_tx }, event_rx))
    }

    /// Queue a command. Dropped when the queue is full or the socket is gone.
    pub fn send(&self, cmd: RelayCommand) -> bool {
        match self.commands.try_send(cmd) {
            Ok(()) => true,
            Err(e) => {
                debug!("Relay command dropped: {}", e);
                false
            }
        }
    }

    /// Ask the connection task to close the socket.
    pub fn close(&self) -> bool {
        self.send(RelayCommand::Close)
    }
}

// =============================================================================
// STATE GLUE
// =============================================================================

/// Mark a connection as requested. Returns the URL to dial, or `None` when
/// the relay is disabled.
pub fn request_connect(state: &mut GameState) -> Option<String> {
    if !state.online.enabled {
        return None;
    }
    state.online.status = OnlineStatus::Connecting;
    Some(state.online.url.clone())
}

/// Join command for the state's room.
pub fn join_command(state: &GameState) -> RelayCommand {
    RelayCommand::Join {
        room: state.relay_room().to_string(),
        player: state.profile.pilot.clone(),
        seed: state.profile.seed.clone(),
    }
}

/// Chat command, echoed into the local log. `None` when the relay is
/// disabled or the text is empty.
pub fn chat_command(state: &mut GameState, text: &str) -> Option<RelayCommand> {
    if !state.online.enabled || text.is_empty() {
        return None;
    }
    let sender = if state.profile.pilot.is_empty() {
        "me".to_string()
    } else {
        state.profile.pilot.clone()
    };
    state.online.push_line(sender, text);
    Some(RelayCommand::Chat(text.to_string()))
}

/// Sync payload of the active run.
pub fn sync_payload(state: &GameState) -> Option<SyncPayload> {
    let run = state.run.as_ref()?;
    Some(SyncPayload {
        seed: state.profile.seed.clone(),
        depth: run.depth,
        fingerprint: hex::encode(fingerprint(run, &state.rng)),
    })
}

/// Apply an inbound relay event to the state.
pub fn apply_relay_event(state: &mut GameState, event: &RelayEvent) {
    match event {
        RelayEvent::Connected => {
            state.online.status = OnlineStatus::Online;
            state.online.push_line(SYSTEM_SENDER, "Connected");
        }
        RelayEvent::Disconnected => {
            state.online.status = OnlineStatus::Offline;
        }
        RelayEvent::Message(ServerMessage::Welcome { room, peers }) => {
            state
                .online
                .push_line(SYSTEM_SENDER, format!("Joined {} ({} in room)", room, peers));
        }
        RelayEvent::Message(ServerMessage::System { message }) => {
            state.online.push_line(SYSTEM_SENDER, message.clone());
        }
        RelayEvent::Message(ServerMessage::Chat { from, message }) => {
            state.online.push_line(from.clone(), message.clone());
        }
        RelayEvent::Message(ServerMessage::Sync { from, payload }) => {
            if !state.online.peers.contains(from) {
                state.online.peers.push(from.clone());
            }
            let sync: SyncPayload = match serde_json::from_value(payload.clone()) {
                Ok(sync) => sync,
                Err(e) => {
                    debug!("Ignoring sync from {}: {}", from, e);
                    return;
                }
            };
            if sync.seed != state.profile.seed {
                debug!("Ignoring sync from {} on seed {}", from, sync.seed);
                return;
            }
            if let Some(run) = state.run.as_mut().filter(|run| run.is_running()) {
                if sync.depth > run.depth {
                    debug!("Depth synced from {}: {} -> {}", from, run.depth, sync.depth);
                    run.depth = sync.depth;
                }
            }
        }
    }
}
