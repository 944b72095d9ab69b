//! Network Layer
//!
//! WebSocket relay for co-op chat and depth sync, plus the client boundary
//! a game uses to talk to it. This layer is **non-deterministic** - all game
//! logic runs through `game/`.

pub mod protocol;
pub mod room;
pub mod server;
pub mod client;

pub use protocol::{clean_name, ClientMessage, ServerMessage, DEFAULT_PLAYER, DEFAULT_ROOM, MAX_NAME_LEN};
pub use room::{ConnectionId, JoinOutcome, Member, RoomRegistry};
pub use server::{RelayError, RelayServer, ServerConfig};
pub use client::{
    apply_relay_event, chat_command, join_command, request_connect, sync_payload, RelayClient,
    RelayCommand, RelayEvent, SyncPayload,
};
