//! Protocol Messages
//!
//! Wire format between relay clients and the relay server. Every message
//! is a JSON object tagged by `type`. The relay never interprets sync
//! payloads; it forwards them as-is.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Longest room or player name kept, in characters.
pub const MAX_NAME_LEN: usize = 32;

/// Room used when a join names none.
pub const DEFAULT_ROOM: &str = "lobby";

/// Player name used when a join names none.
pub const DEFAULT_PLAYER: &str = "anon";

// =============================================================================
// CLIENT -> SERVER MESSAGES
// =============================================================================

/// Messages sent from client to relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Enter a room (leaving any previous one).
    Join {
        /// Room id; defaults to the lobby.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room: Option<String>,
        /// Display name; defaults to "anon".
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player: Option<String>,
        /// Sender's seed. Informational.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        seed: Option<String>,
    },

    /// Chat line for the room.
    Chat {
        /// Text. Older clients send it as `text`.
        #[serde(default, alias = "text")]
        message: String,
    },

    /// Opaque sync payload for the room.
    Sync {
        /// Forwarded untouched.
        #[serde(default)]
        payload: Value,
    },
}

impl ClientMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

// =============================================================================
// SERVER -> CLIENT MESSAGES
// =============================================================================

/// Messages sent from relay to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent to a joiner.
    Welcome {
        /// Room joined.
        room: String,
        /// Members in the room, joiner included.
        peers: usize,
    },

    /// Relay notice (joins and leaves).
    System {
        /// Notice text.
        message: String,
    },

    /// Chat from a peer.
    Chat {
        /// Sender name.
        from: String,
        /// Text.
        #[serde(default, alias = "text")]
        message: String,
    },

    /// Sync payload from a peer.
    Sync {
        /// Sender name.
        from: String,
        /// Payload as sent.
        #[serde(default)]
        payload: Value,
    },
}

impl ServerMessage {
    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Join notice.
    pub fn joined(player: &str, room: &str) -> Self {
        ServerMessage::System {
            message: format!("{} joined {}", player, room),
        }
    }

    /// Leave notice.
    pub fn left(player: &str, room: &str) -> Self {
        ServerMessage::System {
            message: format!("{} left {}", player, room),
        }
    }
}

/// Trim a name to [`MAX_NAME_LEN`] characters, falling back on empty input.
pub fn clean_name(name: Option<&str>, fallback: &str) -> String {
    match name {
        Some(n) if !n.is_empty() => n.chars().take(MAX_NAME_LEN).collect(),
        _ => fallback.to_string(),
    }
}
