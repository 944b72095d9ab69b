//! Room Registry
//!
//! Tracks which connection sits in which room under which name. Pure data:
//! the server wraps it in a lock and does the actual sending.

use std::collections::{BTreeMap, BTreeSet};

use uuid::Uuid;

use crate::network::protocol::{clean_name, DEFAULT_PLAYER, DEFAULT_ROOM};

/// Relay connection identifier.
pub type ConnectionId = Uuid;

/// A connection that has joined a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Room id.
    pub room: String,
    /// Display name.
    pub player: String,
}

/// Result of a join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    /// Room joined, after defaults and truncation.
    pub room: String,
    /// Name used, after defaults and truncation.
    pub player: String,
    /// Members now in the room, joiner included.
    pub peers: usize,
    /// Room left by this join, if the connection was elsewhere.
    pub moved_from: Option<String>,
}

/// Rooms and their members.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: BTreeMap<String, BTreeSet<ConnectionId>>,
    members: BTreeMap<ConnectionId, Member>,
}

impl RoomRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Put a connection in a room, moving it out of any previous room.
    pub fn join(&mut self, conn: ConnectionId, room: Option<&str>, player: Option<&str>) -> JoinOutcome {
        let room = clean_name(room, DEFAULT_ROOM);
        let player = clean_name(player, DEFAULT_PLAYER);

        let moved_from = match self.members.get(&conn) {
            Some(prev) if prev.room != room => {
                let prev_room = prev.room.clone();
                self.remove_from_room(conn, &prev_room);
                Some(prev_room)
            }
            _ => None,
        };

        self.members.insert(
            conn,
            Member {
                room: room.clone(),
                player: player.clone(),
            },
        );
        let set = self.rooms.entry(room.clone()).or_default();
        set.insert(conn);
        let peers = set.len();

        JoinOutcome {
            room,
            player,
            peers,
            moved_from,
        }
    }

    /// Drop a connection. Returns its membership if it had joined.
    pub fn leave(&mut self, conn: ConnectionId) -> Option<Member> {
        let member = self.members.remove(&conn)?;
        self.remove_from_room(conn, &member.room);
        Some(member)
    }

    fn remove_from_room(&mut self, conn: ConnectionId, room: &str) {
        if let Some(set) = self.rooms.get_mut(room) {
            set.remove(&conn);
            if set.is_empty() {
                self.rooms.remove(room);
            }
        }
    }

    /// Membership of a connection.
    pub fn member(&self, conn: ConnectionId) -> Option<&Member> {
        self.members.get(&conn)
    }

    /// Everyone in `room` except `skip`.
    pub fn recipients(&self, room: &str, skip: ConnectionId) -> Vec<ConnectionId> {
        self.rooms
            .get(room)
            .map(|set| set.iter().copied().filter(|c| *c != skip).collect())
            .unwrap_or_default()
    }

    /// Members in a room.
    pub fn room_size(&self, room: &str) -> usize {
        self.rooms.get(room).map_or(0, BTreeSet::len)
    }

    /// Number of non-empty rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}
