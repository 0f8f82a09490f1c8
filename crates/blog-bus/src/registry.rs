//! Local room membership
//!
//! Tracks the connections attached to this process and the rooms each one has
//! joined. All operations are synchronous; nothing here touches the network.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use blog_core::RoomId;
use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::envelope::BusEvent;

/// Capacity of each connection's outbound queue
pub const OUTBOUND_QUEUE_CAPACITY: usize = 100;

/// Events queued for one connection
pub type EventSender = mpsc::Sender<Arc<BusEvent>>;
pub type EventReceiver = mpsc::Receiver<Arc<BusEvent>>;

/// Create a connection's outbound queue
pub fn outbound_queue() -> (EventSender, EventReceiver) {
    mpsc::channel(OUTBOUND_QUEUE_CAPACITY)
}

/// Identifier of one live client connection on this process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

struct ConnectionEntry {
    sender: EventSender,
    rooms: HashSet<RoomId>,
}

/// Rooms and connections of this process
pub struct RoomRegistry {
    /// Connections by id, with the rooms each has joined
    connections: DashMap<ConnectionId, ConnectionEntry>,
    /// Room to connection ids
    rooms: DashMap<RoomId, HashSet<ConnectionId>>,
}

impl RoomRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            rooms: DashMap::new(),
        }
    }

    /// Register a connection and its outbound queue
    pub fn register(&self, connection_id: ConnectionId, sender: EventSender) {
        self.connections.insert(
            connection_id,
            ConnectionEntry {
                sender,
                rooms: HashSet::new(),
            },
        );
        tracing::debug!(connection_id = %connection_id, "Connection registered");
    }

    /// Add a connection to a room
    ///
    /// Returns `None` for an unknown connection, otherwise whether membership changed.
    pub fn join(&self, connection_id: ConnectionId, room: &RoomId) -> Option<bool> {
        let added = {
            let mut entry = self.connections.get_mut(&connection_id)?;
            entry.rooms.insert(room.clone())
        };

        if added {
            self.rooms
                .entry(room.clone())
                .or_default()
                .insert(connection_id);
        }
        Some(added)
    }

    /// Remove a connection from a room
    ///
    /// Returns `None` for an unknown connection, otherwise whether membership changed.
    pub fn leave(&self, connection_id: ConnectionId, room: &RoomId) -> Option<bool> {
        let removed = {
            let mut entry = self.connections.get_mut(&connection_id)?;
            entry.rooms.remove(room)
        };

        if removed {
            self.remove_member(room, connection_id);
        }
        Some(removed)
    }

    /// Drop a connection, returning the rooms it was in
    pub fn unregister(&self, connection_id: ConnectionId) -> Vec<RoomId> {
        let Some((_, entry)) = self.connections.remove(&connection_id) else {
            return Vec::new();
        };

        let rooms: Vec<RoomId> = entry.rooms.into_iter().collect();
        for room in &rooms {
            self.remove_member(room, connection_id);
        }

        tracing::debug!(
            connection_id = %connection_id,
            rooms = rooms.len(),
            "Connection unregistered"
        );
        rooms
    }

    fn remove_member(&self, room: &RoomId, connection_id: ConnectionId) {
        if let Some(mut members) = self.rooms.get_mut(room) {
            members.remove(&connection_id);
        }
        // Checked under the shard lock, so a concurrent join is never lost
        self.rooms.remove_if(room, |_, members| members.is_empty());
    }

    /// Number of members of a room on this process
    pub fn local_count(&self, room: &RoomId) -> usize {
        self.rooms.get(room).map_or(0, |members| members.len())
    }

    /// Non-empty rooms on this process with their member counts
    pub fn room_counts(&self) -> Vec<(RoomId, usize)> {
        self.rooms
            .iter()
            .filter(|entry| !entry.value().is_empty())
            .map(|entry| (entry.key().clone(), entry.value().len()))
            .collect()
    }

    /// Rooms a connection has joined
    pub fn rooms_of(&self, connection_id: ConnectionId) -> Vec<RoomId> {
        self.connections
            .get(&connection_id)
            .map(|entry| entry.rooms.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Queue an event for every member of a room, returning how many accepted it
    pub fn deliver(&self, room: &RoomId, event: &Arc<BusEvent>) -> usize {
        // Collect senders first so no room lock is held while touching connections
        let members: Vec<ConnectionId> = self
            .rooms
            .get(room)
            .map(|members| members.iter().copied().collect())
            .unwrap_or_default();

        members
            .into_iter()
            .filter(|connection_id| self.send_to(*connection_id, Arc::clone(event)))
            .count()
    }

    /// Queue an event for one connection
    ///
    /// A full queue drops the event for that connection instead of waiting on it.
    pub fn send_to(&self, connection_id: ConnectionId, event: Arc<BusEvent>) -> bool {
        let Some(sender) = self
            .connections
            .get(&connection_id)
            .map(|entry| entry.sender.clone())
        else {
            return false;
        };

        match sender.try_send(event) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(event)) => {
                tracing::warn!(
                    connection_id = %connection_id,
                    event = %event.event,
                    "Outbound queue full, dropping event"
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// Number of registered connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of non-empty rooms
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RoomRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoomRegistry")
            .field("connections", &self.connections.len())
            .field("rooms", &self.rooms.len())
            .finish()
    }
}
