//! Individual realtime connection
//!
//! Represents a single WebSocket connection and its state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use blog_bus::ConnectionId;
use blog_core::Identity;
use parking_lot::RwLock;

/// Connection state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Upgraded, in no room yet
    Connected,
    /// Member of at least one post room
    Subscribed,
    /// Closed; every room has been left
    Disconnected,
}

/// A single realtime connection
pub struct Connection {
    /// Bus-assigned id, unique on this process
    id: ConnectionId,

    /// Resolved once at upgrade time
    identity: Identity,

    state: RwLock<ConnectionState>,

    /// Last frame of any kind received from the client
    last_seen: RwLock<Instant>,

    created_at: Instant,
}

impl Connection {
    pub fn new(id: ConnectionId, identity: Identity) -> Arc<Self> {
        Arc::new(Self {
            id,
            identity,
            state: RwLock::new(ConnectionState::Connected),
            last_seen: RwLock::new(Instant::now()),
            created_at: Instant::now(),
        })
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    pub fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
    }

    pub fn is_open(&self) -> bool {
        self.state() != ConnectionState::Disconnected
    }

    /// Record client activity
    pub fn touch(&self) {
        *self.last_seen.write() = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_seen.read().elapsed()
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("authenticated", &self.identity.is_authenticated())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
