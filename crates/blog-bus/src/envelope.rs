//! Messages exchanged between nodes over the fan-out transport

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Identity of one backend process in the cluster
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(Arc<str>);

impl NodeId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self(id.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Event delivered to connections, serialized as `{"event": ..., "data": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusEvent {
    pub event: String,
    pub data: serde_json::Value,
}

impl BusEvent {
    pub fn new(event: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

/// One message on the cluster channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Node that published the message; it ignores its own copies
    pub origin: NodeId,
    #[serde(flatten)]
    pub kind: EnvelopeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EnvelopeKind {
    /// Event for every member of a room, on every node
    Room {
        /// Transport name of the room, `post:{slug}`
        room: String,
        event: String,
        payload: serde_json::Value,
    },
    /// Number of members the origin node holds in a room
    Presence { room: String, count: usize },
    /// Ask every node to re-announce its presence
    PresenceQuery,
    /// The origin node is shutting down; drop its counts
    NodeLeft,
}

impl Envelope {
    pub fn new(origin: NodeId, kind: EnvelopeKind) -> Self {
        Self { origin, kind }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
