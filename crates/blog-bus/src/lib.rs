//! # blog-bus
//!
//! Presence and broadcast bus for the realtime gateway.
//!
//! - [`RoomRegistry`] - local connections and their room memberships
//! - [`FanOut`] - cluster-wide publish/subscribe ([`LocalFanOut`] or [`RedisFanOut`])
//! - [`Bus`] - ties the two together: broadcasts, member counts, presence gossip

mod bus;
pub mod envelope;
pub mod error;
pub mod fanout;
pub mod pool;
mod presence;
pub mod registry;

pub use bus::{Bus, ONLINE_USERS_EVENT, STALE_AFTER_HEARTBEATS};
pub use envelope::{BusEvent, Envelope, EnvelopeKind, NodeId};
pub use error::{FanOutError, FanOutResult};
pub use fanout::{FanOut, LocalFanOut, RedisFanOut, SubscriberConfig};
pub use pool::{RedisPool, RedisPoolConfig};
pub use presence::RemotePresence;
pub use registry::{outbound_queue, ConnectionId, EventReceiver, EventSender, RoomRegistry};
