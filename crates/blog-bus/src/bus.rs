//! Presence and broadcast bus
//!
//! Membership is tracked per process in a [`RoomRegistry`]. Broadcasts are delivered
//! to local members right away and published once on the [`FanOut`]; every other
//! node re-delivers them to its own members. Member counts combine local membership
//! with counts gossiped by the other nodes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use blog_common::{FanOutConfig, FanOutTransport};
use blog_core::RoomId;
use serde_json::json;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::envelope::{BusEvent, Envelope, EnvelopeKind, NodeId};
use crate::fanout::{FanOut, LocalFanOut, RedisFanOut, SubscriberConfig};
use crate::pool::RedisPoolConfig;
use crate::presence::RemotePresence;
use crate::registry::{ConnectionId, EventSender, RoomRegistry};

/// Event carrying a room's member count
pub const ONLINE_USERS_EVENT: &str = "online_users";

/// Remote counts expire after this many missed heartbeats
pub const STALE_AFTER_HEARTBEATS: u32 = 3;

/// Shortest heartbeat accepted; a zero period would stall the timer
pub const MIN_HEARTBEAT: Duration = Duration::from_millis(10);

/// Process-wide bus instance
pub struct Bus {
    node_id: NodeId,
    registry: RoomRegistry,
    presence: RemotePresence,
    fanout: Arc<dyn FanOut>,
    heartbeat: Duration,
    degraded: bool,
    running: AtomicBool,
    shutdown: watch::Sender<bool>,
}

impl Bus {
    pub fn new(node_id: NodeId, fanout: Arc<dyn FanOut>, heartbeat: Duration) -> Arc<Self> {
        Self::build(node_id, fanout, heartbeat, false)
    }

    fn build(
        node_id: NodeId,
        fanout: Arc<dyn FanOut>,
        heartbeat: Duration,
        degraded: bool,
    ) -> Arc<Self> {
        let heartbeat = heartbeat.max(MIN_HEARTBEAT);
        let (shutdown, _) = watch::channel(false);
        Arc::new(Self {
            node_id,
            registry: RoomRegistry::new(),
            presence: RemotePresence::new(heartbeat * STALE_AFTER_HEARTBEATS),
            fanout,
            heartbeat,
            degraded,
            running: AtomicBool::new(false),
            shutdown,
        })
    }

    /// Build the bus with the configured transport
    ///
    /// An unreachable Redis does not fail startup: the bus falls back to local-only
    /// delivery and says so in the log.
    pub async fn from_config(node_id: NodeId, config: &FanOutConfig) -> Arc<Self> {
        let heartbeat = config.presence_heartbeat();

        let redis = match (config.transport, &config.redis) {
            (FanOutTransport::Local, _) => {
                return Self::new(node_id, Arc::new(LocalFanOut::new()), heartbeat);
            }
            (FanOutTransport::Redis, Some(redis)) => redis,
            (FanOutTransport::Redis, None) => {
                tracing::warn!(
                    node_id = %node_id,
                    "Redis fan-out requested without a Redis URL, delivering locally only"
                );
                return Self::build(node_id, Arc::new(LocalFanOut::new()), heartbeat, true);
            }
        };

        let subscriber = SubscriberConfig {
            redis_url: redis.url.clone(),
            channel: config.channel.clone(),
            ..Default::default()
        };
        match RedisFanOut::connect(&RedisPoolConfig::from(redis), subscriber).await {
            Ok(fanout) => Self::new(node_id, Arc::new(fanout), heartbeat),
            Err(e) => {
                tracing::warn!(
                    node_id = %node_id,
                    error = %e,
                    "Fan-out transport unavailable, delivering locally only"
                );
                Self::build(node_id, Arc::new(LocalFanOut::new()), heartbeat, true)
            }
        }
    }

    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    /// Name of the transport in use
    pub fn transport(&self) -> &'static str {
        self.fanout.name()
    }

    /// Whether a cluster transport was requested but is not in use
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Start the receive and heartbeat tasks
    pub fn start(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::warn!(node_id = %self.node_id, "Bus is already running");
            return Vec::new();
        }

        // Subscribe before spawning so nothing published from here on is missed
        let receiver = self.fanout.subscribe();
        let handles = vec![
            tokio::spawn(Arc::clone(self).receive_loop(receiver)),
            tokio::spawn(Arc::clone(self).heartbeat_loop()),
        ];

        tracing::info!(
            node_id = %self.node_id,
            transport = self.transport(),
            degraded = self.degraded,
            "Bus started"
        );
        handles
    }

    /// Tell the cluster this node is leaving and stop the background tasks
    pub async fn stop(&self) {
        self.publish(EnvelopeKind::NodeLeft).await;
        self.shutdown.send_replace(true);
        if let Err(e) = self.fanout.close().await {
            tracing::warn!(error = %e, transport = self.transport(), "Fan-out did not close cleanly");
        }
        self.running.store(false, Ordering::SeqCst);
        tracing::info!(node_id = %self.node_id, "Bus stopped");
    }

    // ------------------------------------------------------------------------
    // Membership
    // ------------------------------------------------------------------------

    /// Attach a connection's outbound queue
    pub fn register(&self, connection_id: ConnectionId, sender: EventSender) {
        self.registry.register(connection_id, sender);
    }

    /// Join a room, returning the room's member count, or `None` for an unknown connection
    pub async fn join(&self, connection_id: ConnectionId, room: &RoomId) -> Option<usize> {
        if self.registry.join(connection_id, room)? {
            tracing::debug!(connection_id = %connection_id, room = %room, "Joined room");
            self.announce(room).await;
            self.notify_count(room);
        } else {
            // Already a member; still tell the caller where the room stands
            self.registry
                .send_to(connection_id, online_users(room, self.member_count(room)));
        }
        Some(self.member_count(room))
    }

    /// Leave a room, returning the room's member count, or `None` for an unknown connection
    pub async fn leave(&self, connection_id: ConnectionId, room: &RoomId) -> Option<usize> {
        if self.registry.leave(connection_id, room)? {
            tracing::debug!(connection_id = %connection_id, room = %room, "Left room");
            self.announce(room).await;
            self.notify_count(room);
        }
        Some(self.member_count(room))
    }

    /// Remove a connection from every room it joined and publish the new counts
    pub async fn disconnect(&self, connection_id: ConnectionId) -> Vec<RoomId> {
        let rooms = self.registry.unregister(connection_id);
        for room in &rooms {
            self.announce(room).await;
            self.notify_count(room);
        }
        rooms
    }

    /// Members of a room across the cluster
    pub fn member_count(&self, room: &RoomId) -> usize {
        self.registry.local_count(room) + self.presence.total(room)
    }

    /// Members of a room on this process
    pub fn local_member_count(&self, room: &RoomId) -> usize {
        self.registry.local_count(room)
    }

    /// Connections attached to this process
    pub fn connection_count(&self) -> usize {
        self.registry.connection_count()
    }

    /// Rooms a connection has joined
    pub fn rooms_of(&self, connection_id: ConnectionId) -> Vec<RoomId> {
        self.registry.rooms_of(connection_id)
    }

    // ------------------------------------------------------------------------
    // Delivery
    // ------------------------------------------------------------------------

    /// Deliver an event to every member of a room on every node
    ///
    /// Returns the number of local members reached. A failed publish leaves the
    /// event delivered on this node only.
    pub async fn broadcast(&self, room: &RoomId, event: &str, payload: serde_json::Value) -> usize {
        let delivered = self
            .registry
            .deliver(room, &Arc::new(BusEvent::new(event, payload.clone())));

        self.publish(EnvelopeKind::Room {
            room: room.channel_name(),
            event: event.to_string(),
            payload,
        })
        .await;

        tracing::debug!(room = %room, event, delivered, "Broadcast");
        delivered
    }

    /// Queue an event for one connection only
    pub fn send_to(&self, connection_id: ConnectionId, event: BusEvent) -> bool {
        self.registry.send_to(connection_id, Arc::new(event))
    }

    async fn publish(&self, kind: EnvelopeKind) {
        let envelope = Envelope::new(self.node_id.clone(), kind);
        if let Err(e) = self.fanout.publish(&envelope).await {
            tracing::warn!(
                node_id = %self.node_id,
                transport = self.transport(),
                error = %e,
                "Fan-out publish failed, delivered locally only"
            );
        }
    }

    /// Publish this node's count for a room
    async fn announce(&self, room: &RoomId) {
        self.publish(EnvelopeKind::Presence {
            room: room.channel_name(),
            count: self.registry.local_count(room),
        })
        .await;
    }

    async fn announce_all(&self) {
        for (room, count) in self.registry.room_counts() {
            self.publish(EnvelopeKind::Presence {
                room: room.channel_name(),
                count,
            })
            .await;
        }
    }

    /// Send the current member count to the local members of a room
    fn notify_count(&self, room: &RoomId) {
        if self.registry.local_count(room) > 0 {
            self.registry
                .deliver(room, &online_users(room, self.member_count(room)));
        }
    }

    // ------------------------------------------------------------------------
    // Background tasks
    // ------------------------------------------------------------------------

    async fn receive_loop(self: Arc<Self>, mut receiver: broadcast::Receiver<Envelope>) {
        let mut shutdown = self.shutdown.subscribe();

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                msg = receiver.recv() => match msg {
                    Ok(envelope) => self.handle_envelope(envelope).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(node_id = %self.node_id, lagged = n, "Bus receiver lagged behind");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::warn!(node_id = %self.node_id, "Fan-out stream closed");
                        break;
                    }
                },
            }
        }

        tracing::debug!(node_id = %self.node_id, "Bus receive loop ended");
    }

    async fn handle_envelope(&self, envelope: Envelope) {
        if envelope.origin == self.node_id {
            return;
        }

        match envelope.kind {
            EnvelopeKind::Room {
                room,
                event,
                payload,
            } => {
                let Some(room) = RoomId::from_channel_name(&room) else {
                    tracing::debug!(room = %room, "Ignoring envelope for unknown room");
                    return;
                };
                self.registry
                    .deliver(&room, &Arc::new(BusEvent::new(event, payload)));
            }
            EnvelopeKind::Presence { room, count } => {
                let Some(room) = RoomId::from_channel_name(&room) else {
                    return;
                };
                if self.presence.record(&room, &envelope.origin, count) {
                    self.notify_count(&room);
                }
            }
            EnvelopeKind::PresenceQuery => self.announce_all().await,
            EnvelopeKind::NodeLeft => {
                tracing::info!(node_id = %self.node_id, peer = %envelope.origin, "Peer node left");
                for room in self.presence.forget_node(&envelope.origin) {
                    self.notify_count(&room);
                }
            }
        }
    }

    async fn heartbeat_loop(self: Arc<Self>) {
        let mut shutdown = self.shutdown.subscribe();
        let mut interval = tokio::time::interval(self.heartbeat);

        // Learn the other nodes' counts now rather than at their next heartbeat
        self.publish(EnvelopeKind::PresenceQuery).await;

        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = interval.tick() => {
                    self.announce_all().await;
                    for room in self.presence.prune() {
                        self.notify_count(&room);
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for Bus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bus")
            .field("node_id", &self.node_id)
            .field("transport", &self.transport())
            .field("degraded", &self.degraded)
            .field("registry", &self.registry)
            .finish()
    }
}

fn online_users(room: &RoomId, count: usize) -> Arc<BusEvent> {
    Arc::new(BusEvent::new(
        ONLINE_USERS_EVENT,
        json!({ "postId": room.slug(), "count": count }),
    ))
}
