//! Shared fixtures for service tests

use std::sync::Arc;
use std::time::Duration;

use blog_bus::{outbound_queue, Bus, ConnectionId, EventReceiver, LocalFanOut, NodeId};
use blog_core::{Identity, Post, RoomId, UserId, UserIdentity};
use blog_db::MemoryStore;

use super::context::{ServiceContext, ServiceContextBuilder};

pub(crate) struct Harness {
    pub store: MemoryStore,
    pub ctx: ServiceContext,
    pub post: Post,
}

pub(crate) fn harness() -> Harness {
    let store = MemoryStore::new();
    let post = store.insert_post(Post::new("hello-world", "Hello", "Body"));
    let bus = Bus::new(
        NodeId::new("test-node"),
        Arc::new(LocalFanOut::new()),
        Duration::from_secs(30),
    );

    let ctx = ServiceContextBuilder::new()
        .post_repo(Arc::new(store.clone()))
        .comment_repo(Arc::new(store.clone()))
        .vote_repo(Arc::new(store.clone()))
        .bus(bus)
        .build()
        .unwrap();

    Harness { store, ctx, post }
}

/// Authenticated identity with a fresh user id
pub(crate) fn user(username: &str) -> Identity {
    Identity::from(UserIdentity::new(UserId::generate(), username))
}

/// A connection joined to the harness post's room
pub(crate) async fn subscriber(h: &Harness) -> EventReceiver {
    let (tx, rx) = outbound_queue();
    let connection_id = ConnectionId::generate();
    h.ctx.bus().register(connection_id, tx);
    h.ctx
        .bus()
        .join(connection_id, &RoomId::for_post(&h.post.slug).unwrap())
        .await
        .unwrap();
    rx
}
