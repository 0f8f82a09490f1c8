//! Fan-out of committed domain events to post rooms

use blog_core::{DomainEvent, RoomId};
use serde_json::Value;
use tracing::warn;

use crate::dto::{CommentResponse, CommentWithPost, VoteUpdate};

use super::context::ServiceContext;

/// Client payload of an event
fn payload(event: &DomainEvent) -> Result<Value, serde_json::Error> {
    match event {
        DomainEvent::CommentAdded { post_slug, comment } => {
            serde_json::to_value(CommentResponse::from(CommentWithPost { comment, post_slug }))
        }
        DomainEvent::CommentVoteUpdated(tally) => serde_json::to_value(VoteUpdate::from(tally)),
    }
}

/// Broadcast an event to its post's room on every node
///
/// The write has already committed; delivery problems are logged and never
/// turned into errors for the caller.
pub(crate) async fn publish(ctx: &ServiceContext, event: &DomainEvent) {
    let room = match RoomId::for_post(event.post_slug()) {
        Ok(room) => room,
        Err(e) => {
            warn!(slug = event.post_slug(), error = %e, "Event for an unroutable post");
            return;
        }
    };

    let payload = match payload(event) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(event = event.event_name(), error = %e, "Failed to serialize event");
            return;
        }
    };

    ctx.bus().broadcast(&room, event.event_name(), payload).await;
}
