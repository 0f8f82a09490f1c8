//! Client event handlers
//!
//! Handles incoming realtime messages based on their event name.

mod comment;
mod error;
mod room;

pub use comment::CommentHandler;
pub use error::{HandlerError, HandlerResult};
pub use room::RoomHandler;

use std::sync::Arc;

use crate::connection::Connection;
use crate::protocol::{pong, ClientEvent};
use crate::server::GatewayState;

/// Dispatch incoming client events to the appropriate handlers
pub struct MessageDispatcher;

impl MessageDispatcher {
    /// Handle a raw text frame
    ///
    /// Malformed frames are reported to the sender and never close the connection.
    pub async fn dispatch_text(
        state: &GatewayState,
        connection: &Arc<Connection>,
        text: &str,
    ) -> HandlerResult<()> {
        let event = ClientEvent::from_json(text).map_err(|e| {
            tracing::debug!(connection_id = %connection.id(), error = %e, "Failed to parse message");
            HandlerError::InvalidMessage(format!("Unrecognized message: {e}"))
        })?;
        Self::dispatch(state, connection, event).await
    }

    /// Handle a parsed client event
    pub async fn dispatch(
        state: &GatewayState,
        connection: &Arc<Connection>,
        event: ClientEvent,
    ) -> HandlerResult<()> {
        tracing::trace!(connection_id = %connection.id(), event = event.name(), "Received event");

        match event {
            ClientEvent::JoinPost(slug) => RoomHandler::join(state, connection, &slug).await,
            ClientEvent::LeavePost(slug) => RoomHandler::leave(state, connection, &slug).await,
            ClientEvent::NewComment(payload) => {
                CommentHandler::handle(state, connection, payload);
                Ok(())
            }
            ClientEvent::Ping => {
                state.bus().send_to(connection.id(), pong());
                Ok(())
            }
        }
    }
}
