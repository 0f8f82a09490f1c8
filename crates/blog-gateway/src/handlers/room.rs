//! Post room membership handler

use std::sync::Arc;

use blog_core::RoomId;

use super::error::{HandlerError, HandlerResult};
use crate::connection::{Connection, ConnectionState};
use crate::server::GatewayState;

/// Handles `join_post` and `leave_post`
pub struct RoomHandler;

impl RoomHandler {
    /// Subscribe a connection to a post's room
    ///
    /// The new member count reaches every member, including the joiner.
    pub async fn join(
        state: &GatewayState,
        connection: &Arc<Connection>,
        post_slug: &str,
    ) -> HandlerResult<()> {
        let room = RoomId::for_post(post_slug)?;

        let count = state
            .bus()
            .join(connection.id(), &room)
            .await
            .ok_or_else(|| HandlerError::InvalidMessage("Connection is closed".to_string()))?;

        connection.set_state(ConnectionState::Subscribed);

        tracing::debug!(
            connection_id = %connection.id(),
            room = %room,
            count,
            "Joined post"
        );
        Ok(())
    }

    /// Unsubscribe a connection from a post's room
    pub async fn leave(
        state: &GatewayState,
        connection: &Arc<Connection>,
        post_slug: &str,
    ) -> HandlerResult<()> {
        let room = RoomId::for_post(post_slug)?;

        if state.bus().leave(connection.id(), &room).await.is_some()
            && state.bus().rooms_of(connection.id()).is_empty()
        {
            connection.set_state(ConnectionState::Connected);
        }

        tracing::debug!(connection_id = %connection.id(), room = %room, "Left post");
        Ok(())
    }
}
