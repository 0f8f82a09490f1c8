//! Realtime comment handler

use std::sync::Arc;

use blog_core::Identity;
use blog_service::CommentService;

use super::error::HandlerError;
use crate::connection::Connection;
use crate::protocol::NewCommentPayload;
use crate::server::GatewayState;

/// Handles `new_comment`
pub struct CommentHandler;

impl CommentHandler {
    /// Start writing a comment
    ///
    /// The write runs in its own task so a client that disconnects mid-write
    /// cannot cancel it. The stored comment reaches the room through the
    /// service's broadcast, the writer included; failures go to the writer only.
    pub fn handle(
        state: &GatewayState,
        connection: &Arc<Connection>,
        payload: NewCommentPayload,
    ) -> tokio::task::JoinHandle<()> {
        let identity = Self::author_identity(connection.identity(), payload.author.as_deref());
        let state = state.clone();
        let connection_id = connection.id();

        tokio::spawn(async move {
            let result = CommentService::new(state.service_context())
                .add_comment(&payload.post_slug, &identity, payload.content)
                .await;

            if let Err(e) = result {
                let err = HandlerError::from(e);
                tracing::debug!(
                    connection_id = %connection_id,
                    post_slug = %payload.post_slug,
                    code = err.code(),
                    "Comment rejected"
                );
                state.bus().send_to(connection_id, err.into_event());
            }
        })
    }

    /// Token identity wins; otherwise the supplied name, or anonymous
    fn author_identity(connection: &Identity, author: Option<&str>) -> Identity {
        match (connection, author) {
            (Identity::User(_), _) => connection.clone(),
            (_, Some(name)) => Identity::guest(name),
            (_, None) => Identity::Anonymous,
        }
    }
}
