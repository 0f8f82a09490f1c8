//! Gateway message format
//!
//! Every frame is a JSON text message `{"event": name, "data": payload}`.

use blog_bus::BusEvent;
use serde::Deserialize;
use serde_json::json;

use super::events;

/// Messages a client may send
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Subscribe to a post's room; data is the post slug
    JoinPost(String),
    /// Unsubscribe from a post's room; data is the post slug
    LeavePost(String),
    /// Write a comment on a post
    NewComment(NewCommentPayload),
    /// Application-level keepalive
    Ping,
}

impl ClientEvent {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Event name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinPost(_) => events::JOIN_POST,
            Self::LeavePost(_) => events::LEAVE_POST,
            Self::NewComment(_) => events::NEW_COMMENT,
            Self::Ping => events::PING,
        }
    }
}

/// `new_comment` data
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCommentPayload {
    pub post_slug: String,
    pub content: String,
    /// Display name for unauthenticated writers
    #[serde(default)]
    pub author: Option<String>,
}

// === Server Messages ===

/// First message on every connection
pub fn node_info(node_id: &str, version: &str) -> BusEvent {
    BusEvent::new(
        events::NODE_INFO,
        json!({ "nodeId": node_id, "version": version }),
    )
}

pub fn pong() -> BusEvent {
    BusEvent::new(events::PONG, serde_json::Value::Null)
}

/// Failure report for the originating connection only
pub fn comment_error(error: &str, code: &str) -> BusEvent {
    BusEvent::new(
        events::COMMENT_ERROR,
        json!({ "error": error, "code": code }),
    )
}
