//! Event names on the wire

// Client -> server
pub const JOIN_POST: &str = "join_post";
pub const LEAVE_POST: &str = "leave_post";
pub const NEW_COMMENT: &str = "new_comment";
pub const PING: &str = "ping";

// Server -> client
pub const NODE_INFO: &str = "node_info";
pub const COMMENT_ADDED: &str = "comment_added";
pub const ONLINE_USERS: &str = blog_bus::ONLINE_USERS_EVENT;
pub const COMMENT_ERROR: &str = "comment_error";
pub const PONG: &str = "pong";

/// Error code for frames that are not a known client event
pub const INVALID_MESSAGE: &str = "INVALID_MESSAGE";
