//! Gateway protocol definitions
//!
//! Defines the client and server events and the frame format.

pub mod events;
mod messages;

pub use messages::{comment_error, node_info, pong, ClientEvent, NewCommentPayload};
