//! Database models
//!
//! Row types mirroring the tables, decoded with SQLx `FromRow`.

mod comment;
mod post;
mod vote;

pub use comment::{CommentCountersModel, CommentModel};
pub use post::PostModel;
pub use vote::VoteModel;
