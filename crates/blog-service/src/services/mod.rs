//! Business logic services
//!
//! Services validate input, call the repositories and broadcast committed
//! changes on the bus.

mod broadcast;
pub mod comment;
pub mod context;
pub mod error;
pub mod vote;

#[cfg(test)]
pub(crate) mod testing;

pub use comment::CommentService;
pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use vote::VoteService;
