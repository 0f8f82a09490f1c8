//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in blog-core. Every
//! statement runs through [`PgStore`](crate::pool::PgStore), so each repository call
//! inherits replica failover and the single retry.

mod comment;
mod post;
mod vote;

pub use comment::PgCommentRepository;
pub use post::PgPostRepository;
pub use vote::PgVoteRepository;
