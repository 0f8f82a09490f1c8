//! # blog-core
//!
//! Domain layer containing entities, value objects, repository traits, and domain events.
//! This crate has zero dependencies on infrastructure (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    validate_content, Comment, CommentAuthor, NewComment, Post, Vote, VoteCounters,
    VoteOperation, VoteTally, VoteTransition, VoteType, ANONYMOUS_AUTHOR, MAX_AUTHOR_NAME_LENGTH,
    MAX_COMMENT_LENGTH,
};
pub use error::DomainError;
pub use events::DomainEvent;
pub use traits::{CommentRepository, PostRepository, RepoResult, VoteRepository};
pub use value_objects::{
    CommentId, Identity, PostId, RoomId, SortPolicy, UserId, UserIdentity,
};
