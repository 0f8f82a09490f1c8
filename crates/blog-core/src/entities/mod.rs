//! Domain entities - core business objects

mod comment;
mod post;
mod vote;

pub use comment::{
    validate_content, Comment, CommentAuthor, NewComment, ANONYMOUS_AUTHOR,
    MAX_AUTHOR_NAME_LENGTH, MAX_COMMENT_LENGTH,
};
pub use post::Post;
pub use vote::{Vote, VoteCounters, VoteOperation, VoteTally, VoteTransition, VoteType};
