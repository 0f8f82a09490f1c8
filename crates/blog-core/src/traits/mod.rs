//! Repository traits (ports)

mod repositories;

pub use repositories::{CommentRepository, PostRepository, RepoResult, VoteRepository};
