//! Repository traits (ports) - define the interface for data access
//!
//! These traits follow the Repository pattern from Domain-Driven Design.
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;

use crate::entities::{Comment, NewComment, Post, Vote, VoteTally, VoteType};
use crate::error::DomainError;
use crate::value_objects::{CommentId, PostId, SortPolicy, UserId};

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Post Repository
// ============================================================================

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Resolve a slug to its post
    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Post>>;
}

// ============================================================================
// Comment Repository
// ============================================================================

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Insert a comment with zeroed counters, returning the stored row
    async fn create(&self, comment: &NewComment) -> RepoResult<Comment>;

    /// Find comment by ID
    async fn find_by_id(&self, id: CommentId) -> RepoResult<Option<Comment>>;

    /// All comments of a post in the requested order
    async fn find_by_post(&self, post_id: PostId, sort: SortPolicy) -> RepoResult<Vec<Comment>>;
}

// ============================================================================
// Vote Repository
// ============================================================================

#[async_trait]
pub trait VoteRepository: Send + Sync {
    /// Run the reconciliation protocol for one (voter, comment) pair atomically
    ///
    /// Implementations must serialize concurrent casts on the same comment so the
    /// existing vote is never read stale, and must write the vote row and the
    /// comment counters in the same transaction.
    async fn cast(
        &self,
        voter_id: UserId,
        comment_id: CommentId,
        vote_type: VoteType,
    ) -> RepoResult<VoteTally>;

    /// Current vote of a voter on a comment
    async fn find(&self, voter_id: UserId, comment_id: CommentId) -> RepoResult<Option<VoteType>>;

    /// Votes of a voter on any of the given comments
    async fn find_many(&self, voter_id: UserId, comment_ids: &[CommentId]) -> RepoResult<Vec<Vote>>;

    /// Number of vote rows of a type referencing a comment
    ///
    /// Live aggregation for diagnostics and consistency checks against the
    /// cached counters. Read paths use the counters on the comment row instead.
    async fn count(&self, comment_id: CommentId, vote_type: VoteType) -> RepoResult<i64>;
}
