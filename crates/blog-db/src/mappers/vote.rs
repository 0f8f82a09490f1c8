//! Vote entity <-> model mapper

use blog_core::entities::{Vote, VoteType};
use blog_core::error::DomainError;
use blog_core::value_objects::{CommentId, UserId};

use crate::models::VoteModel;

/// Convert VoteModel to Vote entity
///
/// The table constrains `vote_type`, so a parse failure means the row was written
/// outside this service.
impl TryFrom<VoteModel> for Vote {
    type Error = DomainError;

    fn try_from(model: VoteModel) -> Result<Self, Self::Error> {
        Ok(Vote {
            comment_id: CommentId::from_uuid(model.comment_id),
            voter_id: UserId::from_uuid(model.user_id),
            vote_type: model.vote_type.parse::<VoteType>()?,
            created_at: model.created_at,
        })
    }
}
