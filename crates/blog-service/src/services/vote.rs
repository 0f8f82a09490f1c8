//! Vote service
//!
//! Casts likes and dislikes through the reconciliation protocol and reports the
//! caller's votes.

use blog_core::{DomainEvent, Identity, VoteType};
use tracing::{info, instrument};

use crate::dto::{
    CastVoteRequest, UserVote, UserVotesRequest, UserVotesResponse, VoteResponse, VotedComment,
    MAX_VOTE_LOOKUP,
};

use super::broadcast;
use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Vote service
pub struct VoteService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> VoteService<'a> {
    /// Create a new VoteService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Cast a vote and broadcast the new counters to the comment's post
    #[instrument(skip(self, identity))]
    pub async fn cast_vote(
        &self,
        identity: &Identity,
        request: CastVoteRequest,
    ) -> ServiceResult<VoteResponse> {
        let voter = identity.require_user()?;
        let vote_type: VoteType = request.vote_type.parse()?;

        let tally = self
            .ctx
            .vote_repo()
            .cast(voter.id, request.comment_id, vote_type)
            .await?;

        // Report what the store holds now, not what the request implied
        let user_vote = self
            .ctx
            .vote_repo()
            .find(voter.id, request.comment_id)
            .await?;

        info!(
            comment_id = %tally.comment_id,
            voter_id = %voter.id,
            operation = %tally.operation,
            likes = tally.counters.likes,
            dislikes = tally.counters.dislikes,
            "Vote cast"
        );

        let response = VoteResponse {
            success: true,
            operation: tally.operation,
            comment: VotedComment {
                id: tally.comment_id,
                likes: tally.counters.likes,
                dislikes: tally.counters.dislikes,
                user_vote,
            },
        };

        broadcast::publish(self.ctx, &DomainEvent::CommentVoteUpdated(tally)).await;

        Ok(response)
    }

    /// The caller's current votes on the given comments
    #[instrument(skip(self, identity, request), fields(count = request.comment_ids.len()))]
    pub async fn user_votes(
        &self,
        identity: &Identity,
        request: UserVotesRequest,
    ) -> ServiceResult<UserVotesResponse> {
        let voter = identity.require_user()?;

        if request.comment_ids.is_empty() || request.comment_ids.len() > MAX_VOTE_LOOKUP {
            return Err(ServiceError::validation(format!(
                "Between 1 and {MAX_VOTE_LOOKUP} comment ids are required"
            )));
        }

        let votes = self
            .ctx
            .vote_repo()
            .find_many(voter.id, &request.comment_ids)
            .await?
            .into_iter()
            .map(UserVote::from)
            .collect();

        Ok(UserVotesResponse { votes })
    }
}
