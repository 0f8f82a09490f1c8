//! Entity to DTO mappers

use blog_core::entities::{Comment, Vote, VoteTally};

use super::responses::{CommentResponse, UserVote, VoteUpdate};

/// A comment together with the slug of its post
#[derive(Debug, Clone, Copy)]
pub struct CommentWithPost<'a> {
    pub comment: &'a Comment,
    pub post_slug: &'a str,
}

impl From<CommentWithPost<'_>> for CommentResponse {
    fn from(data: CommentWithPost<'_>) -> Self {
        let comment = data.comment;
        Self {
            id: comment.id,
            post_id: comment.post_id,
            post_slug: data.post_slug.to_string(),
            author: comment.author.name.clone(),
            user_id: comment.author.user_id,
            content: comment.content.clone(),
            likes: comment.likes,
            dislikes: comment.dislikes,
            created_at: comment.created_at,
        }
    }
}

impl From<&VoteTally> for VoteUpdate {
    fn from(tally: &VoteTally) -> Self {
        Self {
            comment_id: tally.comment_id,
            likes: tally.counters.likes,
            dislikes: tally.counters.dislikes,
        }
    }
}

impl From<Vote> for UserVote {
    fn from(vote: Vote) -> Self {
        Self {
            comment_id: vote.comment_id,
            vote_type: vote.vote_type,
        }
    }
}
