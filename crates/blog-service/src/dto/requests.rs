//! Request DTOs for API endpoints
//!
//! Bodies implement `Deserialize` and `Validate`; query strings only `Deserialize`.

use blog_core::CommentId;
use serde::Deserialize;
use validator::Validate;

/// Most comment ids accepted by one vote lookup
pub const MAX_VOTE_LOOKUP: usize = 100;

// ============================================================================
// Comment Requests
// ============================================================================

/// `?slug=` of the comment endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostQuery {
    pub slug: Option<String>,
    pub sort: Option<String>,
}

/// New comment over HTTP
///
/// Length limits are checked by the domain so the error carries its own code.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCommentRequest {
    pub content: String,
}

// ============================================================================
// Vote Requests
// ============================================================================

/// Like or dislike a comment
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteRequest {
    pub comment_id: CommentId,
    /// Parsed by the service so any other value reports `INVALID_VOTE_TYPE`
    pub vote_type: String,
}

/// The caller's votes on a batch of comments
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserVotesRequest {
    #[validate(length(min = 1, max = 100, message = "Between 1 and 100 comment ids are required"))]
    pub comment_ids: Vec<CommentId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_vote_request_camel_case() {
        let id = CommentId::generate();
        let json = format!(r#"{{"commentId":"{id}","voteType":"like"}}"#);
        let request: CastVoteRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(request.comment_id, id);
        assert_eq!(request.vote_type, "like");
    }

    #[test]
    fn test_user_votes_request_bounds() {
        let empty = UserVotesRequest {
            comment_ids: vec![],
        };
        assert!(empty.validate().is_err());

        let full = UserVotesRequest {
            comment_ids: (0..MAX_VOTE_LOOKUP).map(|_| CommentId::generate()).collect(),
        };
        assert!(full.validate().is_ok());

        let over = UserVotesRequest {
            comment_ids: (0..=MAX_VOTE_LOOKUP).map(|_| CommentId::generate()).collect(),
        };
        assert!(over.validate().is_err());
    }

    #[test]
    fn test_invalid_comment_id_rejected() {
        let result: Result<CastVoteRequest, _> =
            serde_json::from_str(r#"{"commentId":"nope","voteType":"like"}"#);
        assert!(result.is_err());
    }
}
