//! Response DTOs for API endpoints and realtime events
//!
//! Field names are camelCase on the wire.

use blog_core::{CommentId, PostId, UserId, VoteOperation, VoteType};
use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Comment Responses
// ============================================================================

/// Comment as returned by the API and carried by `comment_added`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: CommentId,
    pub post_id: PostId,
    pub post_slug: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub content: String,
    pub likes: i32,
    pub dislikes: i32,
    pub created_at: DateTime<Utc>,
}

/// `POST /comments` body
#[derive(Debug, Clone, Serialize)]
pub struct CreatedCommentResponse {
    pub comment: CommentResponse,
}

/// `GET /comments` body
#[derive(Debug, Clone, Serialize)]
pub struct CommentListResponse {
    pub comments: Vec<CommentResponse>,
    pub count: usize,
}

impl CommentListResponse {
    pub fn new(comments: Vec<CommentResponse>) -> Self {
        Self {
            count: comments.len(),
            comments,
        }
    }
}

// ============================================================================
// Vote Responses
// ============================================================================

/// `POST /comments/vote` body
#[derive(Debug, Clone, Serialize)]
pub struct VoteResponse {
    pub success: bool,
    pub operation: VoteOperation,
    pub comment: VotedComment,
}

/// Counters after a vote, with the caller's vote as re-read from the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VotedComment {
    pub id: CommentId,
    pub likes: i32,
    pub dislikes: i32,
    pub user_vote: Option<VoteType>,
}

/// Payload of `comment_vote_updated`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteUpdate {
    pub comment_id: CommentId,
    pub likes: i32,
    pub dislikes: i32,
}

/// `POST /comments/votes` body
#[derive(Debug, Clone, Serialize)]
pub struct UserVotesResponse {
    pub votes: Vec<UserVote>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserVote {
    pub comment_id: CommentId,
    pub vote_type: VoteType,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Liveness response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub service: String,
    pub node_id: String,
}

impl HealthResponse {
    pub fn ok(service: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self {
            status: "OK".to_string(),
            timestamp: Utc::now(),
            service: service.into(),
            node_id: node_id.into(),
        }
    }
}

/// Readiness response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Result of each dependency check
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: bool,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool) -> Self {
        Self {
            status: if database_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: database_healthy,
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.checks.database
    }
}
