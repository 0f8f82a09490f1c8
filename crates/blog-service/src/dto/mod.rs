//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs and realtime payloads
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

pub use mappers::CommentWithPost;
pub use requests::{
    CastVoteRequest, CreateCommentRequest, PostQuery, UserVotesRequest, MAX_VOTE_LOOKUP,
};
pub use responses::{
    CommentListResponse, CommentResponse, CreatedCommentResponse, HealthChecks, HealthResponse,
    ReadinessResponse, UserVote, UserVotesResponse, VoteResponse, VoteUpdate, VotedComment,
};
