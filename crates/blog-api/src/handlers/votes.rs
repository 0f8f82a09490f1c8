//! Vote handlers
//!
//! Endpoints for liking and disliking comments.

use axum::{extract::State, Json};
use blog_service::dto::{CastVoteRequest, UserVotesRequest, UserVotesResponse, VoteResponse};
use blog_service::VoteService;

use crate::extractors::{AuthUser, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Cast, withdraw or switch a vote
///
/// POST /comments/vote
pub async fn cast_vote(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CastVoteRequest>,
) -> ApiResult<Json<VoteResponse>> {
    let service = VoteService::new(state.service_context());
    let response = service.cast_vote(&auth.identity(), request).await?;
    Ok(Json(response))
}

/// The caller's votes on a batch of comments
///
/// POST /comments/votes
pub async fn user_votes(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<UserVotesRequest>,
) -> ApiResult<Json<UserVotesResponse>> {
    let service = VoteService::new(state.service_context());
    let response = service.user_votes(&auth.identity(), request).await?;
    Ok(Json(response))
}
