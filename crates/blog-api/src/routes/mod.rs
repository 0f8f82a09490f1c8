//! Route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{comments, health, votes};
use crate::state::AppState;

/// Create the API router (excluding health for separate middleware handling)
pub fn create_router() -> Router<AppState> {
    Router::new().merge(comment_routes()).merge(vote_routes())
}

/// Health check routes (exported separately to bypass rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// Comment routes
fn comment_routes() -> Router<AppState> {
    Router::new().route(
        "/comments",
        get(comments::list_comments).post(comments::create_comment),
    )
}

/// Vote routes
fn vote_routes() -> Router<AppState> {
    Router::new()
        .route("/comments/vote", post(votes::cast_vote))
        .route("/comments/votes", post(votes::user_votes))
}
