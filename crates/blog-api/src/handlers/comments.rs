//! Comment handlers
//!
//! Endpoints for adding and listing a post's comments.

use axum::{extract::State, Json};
use blog_service::dto::{CommentListResponse, CreateCommentRequest, CreatedCommentResponse};
use blog_service::CommentService;

use crate::extractors::{AuthUser, PostParams, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Add a comment to a post
///
/// POST /comments?slug={slug}
pub async fn create_comment(
    State(state): State<AppState>,
    post: PostParams,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateCommentRequest>,
) -> ApiResult<Created<CreatedCommentResponse>> {
    let service = CommentService::new(state.service_context());
    let comment = service
        .add_comment(&post.slug, &auth.identity(), request.content)
        .await?;
    Ok(Created(CreatedCommentResponse { comment }))
}

/// List a post's comments
///
/// GET /comments?slug={slug}&sort={newest|oldest|popular}
pub async fn list_comments(
    State(state): State<AppState>,
    post: PostParams,
) -> ApiResult<Json<CommentListResponse>> {
    let service = CommentService::new(state.service_context());
    let comments = service
        .list_comments(&post.slug, post.sort.as_deref())
        .await?;
    Ok(Json(comments))
}
