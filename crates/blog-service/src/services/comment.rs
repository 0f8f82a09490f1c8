//! Comment service
//!
//! Adds comments to posts and lists them in a requested order.

use blog_core::entities::{validate_content, NewComment, Post};
use blog_core::{DomainError, DomainEvent, Identity, RoomId, SortPolicy};
use tracing::{info, instrument};

use crate::dto::{CommentListResponse, CommentResponse, CommentWithPost};

use super::broadcast;
use super::context::ServiceContext;
use super::error::ServiceResult;

/// Comment service
pub struct CommentService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> CommentService<'a> {
    /// Create a new CommentService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Persist a comment and broadcast it to the post's room
    ///
    /// The returned comment and the broadcast one are both built from the stored
    /// row, so every subscriber sees the server-assigned id and timestamp.
    #[instrument(skip(self, identity, content))]
    pub async fn add_comment(
        &self,
        post_slug: &str,
        identity: &Identity,
        content: String,
    ) -> ServiceResult<CommentResponse> {
        validate_content(&content)?;
        let post = self.resolve_post(post_slug).await?;

        let new_comment = NewComment::new(post.id, identity.author(), content)?;
        let comment = self.ctx.comment_repo().create(&new_comment).await?;

        info!(
            comment_id = %comment.id,
            post_slug = %post.slug,
            authenticated = identity.is_authenticated(),
            "Comment created"
        );

        let response = CommentResponse::from(CommentWithPost {
            comment: &comment,
            post_slug: &post.slug,
        });

        broadcast::publish(
            self.ctx,
            &DomainEvent::CommentAdded {
                post_slug: post.slug,
                comment,
            },
        )
        .await;

        Ok(response)
    }

    /// All comments of a post; `sort` defaults to newest first
    #[instrument(skip(self))]
    pub async fn list_comments(
        &self,
        post_slug: &str,
        sort: Option<&str>,
    ) -> ServiceResult<CommentListResponse> {
        let sort = sort.map_or(Ok(SortPolicy::default()), str::parse::<SortPolicy>)?;
        let post = self.resolve_post(post_slug).await?;

        let comments = self
            .ctx
            .comment_repo()
            .find_by_post(post.id, sort)
            .await?
            .iter()
            .map(|comment| {
                CommentResponse::from(CommentWithPost {
                    comment,
                    post_slug: &post.slug,
                })
            })
            .collect();

        Ok(CommentListResponse::new(comments))
    }

    async fn resolve_post(&self, post_slug: &str) -> ServiceResult<Post> {
        let room = RoomId::for_post(post_slug)?;
        let post = self
            .ctx
            .post_repo()
            .find_by_slug(room.slug())
            .await?
            .ok_or_else(|| DomainError::PostNotFound(room.slug().to_string()))?;
        Ok(post)
    }
}
