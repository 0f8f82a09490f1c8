//! PostgreSQL implementation of CommentRepository

use async_trait::async_trait;
use tracing::instrument;

use blog_core::entities::{Comment, NewComment};
use blog_core::traits::{CommentRepository, RepoResult};
use blog_core::value_objects::{CommentId, PostId, SortPolicy};

use crate::mappers::CommentInsert;
use crate::models::CommentModel;
use crate::pool::{PgStore, StoreError};

/// PostgreSQL implementation of CommentRepository
#[derive(Clone)]
pub struct PgCommentRepository {
    store: PgStore,
}

impl PgCommentRepository {
    /// Create a new PgCommentRepository
    pub fn new(store: PgStore) -> Self {
        Self { store }
    }
}

/// Listing statement for a sort policy; ties break on id so the order is total
fn list_query(sort: SortPolicy) -> &'static str {
    match sort {
        SortPolicy::Newest => {
            r#"
            SELECT id, post_id, user_id, author, content, likes, dislikes, created_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        }
        SortPolicy::Oldest => {
            r#"
            SELECT id, post_id, user_id, author, content, likes, dislikes, created_at
            FROM comments
            WHERE post_id = $1
            ORDER BY created_at ASC, id ASC
            "#
        }
        SortPolicy::Popular => {
            r#"
            SELECT id, post_id, user_id, author, content, likes, dislikes, created_at
            FROM comments
            WHERE post_id = $1
            ORDER BY likes DESC, created_at DESC, id DESC
            "#
        }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    #[instrument(skip(self, comment), fields(post_id = %comment.post_id))]
    async fn create(&self, comment: &NewComment) -> RepoResult<Comment> {
        let insert = CommentInsert::new(comment);
        // The id is fixed before the first attempt so a retry after a lost
        // acknowledgement finds the row instead of inserting a second one
        let id = CommentId::generate().as_uuid();

        let model = self
            .store
            .query(|pool| {
                let insert = &insert;
                async move {
                    sqlx::query(
                        r#"
                        INSERT INTO comments (id, post_id, user_id, author, content)
                        VALUES ($1, $2, $3, $4, $5)
                        ON CONFLICT (id) DO NOTHING
                        "#,
                    )
                    .bind(id)
                    .bind(insert.post_id)
                    .bind(insert.user_id)
                    .bind(insert.author)
                    .bind(insert.content)
                    .execute(&pool)
                    .await?;

                    let model = sqlx::query_as::<_, CommentModel>(
                        r#"
                        SELECT id, post_id, user_id, author, content, likes, dislikes, created_at
                        FROM comments
                        WHERE id = $1
                        "#,
                    )
                    .bind(id)
                    .fetch_one(&pool)
                    .await?;

                    Ok::<_, StoreError>(model)
                }
            })
            .await?;

        Ok(Comment::from(model))
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: CommentId) -> RepoResult<Option<Comment>> {
        let result = self
            .store
            .query(|pool| async move {
                sqlx::query_as::<_, CommentModel>(
                    r#"
                    SELECT id, post_id, user_id, author, content, likes, dislikes, created_at
                    FROM comments
                    WHERE id = $1
                    "#,
                )
                .bind(id.as_uuid())
                .fetch_optional(&pool)
                .await
                .map_err(StoreError::from)
            })
            .await?;

        Ok(result.map(Comment::from))
    }

    #[instrument(skip(self))]
    async fn find_by_post(&self, post_id: PostId, sort: SortPolicy) -> RepoResult<Vec<Comment>> {
        let results = self
            .store
            .query(|pool| async move {
                sqlx::query_as::<_, CommentModel>(list_query(sort))
                    .bind(post_id.as_uuid())
                    .fetch_all(&pool)
                    .await
                    .map_err(StoreError::from)
            })
            .await?;

        Ok(results.into_iter().map(Comment::from).collect())
    }
}
