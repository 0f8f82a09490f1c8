//! PostgreSQL implementation of PostRepository

use async_trait::async_trait;
use tracing::instrument;

use blog_core::entities::Post;
use blog_core::traits::{PostRepository, RepoResult};

use crate::models::PostModel;
use crate::pool::{PgStore, StoreError};

/// PostgreSQL implementation of PostRepository
#[derive(Clone)]
pub struct PgPostRepository {
    store: PgStore,
}

impl PgPostRepository {
    /// Create a new PgPostRepository
    pub fn new(store: PgStore) -> Self {
        Self { store }
    }

    /// Insert a post, or return the stored one if the slug already exists
    ///
    /// Posts are authored by content tooling; this is used for seeding.
    #[instrument(skip(self, post), fields(slug = %post.slug))]
    pub async fn upsert(&self, post: &Post) -> RepoResult<Post> {
        let model = self
            .store
            .query(|pool| async move {
                sqlx::query_as::<_, PostModel>(
                    r#"
                    INSERT INTO posts (id, slug, title, content, created_at)
                    VALUES ($1, $2, $3, $4, $5)
                    ON CONFLICT (slug) DO UPDATE SET slug = excluded.slug
                    RETURNING id, slug, title, content, created_at
                    "#,
                )
                .bind(post.id.as_uuid())
                .bind(&post.slug)
                .bind(&post.title)
                .bind(&post.body)
                .bind(post.created_at)
                .fetch_one(&pool)
                .await
                .map_err(StoreError::from)
            })
            .await?;

        Ok(Post::from(model))
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    #[instrument(skip(self))]
    async fn find_by_slug(&self, slug: &str) -> RepoResult<Option<Post>> {
        let result = self
            .store
            .query(|pool| async move {
                sqlx::query_as::<_, PostModel>(
                    r#"
                    SELECT id, slug, title, content, created_at
                    FROM posts
                    WHERE slug = $1
                    "#,
                )
                .bind(slug)
                .fetch_optional(&pool)
                .await
                .map_err(StoreError::from)
            })
            .await?;

        Ok(result.map(Post::from))
    }
}
