//! PostgreSQL implementation of VoteRepository

use async_trait::async_trait;
use futures::FutureExt;
use tracing::{debug, instrument};
use uuid::Uuid;

use blog_core::entities::{Vote, VoteCounters, VoteOperation, VoteTally, VoteTransition, VoteType};
use blog_core::error::DomainError;
use blog_core::traits::{RepoResult, VoteRepository};
use blog_core::value_objects::{CommentId, UserId};

use crate::models::{CommentCountersModel, VoteModel};
use crate::pool::{PgStore, StoreError};

/// PostgreSQL implementation of VoteRepository
#[derive(Clone)]
pub struct PgVoteRepository {
    store: PgStore,
}

impl PgVoteRepository {
    /// Create a new PgVoteRepository
    pub fn new(store: PgStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl VoteRepository for PgVoteRepository {
    #[instrument(skip(self))]
    async fn cast(
        &self,
        voter_id: UserId,
        comment_id: CommentId,
        vote_type: VoteType,
    ) -> RepoResult<VoteTally> {
        let comment = comment_id.as_uuid();
        let voter = voter_id.as_uuid();

        let tally = self
            .store
            .transaction(move |conn| {
                async move {
                    // Row lock on the comment serializes casts on it until commit
                    let locked = sqlx::query_as::<_, CommentCountersModel>(
                        r#"
                        SELECT post_id, likes, dislikes
                        FROM comments
                        WHERE id = $1
                        FOR UPDATE
                        "#,
                    )
                    .bind(comment)
                    .fetch_optional(&mut *conn)
                    .await?
                    .ok_or(DomainError::CommentNotFound(comment_id))?;

                    let post_slug = sqlx::query_scalar::<_, String>(
                        "SELECT slug FROM posts WHERE id = $1",
                    )
                    .bind(locked.post_id)
                    .fetch_one(&mut *conn)
                    .await?;

                    let existing = sqlx::query_scalar::<_, String>(
                        r#"
                        SELECT vote_type
                        FROM comment_votes
                        WHERE comment_id = $1 AND user_id = $2
                        "#,
                    )
                    .bind(comment)
                    .bind(voter)
                    .fetch_optional(&mut *conn)
                    .await?
                    .map(|raw| raw.parse::<VoteType>())
                    .transpose()?;

                    let plan = VoteTransition::plan(existing, vote_type);

                    match plan.operation {
                        VoteOperation::Added => {
                            sqlx::query(
                                r#"
                                INSERT INTO comment_votes (comment_id, user_id, vote_type)
                                VALUES ($1, $2, $3)
                                "#,
                            )
                            .bind(comment)
                            .bind(voter)
                            .bind(vote_type.as_str())
                            .execute(&mut *conn)
                            .await?;
                        }
                        VoteOperation::Removed => {
                            sqlx::query(
                                "DELETE FROM comment_votes WHERE comment_id = $1 AND user_id = $2",
                            )
                            .bind(comment)
                            .bind(voter)
                            .execute(&mut *conn)
                            .await?;
                        }
                        VoteOperation::Switched => {
                            sqlx::query(
                                r#"
                                UPDATE comment_votes
                                SET vote_type = $3, created_at = now()
                                WHERE comment_id = $1 AND user_id = $2
                                "#,
                            )
                            .bind(comment)
                            .bind(voter)
                            .bind(vote_type.as_str())
                            .execute(&mut *conn)
                            .await?;
                        }
                    }

                    let counters = plan.apply(VoteCounters::new(locked.likes, locked.dislikes));
                    sqlx::query("UPDATE comments SET likes = $2, dislikes = $3 WHERE id = $1")
                        .bind(comment)
                        .bind(counters.likes)
                        .bind(counters.dislikes)
                        .execute(&mut *conn)
                        .await?;

                    Ok::<_, StoreError>(VoteTally {
                        comment_id,
                        post_id: locked.post_id.into(),
                        post_slug,
                        operation: plan.operation,
                        counters,
                    })
                }
                .boxed()
            })
            .await?;

        debug!(
            operation = %tally.operation,
            likes = tally.counters.likes,
            dislikes = tally.counters.dislikes,
            "vote reconciled"
        );
        Ok(tally)
    }

    #[instrument(skip(self))]
    async fn find(&self, voter_id: UserId, comment_id: CommentId) -> RepoResult<Option<VoteType>> {
        let raw = self
            .store
            .query(|pool| async move {
                sqlx::query_scalar::<_, String>(
                    r#"
                    SELECT vote_type
                    FROM comment_votes
                    WHERE comment_id = $1 AND user_id = $2
                    "#,
                )
                .bind(comment_id.as_uuid())
                .bind(voter_id.as_uuid())
                .fetch_optional(&pool)
                .await
                .map_err(StoreError::from)
            })
            .await?;

        raw.map(|raw| raw.parse::<VoteType>()).transpose()
    }

    #[instrument(skip(self, comment_ids), fields(count = comment_ids.len()))]
    async fn find_many(&self, voter_id: UserId, comment_ids: &[CommentId]) -> RepoResult<Vec<Vote>> {
        if comment_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = comment_ids.iter().map(CommentId::as_uuid).collect();

        let results = self
            .store
            .query(|pool| {
                let ids = &ids;
                async move {
                    sqlx::query_as::<_, VoteModel>(
                        r#"
                        SELECT comment_id, user_id, vote_type, created_at
                        FROM comment_votes
                        WHERE user_id = $1 AND comment_id = ANY($2)
                        "#,
                    )
                    .bind(voter_id.as_uuid())
                    .bind(ids)
                    .fetch_all(&pool)
                    .await
                    .map_err(StoreError::from)
                }
            })
            .await?;

        results.into_iter().map(Vote::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn count(&self, comment_id: CommentId, vote_type: VoteType) -> RepoResult<i64> {
        let count = self
            .store
            .query(|pool| async move {
                sqlx::query_scalar::<_, i64>(
                    r#"
                    SELECT COUNT(*)
                    FROM comment_votes
                    WHERE comment_id = $1 AND vote_type = $2
                    "#,
                )
                .bind(comment_id.as_uuid())
                .bind(vote_type.as_str())
                .fetch_one(&pool)
                .await
                .map_err(StoreError::from)
            })
            .await?;

        Ok(count)
    }
}
