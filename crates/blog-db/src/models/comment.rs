//! Comment database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for comments table
#[derive(Debug, Clone, FromRow)]
pub struct CommentModel {
    pub id: Uuid,
    pub post_id: Uuid,
    pub user_id: Option<Uuid>,
    pub author: String,
    pub content: String,
    pub likes: i32,
    pub dislikes: i32,
    pub created_at: DateTime<Utc>,
}

/// Counter columns of a comment, locked for a vote cast
#[derive(Debug, Clone, FromRow)]
pub struct CommentCountersModel {
    pub post_id: Uuid,
    pub likes: i32,
    pub dislikes: i32,
}
