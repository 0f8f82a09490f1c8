//! Vote database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for comment_votes table
#[derive(Debug, Clone, FromRow)]
pub struct VoteModel {
    pub comment_id: Uuid,
    pub user_id: Uuid,
    pub vote_type: String,
    pub created_at: DateTime<Utc>,
}
