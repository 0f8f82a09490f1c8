//! Post entity - an article comments attach to

use chrono::{DateTime, Utc};

use crate::value_objects::PostId;

/// Post entity
///
/// Posts are written by content tooling outside this workspace and are read-only here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: PostId,
    pub slug: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Post {
    /// Create a new Post
    pub fn new(slug: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: PostId::generate(),
            slug: slug.into(),
            title: title.into(),
            body: body.into(),
            created_at: Utc::now(),
        }
    }
}
