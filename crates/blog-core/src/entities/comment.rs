//! Comment entity - a reader's reply attached to one post

use chrono::{DateTime, Utc};

use crate::entities::VoteCounters;
use crate::error::DomainError;
use crate::value_objects::{CommentId, PostId, UserId};

/// Maximum comment length, counted in Unicode scalar values
pub const MAX_COMMENT_LENGTH: usize = 2000;

/// Maximum length of a free-text author name
pub const MAX_AUTHOR_NAME_LENGTH: usize = 100;

/// Author name stored when nobody identified themselves
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// Who wrote a comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentAuthor {
    /// Set when the author was authenticated
    pub user_id: Option<UserId>,
    pub name: String,
}

impl CommentAuthor {
    /// Author without a user reference
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            user_id: None,
            name: name.into(),
        }
    }
}

/// Comment entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: CommentId,
    pub post_id: PostId,
    pub author: CommentAuthor,
    pub content: String,
    pub likes: i32,
    pub dislikes: i32,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    #[inline]
    pub fn counters(&self) -> VoteCounters {
        VoteCounters::new(self.likes, self.dislikes)
    }
}

/// A validated comment that has not been persisted yet
///
/// The store assigns id, timestamp and zeroed counters on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub post_id: PostId,
    pub author: CommentAuthor,
    pub content: String,
}

impl NewComment {
    pub fn new(post_id: PostId, author: CommentAuthor, content: String) -> Result<Self, DomainError> {
        validate_content(&content)?;
        if author.name.chars().count() > MAX_AUTHOR_NAME_LENGTH {
            return Err(DomainError::ValidationError(format!(
                "author name must be at most {MAX_AUTHOR_NAME_LENGTH} characters"
            )));
        }

        Ok(Self {
            post_id,
            author,
            content,
        })
    }
}

/// Check comment content against the emptiness and length rules
pub fn validate_content(content: &str) -> Result<(), DomainError> {
    if content.trim().is_empty() {
        return Err(DomainError::EmptyContent);
    }
    // The store's text columns cannot hold U+0000
    if content.contains('\0') {
        return Err(DomainError::ValidationError(
            "content must not contain NUL characters".to_string(),
        ));
    }
    if content.chars().count() > MAX_COMMENT_LENGTH {
        return Err(DomainError::ContentTooLong {
            max: MAX_COMMENT_LENGTH,
        });
    }
    Ok(())
}
