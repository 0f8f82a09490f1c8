//! Caller identity
//!
//! Resolved once at the request or connection boundary and passed down unchanged,
//! so services never inspect tokens or raw user objects themselves.

use crate::entities::{CommentAuthor, ANONYMOUS_AUTHOR};
use crate::error::DomainError;
use crate::value_objects::UserId;

/// An authenticated user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserIdentity {
    pub id: UserId,
    pub username: String,
    pub display_name: Option<String>,
}

impl UserIdentity {
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            display_name: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Name shown next to content, falling back to the username
    pub fn display_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

/// Who is making a request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Identity {
    /// Authenticated by a valid identity token
    User(UserIdentity),
    /// Unauthenticated caller that supplied a free-text name
    Guest { name: String },
    #[default]
    Anonymous,
}

impl Identity {
    /// Build a guest identity, collapsing blank names to anonymous
    pub fn guest(name: impl Into<String>) -> Self {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            Self::Anonymous
        } else {
            Self::Guest {
                name: trimmed.to_string(),
            }
        }
    }

    #[inline]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::User(_))
    }

    pub fn user(&self) -> Option<&UserIdentity> {
        match self {
            Self::User(user) => Some(user),
            _ => None,
        }
    }

    /// Require an authenticated user
    pub fn require_user(&self) -> Result<&UserIdentity, DomainError> {
        self.user().ok_or(DomainError::Unauthenticated)
    }

    /// Author attribution for a comment written by this identity
    pub fn author(&self) -> CommentAuthor {
        match self {
            Self::User(user) => CommentAuthor {
                user_id: Some(user.id),
                name: user.display_name().to_string(),
            },
            Self::Guest { name } => CommentAuthor {
                user_id: None,
                name: name.clone(),
            },
            Self::Anonymous => CommentAuthor {
                user_id: None,
                name: ANONYMOUS_AUTHOR.to_string(),
            },
        }
    }
}

impl From<UserIdentity> for Identity {
    fn from(user: UserIdentity) -> Self {
        Self::User(user)
    }
}
