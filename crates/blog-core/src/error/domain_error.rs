//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::CommentId;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Post not found: {0}")]
    PostNotFound(String),

    #[error("Comment not found: {0}")]
    CommentNotFound(CommentId),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Content must not be empty")]
    EmptyContent,

    #[error("Content too long: max {max} characters")]
    ContentTooLong { max: usize },

    #[error("Vote type must be \"like\" or \"dislike\", got {0:?}")]
    InvalidVoteType(String),

    #[error("Unknown sort policy: {0:?}")]
    InvalidSortPolicy(String),

    // =========================================================================
    // Authentication Errors
    // =========================================================================
    #[error("Authentication required")]
    Unauthenticated,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::PostNotFound(_) => "UNKNOWN_POST",
            Self::CommentNotFound(_) => "UNKNOWN_COMMENT",

            // Validation
            Self::ValidationError(_) | Self::EmptyContent => "VALIDATION_ERROR",
            Self::ContentTooLong { .. } => "CONTENT_TOO_LONG",
            Self::InvalidVoteType(_) => "INVALID_VOTE_TYPE",
            Self::InvalidSortPolicy(_) => "INVALID_SORT",

            // Authentication
            Self::Unauthenticated => "UNAUTHORIZED",

            // Conflict
            Self::ConstraintViolation(_) => "CONSTRAINT_VIOLATION",

            // Infrastructure
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PostNotFound(_) | Self::CommentNotFound(_))
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::EmptyContent
                | Self::ContentTooLong { .. }
                | Self::InvalidVoteType(_)
                | Self::InvalidSortPolicy(_)
        )
    }

    /// Check if this is an authentication error
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::ConstraintViolation(_))
    }

    /// Check if the store could not be reached even after failover
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = DomainError::PostNotFound("hello-world".to_string());
        assert_eq!(err.code(), "UNKNOWN_POST");

        let err = DomainError::ContentTooLong { max: 2000 };
        assert_eq!(err.code(), "CONTENT_TOO_LONG");

        assert_eq!(DomainError::Unauthenticated.code(), "UNAUTHORIZED");
    }

    #[test]
    fn test_is_not_found() {
        assert!(DomainError::PostNotFound("x".to_string()).is_not_found());
        assert!(DomainError::CommentNotFound(CommentId::generate()).is_not_found());
        assert!(!DomainError::EmptyContent.is_not_found());
    }

    #[test]
    fn test_is_validation() {
        assert!(DomainError::EmptyContent.is_validation());
        assert!(DomainError::InvalidVoteType("meh".to_string()).is_validation());
        assert!(!DomainError::Unauthenticated.is_validation());
        assert!(!DomainError::StoreUnavailable("down".to_string()).is_validation());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::PostNotFound("first-post".to_string());
        assert_eq!(err.to_string(), "Post not found: first-post");

        let err = DomainError::ContentTooLong { max: 2000 };
        assert_eq!(err.to_string(), "Content too long: max 2000 characters");

        let err = DomainError::InvalidVoteType("love".to_string());
        assert_eq!(
            err.to_string(),
            "Vote type must be \"like\" or \"dislike\", got \"love\""
        );
    }
}
