//! Handler error types

use blog_common::{AppError, ErrorResponse};
use blog_core::DomainError;
use blog_service::ServiceError;
use thiserror::Error;

use crate::protocol::{comment_error, events};

/// Handler error type
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Frame is not a known client event
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// Service error
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl HandlerError {
    /// Machine-readable code sent in `comment_error`
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidMessage(_) => events::INVALID_MESSAGE,
            Self::Service(e) => e.error_code(),
        }
    }

    /// Error event for the originating connection
    ///
    /// Server-side failures are reported without their details.
    pub fn into_event(self) -> blog_bus::BusEvent {
        let code = self.code();
        match self {
            Self::InvalidMessage(msg) => comment_error(&msg, code),
            Self::Service(e) => {
                let response = ErrorResponse::from(AppError::from(e));
                comment_error(&response.message, code)
            }
        }
    }
}

impl From<DomainError> for HandlerError {
    fn from(err: DomainError) -> Self {
        Self::Service(ServiceError::Domain(err))
    }
}

/// Handler result type
pub type HandlerResult<T> = Result<T, HandlerError>;
