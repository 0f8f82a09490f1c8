//! Identity extractors
//!
//! Resolve the caller from a Bearer token or the `auth_token` cookie.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use blog_core::{DomainError, Identity, UserIdentity};
use blog_gateway::{resolve_identity, token_from_headers};

use crate::response::ApiError;
use crate::state::AppState;

/// Caller identity, anonymous when no token is sent
///
/// A token that is present but invalid or expired is rejected with 401.
#[derive(Debug, Clone)]
pub struct CurrentIdentity(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentIdentity
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let token = token_from_headers(&parts.headers);

        let identity = resolve_identity(app_state.jwt_service(), token.as_deref()).map_err(|e| {
            tracing::warn!(error = %e, "Invalid identity token");
            ApiError::from(e)
        })?;

        Ok(CurrentIdentity(identity))
    }
}

/// Authenticated user; rejects anonymous callers with 401
#[derive(Debug, Clone)]
pub struct AuthUser(pub UserIdentity);

impl AuthUser {
    /// The identity to hand to services
    pub fn identity(&self) -> Identity {
        Identity::User(self.0.clone())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let CurrentIdentity(identity) = CurrentIdentity::from_request_parts(parts, state).await?;

        match identity {
            Identity::User(user) => Ok(AuthUser(user)),
            _ => Err(ApiError::from(DomainError::Unauthenticated)),
        }
    }
}
