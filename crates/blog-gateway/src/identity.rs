//! Caller identity for HTTP requests and realtime connections
//!
//! A token may arrive as `Authorization: Bearer <jwt>` or in the `auth_token`
//! cookie; the header wins when both are present. No token means an anonymous
//! caller, a bad token is an error.

use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use blog_common::{AppError, JwtService};
use blog_core::Identity;

/// Cookie holding the identity token
pub const AUTH_COOKIE: &str = "auth_token";

/// Extract the raw identity token from request headers
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
        let token = bearer.token().trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    CookieJar::from_headers(headers)
        .get(AUTH_COOKIE)
        .map(|cookie| cookie.value().trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Resolve an optional token to an identity
///
/// # Errors
/// Returns `InvalidToken` or `TokenExpired` when a token is present but not valid
pub fn resolve_identity(jwt: &JwtService, token: Option<&str>) -> Result<Identity, AppError> {
    match token {
        None => Ok(Identity::Anonymous),
        Some(token) => Ok(Identity::User(jwt.resolve(token)?)),
    }
}
