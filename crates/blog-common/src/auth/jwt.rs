//! Identity tokens
//!
//! Tokens are HS256 JWTs minted by the account service that shares `JWT_SECRET`
//! with this backend. Here they are only validated and turned into a [`UserIdentity`].

use blog_core::{UserId, UserIdentity};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Get the user ID
    ///
    /// # Errors
    /// Returns an error if the subject is not a UUID
    pub fn user_id(&self) -> Result<UserId, AppError> {
        self.sub.parse().map_err(|_| AppError::InvalidToken)
    }

    /// Canonical identity carried by these claims
    ///
    /// # Errors
    /// Returns an error if the subject is not a UUID
    pub fn identity(&self) -> Result<UserIdentity, AppError> {
        let mut identity = UserIdentity::new(self.user_id()?, self.username.clone());
        identity.display_name = self.display_name.clone();
        Ok(identity)
    }
}

/// JWT service for validating (and, for tooling, minting) identity tokens
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry: i64,
}

impl JwtService {
    /// Create a new JWT service with the given secret and token lifetime in seconds
    #[must_use]
    pub fn new(secret: &str, token_expiry: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_expiry,
        }
    }

    /// Mint a token for a user
    ///
    /// # Errors
    /// Returns an error if token encoding fails
    pub fn issue(&self, user: &UserIdentity) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            display_name: user.display_name.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.token_expiry)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(anyhow::anyhow!("failed to encode JWT: {e}")))
    }

    /// Decode and validate a JWT token
    ///
    /// # Errors
    /// Returns an error if the token is invalid or expired
    pub fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::default();

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            }
        })?;

        Ok(token_data.claims)
    }

    /// Validate a token and resolve the user it identifies
    ///
    /// # Errors
    /// Returns an error if the token is invalid, expired, or carries a malformed subject
    pub fn resolve(&self, token: &str) -> Result<UserIdentity, AppError> {
        self.decode_token(token)?.identity()
    }
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("token_expiry", &self.token_expiry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> JwtService {
        JwtService::new("test-secret-key-that-is-long-enough", 900)
    }

    #[test]
    fn test_issue_and_resolve() {
        let service = create_test_service();
        let user = UserIdentity::new(UserId::generate(), "ada").with_display_name("Ada");

        let token = service.issue(&user).unwrap();
        let resolved = service.resolve(&token).unwrap();

        assert_eq!(resolved, user);
    }

    #[test]
    fn test_display_name_optional() {
        let service = create_test_service();
        let user = UserIdentity::new(UserId::generate(), "bob");

        let token = service.issue(&user).unwrap();
        let claims = service.decode_token(&token).unwrap();

        assert_eq!(claims.username, "bob");
        assert!(claims.display_name.is_none());
    }

    #[test]
    fn test_invalid_token() {
        let service = create_test_service();

        let result = service.decode_token("invalid.token.here");
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let user = UserIdentity::new(UserId::generate(), "carol");
        let token = JwtService::new("another-secret-entirely", 900)
            .issue(&user)
            .unwrap();

        let result = create_test_service().resolve(&token);
        assert!(matches!(result, Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_expired_token() {
        // Expired well beyond the default 60s leeway
        let service = JwtService::new("test-secret-key-that-is-long-enough", -3600);
        let user = UserIdentity::new(UserId::generate(), "dave");
        let token = service.issue(&user).unwrap();

        let result = service.resolve(&token);
        assert!(matches!(result, Err(AppError::TokenExpired)));
    }

    #[test]
    fn test_claims_with_malformed_subject() {
        let claims = Claims {
            sub: "12345".to_string(),
            username: "erin".to_string(),
            display_name: None,
            iat: 0,
            exp: i64::MAX,
        };

        assert!(matches!(claims.identity(), Err(AppError::InvalidToken)));
    }
}
