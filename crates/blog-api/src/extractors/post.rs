//! Post selection from the query string

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use blog_service::dto::PostQuery;

use crate::response::ApiError;

/// `?slug=S[&sort=...]` of the comment endpoints; a missing slug is rejected with 400
#[derive(Debug, Clone)]
pub struct PostParams {
    pub slug: String,
    pub sort: Option<String>,
}

#[async_trait]
impl<S> FromRequestParts<S> for PostParams
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<PostQuery>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::invalid_query(e.body_text()))?;

        let slug = query
            .slug
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ApiError::invalid_query("slug is required"))?;

        Ok(PostParams {
            slug,
            sort: query.sort.filter(|s| !s.is_empty()),
        })
    }
}
