//! Axum extractors for request handling
//!
//! Custom extractors for identity, post selection, and validation.

mod auth;
mod post;
mod validated;

pub use auth::{AuthUser, CurrentIdentity};
pub use post::PostParams;
pub use validated::ValidatedJson;
