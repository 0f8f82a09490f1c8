//! HTTP request handlers

pub mod comments;
pub mod health;
pub mod votes;
