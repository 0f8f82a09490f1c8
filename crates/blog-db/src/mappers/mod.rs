//! Entity to model mappers
//!
//! Conversions from database rows to domain entities (blog-core), plus the
//! `*Insert` structs that prepare entity data for statements.

mod comment;
mod post;
mod vote;

pub use comment::CommentInsert;
