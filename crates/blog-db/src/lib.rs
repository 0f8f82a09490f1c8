//! # blog-db
//!
//! Storage layer implementing the blog-core repository traits.
//!
//! ## Overview
//!
//! - [`pool`]: the connection resilience layer. One live link to a replica of the
//!   store, replaced on connectivity loss, with exactly one retry per operation
//! - Database models with SQLx `FromRow` derives, and entity mappers
//! - PostgreSQL repositories (CockroachDB compatible)
//! - [`MemoryStore`], an in-process implementation of the same traits
//!
//! ## Usage
//!
//! ```rust,ignore
//! use blog_db::{PgStore, PgCommentRepository};
//!
//! async fn example(config: &blog_common::DatabaseConfig) -> Result<(), blog_db::StoreError> {
//!     let store = PgStore::connect(config).await?;
//!     store.migrate().await?;
//!     let comments = PgCommentRepository::new(store.clone());
//!
//!     // Use the repository...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod memory;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use memory::MemoryStore;
pub use pool::{PgStore, PoolSettings, ReplicaStats, StoreError};
pub use repositories::{PgCommentRepository, PgPostRepository, PgVoteRepository};
