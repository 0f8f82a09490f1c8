//! Connection resilience layer
//!
//! [`ReplicaSet`] owns the link to one replica of the store and replaces it when
//! queries fail for connectivity reasons. [`PgStore`] binds it to PostgreSQL.

mod error;
mod postgres;
mod replica;

pub use error::{is_connectivity_error, StoreError};
pub use postgres::{PgDialer, PgStore, PoolSettings};
pub use replica::{Dialer, ReplicaSet, ReplicaStats, MAX_ATTEMPTS};

// Re-export for repositories and tests
pub use sqlx::postgres::{PgConnection, PgPool};
