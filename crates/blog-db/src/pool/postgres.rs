//! PostgreSQL binding of the resilience layer

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use blog_common::DatabaseConfig;
use futures::future::BoxFuture;
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions};
use tracing::{info, warn};

use super::error::StoreError;
use super::replica::{Dialer, ReplicaSet, ReplicaStats};

/// Schema applied on startup; every statement is idempotent
const SCHEMA: &str = include_str!("../../migrations/0001_init.sql");

/// Per-replica pool tuning
#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Minimum number of connections to maintain
    pub min_connections: u32,
    /// Maximum time to wait for a connection
    pub acquire_timeout: Duration,
    /// Maximum idle time before a connection is closed
    pub idle_timeout: Duration,
    /// Maximum lifetime of a connection
    pub max_lifetime: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(300),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

impl From<&DatabaseConfig> for PoolSettings {
    fn from(config: &DatabaseConfig) -> Self {
        Self {
            max_connections: config.max_connections,
            min_connections: config.min_connections,
            acquire_timeout: config.acquire_timeout(),
            ..Default::default()
        }
    }
}

/// Opens one connection pool per replica
#[derive(Debug, Clone, Default)]
pub struct PgDialer {
    settings: PoolSettings,
}

impl PgDialer {
    pub fn new(settings: PoolSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl Dialer for PgDialer {
    type Link = PgPool;

    async fn dial(&self, address: &str) -> Result<PgPool, StoreError> {
        // Any failure to open the first connection means the replica is unusable
        PgPoolOptions::new()
            .max_connections(self.settings.max_connections)
            .min_connections(self.settings.min_connections)
            .acquire_timeout(self.settings.acquire_timeout)
            .idle_timeout(self.settings.idle_timeout)
            .max_lifetime(self.settings.max_lifetime)
            .connect(address)
            .await
            .map_err(|e| StoreError::Connectivity(e.to_string()))
    }
}

/// Store handle shared by the repositories
///
/// Every operation goes through [`PgStore::query`] or [`PgStore::transaction`] so it
/// gets the failover and single-retry behavior of the underlying [`ReplicaSet`].
#[derive(Clone)]
pub struct PgStore {
    replicas: Arc<ReplicaSet<PgDialer>>,
}

impl PgStore {
    /// Connect to the first reachable replica listed in the configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        Self::connect_with(PoolSettings::from(config), config.urls.clone()).await
    }

    pub async fn connect_with(
        settings: PoolSettings,
        candidates: Vec<String>,
    ) -> Result<Self, StoreError> {
        let replicas = ReplicaSet::connect(PgDialer::new(settings), candidates).await?;
        Ok(Self {
            replicas: Arc::new(replicas),
        })
    }

    /// Run a single statement (or an idempotent group of them) with failover
    pub async fn query<T, F, Fut>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnMut(PgPool) -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        self.replicas.run(op).await
    }

    /// Run `body` inside a transaction, failing over and retrying once on connectivity loss
    ///
    /// The transaction commits when `body` returns `Ok` and rolls back otherwise. A
    /// retry starts a fresh transaction on the new replica, so `body` sees a
    /// consistent state on each run. A link lost during the commit itself surfaces
    /// as [`StoreError::CommitUnknown`] and is not retried.
    pub async fn transaction<T, F>(&self, body: F) -> Result<T, StoreError>
    where
        F: for<'c> Fn(&'c mut PgConnection) -> BoxFuture<'c, Result<T, StoreError>> + Send + Sync,
        T: Send,
    {
        let body = &body;
        self.replicas
            .run(move |pool| async move {
                let mut tx = pool.begin().await?;
                match body(&mut *tx).await {
                    Ok(value) => {
                        tx.commit().await.map_err(StoreError::from_commit)?;
                        Ok(value)
                    }
                    Err(err) => {
                        if let Err(rollback_err) = tx.rollback().await {
                            warn!(error = %rollback_err, "transaction rollback failed");
                        }
                        Err(err)
                    }
                }
            })
            .await
    }

    /// Round-trip to the active replica
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.query(|pool| async move {
            sqlx::query("SELECT 1").execute(&pool).await?;
            Ok::<_, StoreError>(())
        })
        .await
    }

    /// Apply the schema to the active replica
    pub async fn migrate(&self) -> Result<(), StoreError> {
        self.query(|pool| async move {
            sqlx::raw_sql(SCHEMA).execute(&pool).await?;
            Ok::<_, StoreError>(())
        })
        .await?;

        info!(replica = %self.active_replica(), "schema up to date");
        Ok(())
    }

    /// Address of the replica in use, credentials removed
    pub fn active_replica(&self) -> String {
        self.replicas.active_address()
    }

    pub fn stats(&self) -> ReplicaStats {
        self.replicas.stats()
    }
}

impl std::fmt::Debug for PgStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgStore")
            .field("active_replica", &self.active_replica())
            .field("stats", &self.stats())
            .finish()
    }
}
