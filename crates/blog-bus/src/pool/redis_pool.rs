//! Redis connection pool using deadpool-redis.
//!
//! Backs the publishing side of the Redis fan-out transport.

use deadpool_redis::{Config, Pool, Runtime};

use crate::error::{FanOutError, FanOutResult};

/// Redis pool configuration
#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    /// Redis connection URL (e.g., `redis://localhost:6379`)
    pub url: String,
    /// Maximum number of connections in the pool
    pub max_connections: usize,
}

impl Default for RedisPoolConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            max_connections: 10,
        }
    }
}

impl From<&blog_common::RedisConfig> for RedisPoolConfig {
    fn from(config: &blog_common::RedisConfig) -> Self {
        Self {
            url: config.url.clone(),
            max_connections: config.max_connections as usize,
        }
    }
}

/// Managed Redis connection pool
#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
}

impl std::fmt::Debug for RedisPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisPool")
            .field("status", &self.pool.status())
            .finish()
    }
}

impl RedisPool {
    /// Create a new Redis pool with the given configuration
    ///
    /// No connection is opened until first use.
    pub fn new(config: &RedisPoolConfig) -> FanOutResult<Self> {
        let pool = Config::from_url(&config.url)
            .builder()
            .map_err(|e| FanOutError::CreatePool(e.to_string()))?
            .max_size(config.max_connections)
            .runtime(Runtime::Tokio1)
            .build()
            .map_err(|e| FanOutError::CreatePool(e.to_string()))?;

        tracing::info!(
            url = %redact(&config.url),
            max_connections = config.max_connections,
            "Redis pool created"
        );

        Ok(Self { pool })
    }

    /// Get a connection from the pool
    pub async fn get(&self) -> FanOutResult<deadpool_redis::Connection> {
        Ok(self.pool.get().await?)
    }

    /// Check if the pool is healthy by pinging Redis
    pub async fn health_check(&self) -> FanOutResult<()> {
        let mut conn = self.get().await?;
        redis::cmd("PING").query_async::<String>(&mut conn).await?;
        Ok(())
    }
}

/// Drop credentials from a Redis URL before logging it
pub(crate) fn redact(url: &str) -> &str {
    url.rsplit('@').next().unwrap_or(url)
}
