//! Fan-out transport errors

/// Errors raised by a fan-out transport
#[derive(Debug, thiserror::Error)]
pub enum FanOutError {
    #[error("Failed to create Redis pool: {0}")]
    CreatePool(String),

    #[error("Failed to get connection from pool: {0}")]
    GetConnection(#[from] deadpool_redis::PoolError),

    #[error("Redis command error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Fan-out transport closed")]
    Closed,
}

/// Result type for fan-out operations
pub type FanOutResult<T> = Result<T, FanOutError>;
