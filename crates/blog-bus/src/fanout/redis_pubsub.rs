//! Redis pub/sub fan-out
//!
//! Publishing goes through the pooled connections. Receiving runs on a dedicated
//! pub/sub connection owned by a background listener that resubscribes after a
//! fixed delay whenever the subscription is lost.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use redis::{AsyncCommands, Client};
use tokio::sync::{broadcast, mpsc};

use super::{FanOut, DEFAULT_BUFFER};
use crate::envelope::Envelope;
use crate::error::{FanOutError, FanOutResult};
use crate::pool::{RedisPool, RedisPoolConfig};

/// Subscriber configuration
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Redis connection URL
    pub redis_url: String,
    /// Cluster channel every node publishes to and subscribes on
    pub channel: String,
    /// Channel buffer size for broadcast
    pub broadcast_buffer: usize,
    /// Reconnection delay in milliseconds
    pub reconnect_delay_ms: u64,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            channel: "blog:broadcast".to_string(),
            broadcast_buffer: DEFAULT_BUFFER,
            reconnect_delay_ms: 1000,
        }
    }
}

/// Fan-out over one Redis pub/sub channel
pub struct RedisFanOut {
    pool: RedisPool,
    channel: String,
    broadcast_tx: broadcast::Sender<Envelope>,
    shutdown_tx: mpsc::Sender<()>,
}

impl RedisFanOut {
    /// Connect to Redis and start listening on the cluster channel
    ///
    /// Fails if Redis does not answer a `PING`, so callers can fall back to
    /// local-only delivery at startup.
    pub async fn connect(
        pool_config: &RedisPoolConfig,
        config: SubscriberConfig,
    ) -> FanOutResult<Self> {
        let pool = RedisPool::new(pool_config)?;
        pool.health_check().await?;

        let (broadcast_tx, _) = broadcast::channel(config.broadcast_buffer);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        let channel = config.channel.clone();

        tokio::spawn(listener_loop(config, broadcast_tx.clone(), shutdown_rx));

        Ok(Self {
            pool,
            channel,
            broadcast_tx,
            shutdown_tx,
        })
    }
}

impl std::fmt::Debug for RedisFanOut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisFanOut")
            .field("pool", &self.pool)
            .field("channel", &self.channel)
            .finish()
    }
}

#[async_trait]
impl FanOut for RedisFanOut {
    async fn publish(&self, envelope: &Envelope) -> FanOutResult<()> {
        let mut conn = self.pool.get().await?;
        let payload = envelope.to_json()?;

        let receivers: u32 = conn.publish(&self.channel, &payload).await?;

        tracing::trace!(
            channel = %self.channel,
            receivers = receivers,
            "Published envelope"
        );
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.broadcast_tx.subscribe()
    }

    fn name(&self) -> &'static str {
        "redis"
    }

    /// Stop the background listener
    async fn close(&self) -> FanOutResult<()> {
        self.shutdown_tx
            .send(())
            .await
            .map_err(|_| FanOutError::Closed)
    }
}

/// Keep a subscription alive until shutdown
async fn listener_loop(
    config: SubscriberConfig,
    broadcast_tx: broadcast::Sender<Envelope>,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    loop {
        match run_listener(&config, &broadcast_tx, &mut shutdown_rx).await {
            Ok(()) => {
                tracing::info!(channel = %config.channel, "Fan-out subscriber shutting down");
                break;
            }
            Err(e) => {
                tracing::warn!(
                    channel = %config.channel,
                    error = %e,
                    delay_ms = config.reconnect_delay_ms,
                    "Fan-out subscription lost, reconnecting"
                );
                tokio::time::sleep(Duration::from_millis(config.reconnect_delay_ms)).await;
            }
        }
    }
}

/// Run the listener until error or shutdown
async fn run_listener(
    config: &SubscriberConfig,
    broadcast_tx: &broadcast::Sender<Envelope>,
    shutdown_rx: &mut mpsc::Receiver<()>,
) -> FanOutResult<()> {
    let client = Client::open(config.redis_url.as_str())?;
    let mut pubsub = client.get_async_pubsub().await?;
    pubsub.subscribe(&config.channel).await?;

    tracing::info!(channel = %config.channel, "Fan-out subscriber connected to Redis");

    let mut stream = pubsub.on_message();

    loop {
        tokio::select! {
            msg = stream.next() => {
                let Some(msg) = msg else {
                    return Err(FanOutError::Closed);
                };

                let payload: String = msg.get_payload().unwrap_or_default();
                match serde_json::from_str::<Envelope>(&payload) {
                    Ok(envelope) => {
                        // No local receivers yet is fine
                        let _ = broadcast_tx.send(envelope);
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "Ignoring malformed envelope");
                    }
                }
            }

            _ = shutdown_rx.recv() => {
                return Ok(());
            }
        }
    }
}
