//! Cluster-wide fan-out
//!
//! A [`FanOut`] publishes envelopes to every node subscribed to the same channel,
//! including the publisher. Which implementation runs is decided once at startup.

mod local;
mod redis_pubsub;

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::envelope::Envelope;
use crate::error::FanOutResult;

pub use redis_pubsub::{RedisFanOut, SubscriberConfig};
pub use local::LocalFanOut;

/// Buffered envelopes per subscriber before the slowest one starts lagging
pub const DEFAULT_BUFFER: usize = 1024;

/// Publish/subscribe transport shared by all nodes
#[async_trait]
pub trait FanOut: Send + Sync + 'static {
    /// Send an envelope to every subscribed node
    async fn publish(&self, envelope: &Envelope) -> FanOutResult<()>;

    /// Stream of envelopes published by any node
    fn subscribe(&self) -> broadcast::Receiver<Envelope>;

    /// Short transport name for logs
    fn name(&self) -> &'static str;

    /// Release background resources; publishing after this is undefined
    async fn close(&self) -> FanOutResult<()> {
        Ok(())
    }
}
