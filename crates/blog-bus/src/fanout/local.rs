//! In-process fan-out
//!
//! Every clone shares one hub, so buses built from clones of the same
//! [`LocalFanOut`] behave like nodes of one cluster.

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::{FanOut, DEFAULT_BUFFER};
use crate::envelope::Envelope;
use crate::error::FanOutResult;

/// Fan-out hub living inside the process
#[derive(Debug, Clone)]
pub struct LocalFanOut {
    tx: broadcast::Sender<Envelope>,
}

impl LocalFanOut {
    #[must_use]
    pub fn new() -> Self {
        Self::with_buffer(DEFAULT_BUFFER)
    }

    #[must_use]
    pub fn with_buffer(buffer: usize) -> Self {
        let (tx, _) = broadcast::channel(buffer);
        Self { tx }
    }
}

impl Default for LocalFanOut {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FanOut for LocalFanOut {
    async fn publish(&self, envelope: &Envelope) -> FanOutResult<()> {
        // No subscribers is not an error; nobody is listening yet
        let _ = self.tx.send(envelope.clone());
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.tx.subscribe()
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
