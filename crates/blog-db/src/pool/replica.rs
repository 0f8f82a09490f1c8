//! Replica selection and failover
//!
//! A [`ReplicaSet`] holds one live link, chosen from an ordered candidate list. At
//! startup the first candidate that accepts a dial wins. When an operation fails with
//! a connectivity error the link is replaced and the operation runs once more on the
//! new one. Links are never repaired in place.
//!
//! Callers take a snapshot of the current link before running, so a replacement
//! never pulls a link out from under an in-flight operation: it finishes (or fails)
//! on the link it started with and retries on the new one.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::error::StoreError;

/// Total runs of one operation: the original attempt plus exactly one retry
pub const MAX_ATTEMPTS: u32 = 2;

/// Opens links to replicas
#[async_trait]
pub trait Dialer: Send + Sync + 'static {
    /// Shared handle to one replica; cloning must be cheap
    type Link: Clone + Send + Sync + 'static;

    /// Open a link, failing if the replica does not accept connections
    async fn dial(&self, address: &str) -> Result<Self::Link, StoreError>;
}

/// Counters for failover activity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplicaStats {
    /// Link replacements performed
    pub failovers: u64,
    /// Operations re-run after a connectivity failure
    pub retries: u64,
}

struct Active<L> {
    link: L,
    index: usize,
    generation: u64,
}

/// Live link to one replica out of an ordered candidate list
pub struct ReplicaSet<D: Dialer> {
    dialer: D,
    candidates: Vec<String>,
    active: RwLock<Active<D::Link>>,
    // Serializes replacements so concurrent failures trigger one failover
    failover: Mutex<()>,
    failovers: AtomicU64,
    retries: AtomicU64,
}

impl<D: Dialer> ReplicaSet<D> {
    /// Link to the first reachable candidate, in list order
    pub async fn connect(dialer: D, candidates: Vec<String>) -> Result<Self, StoreError> {
        let (index, link) = dial_first(&dialer, &candidates, 0..candidates.len()).await?;

        Ok(Self {
            dialer,
            candidates,
            active: RwLock::new(Active {
                link,
                index,
                generation: 0,
            }),
            failover: Mutex::new(()),
            failovers: AtomicU64::new(0),
            retries: AtomicU64::new(0),
        })
    }

    /// Address of the replica currently in use, credentials removed
    pub fn active_address(&self) -> String {
        let index = self.active.read().index;
        redact(&self.candidates[index])
    }

    pub fn stats(&self) -> ReplicaStats {
        ReplicaStats {
            failovers: self.failovers.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
        }
    }

    fn snapshot(&self) -> (u64, D::Link) {
        let active = self.active.read();
        (active.generation, active.link.clone())
    }

    /// Run `op` on the current link, failing over and retrying once on connectivity loss
    ///
    /// `op` may be invoked twice, so it must be safe to repeat.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, StoreError>
    where
        F: FnMut(D::Link) -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        let mut attempt = 1;
        loop {
            let (generation, link) = self.snapshot();

            match op(link).await {
                Err(err) if err.is_connectivity() => {
                    if attempt >= MAX_ATTEMPTS {
                        warn!(attempt, error = %err, "store still unreachable after failover");
                        return Err(StoreError::RetriesExhausted {
                            attempts: attempt,
                            last: err.to_string(),
                        });
                    }

                    warn!(
                        attempt,
                        replica = %self.active_address(),
                        error = %err,
                        "connectivity failure, failing over"
                    );
                    self.replace(generation).await?;
                    self.retries.fetch_add(1, Ordering::Relaxed);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// Replace the link of `failed_generation`, unless another caller already did
    async fn replace(&self, failed_generation: u64) -> Result<(), StoreError> {
        let _guard = self.failover.lock().await;

        let failed_index = {
            let active = self.active.read();
            if active.generation != failed_generation {
                return Ok(());
            }
            active.index
        };

        // Try the candidates after the failed one first, the failed one last
        let count = self.candidates.len();
        let order = (1..=count).map(|offset| (failed_index + offset) % count);
        let (index, link) = dial_first(&self.dialer, &self.candidates, order).await?;

        {
            let mut active = self.active.write();
            active.link = link;
            active.index = index;
            active.generation += 1;
        }
        self.failovers.fetch_add(1, Ordering::Relaxed);

        info!(
            from = %redact(&self.candidates[failed_index]),
            to = %redact(&self.candidates[index]),
            "replaced store link"
        );
        Ok(())
    }
}

async fn dial_first<D: Dialer>(
    dialer: &D,
    candidates: &[String],
    order: impl Iterator<Item = usize>,
) -> Result<(usize, D::Link), StoreError> {
    for index in order {
        let address = &candidates[index];
        match dialer.dial(address).await {
            Ok(link) => {
                info!(replica = %redact(address), "connected to store replica");
                return Ok((index, link));
            }
            Err(err) => {
                warn!(replica = %redact(address), error = %err, "replica unreachable, trying next");
            }
        }
    }

    Err(StoreError::NoReachableReplica {
        candidates: candidates.len(),
    })
}

/// Strip `user:password@` from a connection URL before it reaches the logs
fn redact(address: &str) -> String {
    match (address.find("://"), address.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://{}", &address[..scheme_end], &address[at + 1..])
        }
        _ => address.to_string(),
    }
}
