//! Pluggable probing strategies for the connection manager.
//!
//! Both strategies observe identical per-backend semantics; they differ only
//! in scheduling. [`PooledProbe`] runs all backends concurrently, bounding a
//! cycle's wall clock by the slowest single backend. [`SequentialProbe`]
//! awaits backends one at a time, so a cycle can cost the sum of all
//! timeouts — acceptable when simplicity beats responsiveness.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::debug;

use crate::application::interfaces::CadClient;
use crate::domain::{Backend, StatusMap};

/// One backend's probe input for a single cycle.
pub struct ProbeTarget {
    pub backend: Backend,
    pub client: Arc<dyn CadClient>,
    /// Cached connectivity flag at the start of the cycle.
    pub already_connected: bool,
    /// When false, a backend already marked connected is trusted alive and
    /// only its status is refreshed.
    pub revalidate: bool,
    pub timeout: Duration,
}

/// One backend's probe result.
#[derive(Debug, Clone)]
pub struct ProbeOutcome {
    pub backend: Backend,
    pub connected: bool,
    pub status: StatusMap,
}

impl ProbeOutcome {
    fn down(backend: Backend) -> Self {
        Self {
            backend,
            connected: false,
            status: StatusMap::new(),
        }
    }
}

/// Schedules the per-backend probes of one cycle.
#[async_trait]
pub trait ProbeStrategy: Send + Sync {
    async fn run(&self, targets: Vec<ProbeTarget>) -> Vec<ProbeOutcome>;
}

/// Probes all backends concurrently.
pub struct PooledProbe;

#[async_trait]
impl ProbeStrategy for PooledProbe {
    async fn run(&self, targets: Vec<ProbeTarget>) -> Vec<ProbeOutcome> {
        join_all(targets.into_iter().map(probe_backend)).await
    }
}

/// Probes backends one at a time, in registration order.
pub struct SequentialProbe;

#[async_trait]
impl ProbeStrategy for SequentialProbe {
    async fn run(&self, targets: Vec<ProbeTarget>) -> Vec<ProbeOutcome> {
        let mut outcomes = Vec::with_capacity(targets.len());
        for target in targets {
            outcomes.push(probe_backend(target).await);
        }
        outcomes
    }
}

/// Probes a single backend. Errors and timeouts never escape: they become a
/// disconnected outcome for this backend alone.
async fn probe_backend(target: ProbeTarget) -> ProbeOutcome {
    let ProbeTarget {
        backend,
        client,
        already_connected,
        revalidate,
        timeout,
    } = target;

    let alive = if already_connected && !revalidate {
        true
    } else {
        match tokio::time::timeout(timeout, client.connect(timeout)).await {
            Ok(Ok(connected)) => connected,
            Ok(Err(e)) => {
                debug!(backend = %backend, error = %e, "probe connect failed");
                false
            }
            Err(_) => {
                debug!(backend = %backend, "probe connect timed out");
                false
            }
        }
    };

    if !alive {
        return ProbeOutcome::down(backend);
    }

    match tokio::time::timeout(timeout, client.get_status()).await {
        Ok(Ok(status)) => ProbeOutcome {
            backend,
            connected: true,
            status,
        },
        Ok(Err(e)) => {
            debug!(backend = %backend, error = %e, "status fetch failed");
            ProbeOutcome::down(backend)
        }
        Err(_) => {
            debug!(backend = %backend, "status fetch timed out");
            ProbeOutcome::down(backend)
        }
    }
}
