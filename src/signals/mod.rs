// Signal handling for service shutdown
// SIGTERM / SIGINT stop the accept loop; in-memory state is simply dropped

use anyhow::{Context, Result};
use futures::StreamExt;
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook_tokio::Signals;
use std::future::Future;
use tokio::sync::broadcast;
use tracing::{debug, info};

/// Future that resolves on the first SIGTERM or SIGINT
pub fn create_shutdown_listener() -> Result<impl Future<Output = ()>> {
    let mut signals =
        Signals::new([SIGTERM, SIGINT]).context("Failed to register signal handlers")?;

    Ok(async move {
        while let Some(signal) = signals.next().await {
            match signal {
                SIGTERM => {
                    info!("Received SIGTERM, stopping service");
                    break;
                }
                SIGINT => {
                    info!("Received SIGINT, stopping service");
                    break;
                }
                other => debug!(signal = other, "Ignoring signal"),
            }
        }
    })
}

/// Fans a single stop notification out to every accept loop in the process
pub struct ShutdownCoordinator {
    tx: broadcast::Sender<()>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(4);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    pub fn trigger(&self) {
        let receivers = self.tx.send(()).unwrap_or(0);
        info!(receivers = receivers, "Shutdown broadcast");
    }

    /// Trigger once the listener future resolves
    pub fn trigger_on<F>(self: std::sync::Arc<Self>, listener: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(async move {
            listener.await;
            self.trigger();
        });
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
