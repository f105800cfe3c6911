// Session expiry sweeper
// Fixed-interval background task that evicts idle sessions for the life of the process

use super::sessions::SessionStore;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::{Duration, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Background eviction of idle sessions.
/// Holds nothing but a handle to the session store; the only place expiry runs autonomously.
pub struct ExpirySweeper {
    store: Arc<SessionStore>,
    interval: Duration,

    /// Completed sweeps
    sweeps: Arc<AtomicU64>,

    /// Sessions evicted across all sweeps
    evicted: Arc<AtomicU64>,

    running: AtomicBool,
}

impl ExpirySweeper {
    pub fn new(store: Arc<SessionStore>, interval: Duration) -> Self {
        Self {
            store,
            interval,
            sweeps: Arc::new(AtomicU64::new(0)),
            evicted: Arc::new(AtomicU64::new(0)),
            running: AtomicBool::new(false),
        }
    }

    /// Start the sweep loop. Runs until the process exits; a second call is a no-op.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::Relaxed) {
            warn!("Expiry sweeper already running");
            return;
        }

        info!(
            interval_secs = self.interval.as_secs(),
            timeout_secs = self.store.timeout().as_secs(),
            "Starting session expiry sweeper"
        );

        let store = self.store.clone();
        let sweeps = self.sweeps.clone();
        let evicted = self.evicted.clone();
        let period = self.interval;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;

                let report = store.sweep();
                sweeps.fetch_add(1, Ordering::Relaxed);
                evicted.fetch_add(report.evicted as u64, Ordering::Relaxed);

                if report.evicted > 0 {
                    info!(
                        evicted = report.evicted,
                        remaining = report.remaining,
                        "Expired sessions evicted"
                    );
                } else {
                    debug!(remaining = report.remaining, "Session sweep found nothing to evict");
                }
            }
        });
    }

    pub fn stats(&self) -> SweeperStats {
        SweeperStats {
            sweeps: self.sweeps.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            is_running: self.running.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweeperStats {
    pub sweeps: u64,
    pub evicted: u64,
    pub is_running: bool,
}
