use super::StatusStore;
use chrono::Duration;
use std::sync::Arc;
use std::time::Duration as StdDuration;
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::sleep;
use tracing::info;

pub const DEFAULT_MAX_AGE_HOURS: i64 = 48;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60 * 60;

/// How long updates are kept and how often expired ones are swept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub max_age: Duration,
    pub sweep_interval: StdDuration,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_age: Duration::hours(DEFAULT_MAX_AGE_HOURS),
            sweep_interval: StdDuration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}

/// Outcome of a single eviction pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvictionReport {
    /// Updates older than the retention window.
    pub expired: usize,
    /// Updates dropped because their timestamp could not be read.
    pub corrupt: usize,
    /// Domains removed after losing their last update.
    pub removed_domains: usize,
}

impl EvictionReport {
    pub fn removed_updates(&self) -> usize {
        self.expired + self.corrupt
    }
}

/// Background task that evicts expired updates on a fixed interval.
pub struct RetentionSweeper {
    stop_tx: Option<oneshot::Sender<()>>,
    join_handle: Option<JoinHandle<()>>,
}

impl RetentionSweeper {
    /// Starts sweeping `store`. The first pass runs one interval from now.
    pub fn spawn(store: Arc<StatusStore>, policy: RetentionPolicy) -> Self {
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let join_handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut stop_rx => {
                        break;
                    }
                    _ = sleep(policy.sweep_interval) => {
                        let report = store.evict_expired(policy.max_age).await;
                        let remaining = store.stats().await;
                        info!(
                            expired = report.expired,
                            corrupt = report.corrupt,
                            removed_domains = report.removed_domains,
                            domains = remaining.domains,
                            updates = remaining.updates,
                            "retention sweep complete"
                        );
                    }
                }
            }
        });

        Self {
            stop_tx: Some(stop_tx),
            join_handle: Some(join_handle),
        }
    }

    /// Signals the sweeper to stop and waits for a running pass to finish.
    pub async fn stop(mut self) -> Result<(), JoinError> {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        if let Some(join_handle) = self.join_handle.take() {
            join_handle.await?;
        }

        Ok(())
    }
}

impl Drop for RetentionSweeper {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
        if let Some(join_handle) = self.join_handle.take() {
            join_handle.abort();
        }
    }
}
