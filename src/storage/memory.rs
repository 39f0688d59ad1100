use super::retention::EvictionReport;
use crate::core::types::newest_first;
use crate::core::{Clock, Snapshot, StatusUpdate, SystemClock, Timestamp};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Counts describing the store's current contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub domains: usize,
    pub updates: usize,
}

/// Per-domain status histories behind a single reader/writer lock.
///
/// Readers (`snapshot`, `lookup`) share the lock; `append` and `evict` take it
/// exclusively, so no reader ever sees a history half-way through a mutation.
/// Every stored history is non-empty and kept in append order.
#[derive(Debug)]
pub struct StatusStore {
    histories: RwLock<HashMap<String, Vec<StatusUpdate>>>,
    clock: Arc<dyn Clock>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            histories: RwLock::new(HashMap::new()),
            clock,
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Record a status for `domain`, stamped with the current time.
    ///
    /// A clock that stepped backwards is clamped to the domain's latest
    /// timestamp, so each history stays non-decreasing in append order.
    pub async fn append(&self, domain: &str, status: &str) {
        let mut histories = self.histories.write().await;
        // Stamp under the lock so timestamps follow the order writes land in.
        let now = Timestamp::from_datetime(self.clock.now());
        let history = histories.entry(domain.to_string()).or_default();
        let observed_at = match history.last() {
            Some(last) if last.observed_at() > &now => last.observed_at().clone(),
            _ => now,
        };
        history.push(StatusUpdate::new(status, observed_at.clone()));
        drop(histories);

        debug!(domain, status, observed_at = %observed_at, "status stored");
    }

    /// Deep copy of every history, newest first.
    pub async fn snapshot(&self) -> Snapshot {
        let histories = self.histories.read().await;
        histories
            .iter()
            .map(|(domain, history)| (domain.clone(), newest_first(history)))
            .collect()
    }

    /// Copy of one domain's history, newest first; `None` if nothing is stored.
    pub async fn lookup(&self, domain: &str) -> Option<Vec<StatusUpdate>> {
        let histories = self.histories.read().await;
        histories.get(domain).map(|history| newest_first(history))
    }

    /// Drop every update observed before `now - max_age`.
    ///
    /// Domains left without updates are removed. Updates whose timestamp does
    /// not parse are logged and dropped as well.
    pub async fn evict(&self, now: DateTime<Utc>, max_age: Duration) -> EvictionReport {
        let cutoff = now
            .checked_sub_signed(max_age)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let mut report = EvictionReport::default();
        let mut unreadable = Vec::new();

        let mut histories = self.histories.write().await;
        histories.retain(|domain, history| {
            history.retain(|update| match update.observed_at().parse() {
                Ok(observed_at) if observed_at < cutoff => {
                    report.expired += 1;
                    false
                }
                Ok(_) => true,
                Err(err) => {
                    unreadable.push((domain.clone(), err));
                    report.corrupt += 1;
                    false
                }
            });

            if history.is_empty() {
                report.removed_domains += 1;
                false
            } else {
                true
            }
        });
        drop(histories);

        for (domain, err) in unreadable {
            warn!(domain = %domain, error = %err, "dropped status update with unreadable timestamp");
        }

        report
    }

    /// `evict` relative to this store's clock.
    pub async fn evict_expired(&self, max_age: Duration) -> EvictionReport {
        let now = self.clock.now();
        self.evict(now, max_age).await
    }

    pub async fn stats(&self) -> StoreStats {
        let histories = self.histories.read().await;
        StoreStats {
            domains: histories.len(),
            updates: histories.values().map(Vec::len).sum(),
        }
    }

    #[cfg(test)]
    async fn insert_raw(&self, domain: &str, update: StatusUpdate) {
        self.histories
            .write()
            .await
            .entry(domain.to_string())
            .or_default()
            .push(update);
    }
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ManualClock;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::layer::{Context, SubscriberExt};
    use tracing_subscriber::Layer;

    /// Counts events emitted while the store's lock is held.
    struct LockWatcher {
        store: Arc<StatusStore>,
        events: Arc<AtomicUsize>,
        under_lock: Arc<AtomicUsize>,
    }

    impl<S: Subscriber> Layer<S> for LockWatcher {
        fn on_event(&self, _event: &Event<'_>, _ctx: Context<'_, S>) {
            self.events.fetch_add(1, Ordering::SeqCst);
            if self.store.histories.try_write().is_err() {
                self.under_lock.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn corrupt_timestamps_are_dropped_without_stopping_the_sweep() {
        let clock = Arc::new(ManualClock::new(start()));
        let store = StatusStore::with_clock(clock.clone());

        store.append("good.example", "up").await;
        store
            .insert_raw("good.example", StatusUpdate::new("bad", Timestamp::from_raw("not-a-time")))
            .await;
        store
            .insert_raw("broken.example", StatusUpdate::new("bad", Timestamp::from_raw("")))
            .await;

        let report = store.evict(start(), Duration::hours(48)).await;

        assert_eq!(report.corrupt, 2);
        assert_eq!(report.expired, 0);
        assert_eq!(report.removed_domains, 1);

        let good = store.lookup("good.example").await.unwrap();
        assert_eq!(good.len(), 1);
        assert_eq!(good[0].status(), "up");
        assert!(store.lookup("broken.example").await.is_none());
    }

    #[tokio::test]
    async fn clock_stepping_back_does_not_reorder_history() {
        let clock = Arc::new(ManualClock::new(start()));
        let store = StatusStore::with_clock(clock.clone());

        store.append("example.com", "first").await;
        clock.set(start() - Duration::seconds(1));
        store.append("example.com", "second").await;

        let history = store.lookup("example.com").await.unwrap();
        assert_eq!(history[0].status(), "second");
        assert_eq!(history[1].status(), "first");
        assert_eq!(history[0].observed_at(), history[1].observed_at());
        assert_eq!(history[0].observed_at().parse().unwrap(), start());
    }

    #[tokio::test]
    async fn logging_happens_after_the_lock_is_released() {
        let store = Arc::new(StatusStore::with_clock(Arc::new(ManualClock::new(start()))));
        let events = Arc::new(AtomicUsize::new(0));
        let under_lock = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(LockWatcher {
            store: store.clone(),
            events: events.clone(),
            under_lock: under_lock.clone(),
        });
        let _guard = tracing::subscriber::set_default(subscriber);

        store.append("example.com", "up").await;
        store
            .insert_raw("example.com", StatusUpdate::new("bad", Timestamp::from_raw("garbage")))
            .await;
        let report = store.evict(start(), Duration::hours(48)).await;

        assert_eq!(report.corrupt, 1);
        assert!(events.load(Ordering::SeqCst) >= 2, "append and evict should both log");
        assert_eq!(under_lock.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn update_exactly_at_cutoff_is_kept() {
        let clock = Arc::new(ManualClock::new(start()));
        let store = StatusStore::with_clock(clock.clone());
        store.append("edge.example", "up").await;

        let report = store
            .evict(start() + Duration::hours(48), Duration::hours(48))
            .await;

        assert_eq!(report, EvictionReport::default());
        assert!(store.lookup("edge.example").await.is_some());
    }

    #[tokio::test]
    async fn huge_max_age_evicts_nothing() {
        let store = StatusStore::with_clock(Arc::new(ManualClock::new(start())));
        store.append("old.example", "up").await;

        let report = store.evict(start(), Duration::MAX).await;

        assert_eq!(report.expired, 0);
        assert_eq!(store.stats().await, StoreStats { domains: 1, updates: 1 });
    }
}
