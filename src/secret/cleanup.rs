//! Optional eviction of dead records.
//!
//! By default a [`SecretStore`] keeps every record forever so that
//! identifiers are never reused. When a dead-record retention is configured,
//! records that have been consumed or expired for at least that long may be
//! evicted, either lazily after creates (driven by a [`CleanupStrategy`]) or
//! periodically by a [`Sweeper`] task.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::store::SecretStore;
use super::time_utils::{current_timestamp_millis, duration_millis};

/// Strategy for determining when the store performs a lazy purge.
///
/// The store calls [`should_cleanup`](Self::should_cleanup) after each
/// successful create, and [`mark_as_cleaned`](Self::mark_as_cleaned) once
/// the purge has run. Both are called outside of any record lock and must
/// not block.
pub trait CleanupStrategy: Send + Sync {
    /// Determines whether a purge should be triggered.
    fn should_cleanup(&self) -> bool;

    /// Resets internal state after a purge.
    fn mark_as_cleaned(&self);
}

/// Triggers a purge after a number of creates or once enough time has
/// passed since the previous purge, whichever comes first.
pub struct HybridCleanupStrategy {
    count_threshold: u32,
    time_threshold: Duration,
    request_count: AtomicU32,
    last_cleanup_time: AtomicI64,
}

impl HybridCleanupStrategy {
    /// Creates a new hybrid strategy.
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::Duration;
    /// use onetime_secret::HybridCleanupStrategy;
    ///
    /// // Purge every 100 creates or every 5 minutes
    /// let strategy = HybridCleanupStrategy::new(100, Duration::from_secs(300));
    /// ```
    pub fn new(count_threshold: u32, time_threshold: Duration) -> Self {
        Self {
            count_threshold,
            time_threshold,
            request_count: AtomicU32::new(0),
            last_cleanup_time: AtomicI64::new(current_timestamp_millis()),
        }
    }
}

impl CleanupStrategy for HybridCleanupStrategy {
    fn should_cleanup(&self) -> bool {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;
        if count >= self.count_threshold {
            return true;
        }

        let last_cleanup = self.last_cleanup_time.load(Ordering::SeqCst);
        let elapsed = current_timestamp_millis().saturating_sub(last_cleanup);
        elapsed >= duration_millis(self.time_threshold)
    }

    fn mark_as_cleaned(&self) {
        self.request_count.store(0, Ordering::SeqCst);
        self.last_cleanup_time
            .store(current_timestamp_millis(), Ordering::SeqCst);
    }
}

impl Default for HybridCleanupStrategy {
    /// 100 creates or 5 minutes.
    fn default() -> Self {
        Self::new(100, Duration::from_secs(300))
    }
}

/// Wraps a closure as a cleanup strategy. State is left to the closure.
pub struct CustomCleanupStrategy<F>
where
    F: Fn() -> bool + Send + Sync + 'static,
{
    strategy_fn: F,
}

impl<F> CustomCleanupStrategy<F>
where
    F: Fn() -> bool + Send + Sync + 'static,
{
    pub fn new(strategy_fn: F) -> Self {
        Self { strategy_fn }
    }
}

impl<F> CleanupStrategy for CustomCleanupStrategy<F>
where
    F: Fn() -> bool + Send + Sync + 'static,
{
    fn should_cleanup(&self) -> bool {
        (self.strategy_fn)()
    }

    fn mark_as_cleaned(&self) {}
}

/// Type alias for boxed cleanup strategies.
pub type BoxedCleanupStrategy = Box<dyn CleanupStrategy>;

/// Periodic background purge of dead records.
///
/// The sweeper lives outside the store's synchronous API: it only calls
/// [`SecretStore::purge_dead`] on a tokio interval.
pub struct Sweeper;

impl Sweeper {
    /// Spawns the sweep loop on the current tokio runtime.
    ///
    /// A zero `interval` disables sweeping: no task is spawned and the
    /// returned handle reports itself finished straight away.
    ///
    /// # Example
    ///
    /// ```rust
    /// use onetime_secret::{SecretStore, Sweeper};
    /// use std::sync::Arc;
    /// use std::time::Duration;
    ///
    /// # async fn example() {
    /// let store = Arc::new(SecretStore::builder().build());
    /// let handle = Sweeper::spawn(store, Duration::from_secs(60), Duration::from_secs(3600));
    /// // ...
    /// handle.shutdown().await;
    /// # }
    /// ```
    pub fn spawn(
        store: Arc<SecretStore>,
        interval: Duration,
        retention: Duration,
    ) -> SweeperHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        if interval.is_zero() {
            tracing::info!("Secret sweeper disabled: zero sweep interval");
            return SweeperHandle {
                shutdown_tx,
                task: None,
            };
        }

        let task = tokio::spawn(async move {
            tracing::info!(
                interval_ms = interval.as_millis() as u64,
                retention_secs = retention.as_secs(),
                "Secret sweeper started"
            );
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = store.purge_dead(retention);
                        if removed > 0 {
                            tracing::info!(removed, "Swept dead secret records");
                        }
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
            tracing::info!("Secret sweeper stopped");
        });

        SweeperHandle {
            shutdown_tx,
            task: Some(task),
        }
    }
}

/// Controls a running [`Sweeper`]. Dropping the handle also stops it.
pub struct SweeperHandle {
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl SweeperHandle {
    /// Signals the sweeper to stop and waits for it to finish.
    pub async fn shutdown(mut self) {
        let _ = self.shutdown_tx.send(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!("Secret sweeper task failed: {}", e);
            }
        }
    }

    /// Whether the sweep loop has exited.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(|task| task.is_finished())
    }
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        let _ = self.shutdown_tx.send(true);
    }
}
