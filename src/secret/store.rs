use std::fmt;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;

use super::cleanup::BoxedCleanupStrategy;
use super::config::SecretConfig;
use super::error::SecretError;
use super::generator::SecretGenerator;
use super::record::{SecretMeta, SecretRecord};
use super::store_builder::SecretStoreBuilder;
use super::time_utils::{TimeProviderFn, duration_millis, expiry_after};

/// A point-in-time breakdown of the records held by a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Total number of records, dead or alive
    pub total_records: usize,
    /// Records that can still be consumed
    pub live: usize,
    /// Records that were consumed and have not yet expired
    pub consumed: usize,
    /// Records whose time-to-live has elapsed
    pub expired: usize,
}

/// An in-memory, thread-safe store of one-time secrets.
///
/// Every identifier can be created once and its value retrieved once:
///
/// - [`create`](Self::create) atomically claims an identifier and returns a
///   freshly generated value. A second create for the same identifier fails
///   with [`SecretError::IdentifierUnavailable`], whether the existing record
///   is live, consumed or expired.
/// - [`consume`](Self::consume) atomically checks and flips the record's
///   consumed flag. Among any number of racing consumers exactly one gets the
///   value; the rest see [`SecretError::AlreadyConsumed`].
///
/// Records are sharded by identifier, so operations on unrelated identifiers
/// do not contend on a single lock. Expiry is evaluated lazily on access.
/// Nothing is ever removed unless a dead-record retention is configured (see
/// [`cleanup`](crate::secret::cleanup)) or [`reset`](Self::reset) is called.
///
/// # Example
///
/// ```rust
/// use onetime_secret::{SecretError, SecretStore};
///
/// let store = SecretStore::builder().build();
///
/// let value = store.create("alpha", 10)?;
/// assert_eq!(store.consume("alpha")?, value);
/// assert_eq!(store.consume("alpha"), Err(SecretError::AlreadyConsumed));
/// assert_eq!(store.create("alpha", 10), Err(SecretError::IdentifierUnavailable));
/// # Ok::<(), SecretError>(())
/// ```
pub struct SecretStore {
    records: DashMap<String, SecretRecord>,
    // Shared by create/consume, exclusive for reset
    reset_gate: RwLock<()>,
    generator: Box<dyn SecretGenerator>,
    time_provider: TimeProviderFn,
    cleanup_strategy: Option<BoxedCleanupStrategy>,
    config: SecretConfig,
}

impl SecretStore {
    /// Creates a new `SecretStoreBuilder`.
    pub fn builder() -> SecretStoreBuilder {
        SecretStoreBuilder::new()
    }

    /// Internal constructor used by the builder.
    pub(crate) fn new(
        config: SecretConfig,
        capacity: usize,
        generator: Box<dyn SecretGenerator>,
        time_provider: TimeProviderFn,
        cleanup_strategy: Option<BoxedCleanupStrategy>,
    ) -> Self {
        Self {
            records: DashMap::with_capacity(capacity),
            reset_gate: RwLock::new(()),
            generator,
            time_provider,
            cleanup_strategy,
            config,
        }
    }

    fn now(&self) -> i64 {
        (self.time_provider)()
    }

    /// Creates a secret under `id` that expires `ttl_seconds` from now.
    ///
    /// Input validation (non-blank identifier, positive TTL) belongs to the
    /// caller; a TTL of zero yields a record that is already expired.
    ///
    /// # Errors
    ///
    /// [`SecretError::IdentifierUnavailable`] if any record for `id` exists.
    pub fn create(&self, id: &str, ttl_seconds: u64) -> Result<String, SecretError> {
        let value = self.generator.generate();

        {
            let _gate = self.reset_gate.read();
            let created_at = self.now();
            let expires_at = expiry_after(created_at, ttl_seconds);

            match self.records.entry(id.to_owned()) {
                Entry::Occupied(_) => {
                    tracing::debug!(id, "Secret identifier unavailable");
                    return Err(SecretError::IdentifierUnavailable);
                }
                Entry::Vacant(entry) => {
                    entry.insert(SecretRecord::new(
                        id.to_owned(),
                        value.clone(),
                        created_at,
                        expires_at,
                    ));
                }
            }
        }
        tracing::debug!(id, ttl_seconds, "Secret created");

        self.maybe_trigger_cleanup();

        Ok(value)
    }

    /// Retrieves the value stored under `id`, consuming it.
    ///
    /// The lookup, the expiry and consumed checks, and the flip of the
    /// consumed flag happen under the record's lock as one step. A failed
    /// attempt never mutates the record.
    ///
    /// # Errors
    ///
    /// - [`SecretError::NotFound`] if no record exists for `id`
    /// - [`SecretError::Expired`] if the record's TTL has elapsed
    /// - [`SecretError::AlreadyConsumed`] if the value was already retrieved
    pub fn consume(&self, id: &str) -> Result<String, SecretError> {
        let result = {
            let _gate = self.reset_gate.read();
            match self.records.get_mut(id) {
                Some(mut record) => {
                    let now = self.now();
                    record.try_consume(now)
                }
                None => Err(SecretError::NotFound),
            }
        };

        match &result {
            Ok(_) => tracing::debug!(id, "Secret consumed"),
            Err(e) => tracing::debug!(id, reason = ?e.reason(), "Secret consumption rejected"),
        }
        result
    }

    /// Removes every record.
    ///
    /// Intended for test isolation. The clear waits for in-flight creates and
    /// consumes to finish and holds off new ones until it is done, so no
    /// operation observes a partially cleared store.
    pub fn reset(&self) {
        let _gate = self.reset_gate.write();
        self.records.clear();
        tracing::debug!("Secret store reset");
    }

    /// Removes records that have been dead for at least `retention`.
    ///
    /// A record is dead once it is consumed or its TTL has elapsed. Live
    /// records are never touched. Evicted identifiers become available to
    /// [`create`](Self::create) again.
    ///
    /// Returns the number of records removed.
    pub fn purge_dead(&self, retention: Duration) -> usize {
        let now = self.now();
        let retention = duration_millis(retention);
        let mut removed = 0;

        self.records.retain(|_, record| match record.dead_since(now) {
            Some(dead_since) if now.saturating_sub(dead_since) >= retention => {
                removed += 1;
                false
            }
            _ => true,
        });

        if removed > 0 {
            tracing::debug!(removed, "Purged dead secret records");
        }
        removed
    }

    /// Returns metadata for the record under `id` without consuming it.
    ///
    /// The secret value is never exposed through this call.
    pub fn describe(&self, id: &str) -> Option<SecretMeta> {
        let now = self.now();
        self.records
            .get(id)
            .map(|record| SecretMeta::from_record(&record, now))
    }

    /// Returns a snapshot breakdown of the stored records.
    pub fn stats(&self) -> StoreStats {
        let now = self.now();
        let mut stats = StoreStats::default();

        for record in self.records.iter() {
            stats.total_records += 1;
            if record.is_expired_at(now) {
                stats.expired += 1;
            } else if record.consumed() {
                stats.consumed += 1;
            } else {
                stats.live += 1;
            }
        }
        stats
    }

    /// Number of records currently held, dead or alive.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the configuration the store was built with.
    pub fn config(&self) -> &SecretConfig {
        &self.config
    }

    /// Runs a lazy purge when retention is configured and the strategy fires.
    fn maybe_trigger_cleanup(&self) {
        let (Some(strategy), Some(retention)) =
            (&self.cleanup_strategy, self.config.dead_record_retention)
        else {
            return;
        };

        if strategy.should_cleanup() {
            self.purge_dead(retention);
            strategy.mark_as_cleaned();
        }
    }
}

impl Default for SecretStore {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for SecretStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretStore")
            .field("records", &self.records.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secret::config::ConfigPreset;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};

    const START: i64 = 1_700_000_000_000;

    fn manual_clock() -> (Arc<AtomicI64>, impl Fn() -> i64 + Send + Sync + 'static) {
        let clock = Arc::new(AtomicI64::new(START));
        let reader = Arc::clone(&clock);
        (clock, move || reader.load(Ordering::SeqCst))
    }

    #[test]
    fn test_create_and_consume() {
        let store = SecretStore::builder().build();

        let value = store.create("alpha", 10).unwrap();
        assert!(!value.is_empty());
        assert_eq!(store.consume("alpha"), Ok(value));
        assert_eq!(store.consume("alpha"), Err(SecretError::AlreadyConsumed));
    }

    #[test]
    fn test_consume_unknown() {
        let store = SecretStore::builder().build();
        assert_eq!(store.consume("gamma"), Err(SecretError::NotFound));
    }

    #[test]
    fn test_create_duplicate() {
        let store = SecretStore::builder().build();

        store.create("delta", 10).unwrap();
        assert_eq!(
            store.create("delta", 10),
            Err(SecretError::IdentifierUnavailable)
        );
    }

    #[test]
    fn test_duplicate_create_keeps_original_value() {
        let store = SecretStore::builder().build();

        let original = store.create("delta", 10).unwrap();
        let _ = store.create("delta", 10);
        assert_eq!(store.consume("delta"), Ok(original));
    }

    #[test]
    fn test_expiry_with_manual_clock() {
        let (clock, provider) = manual_clock();
        let store = SecretStore::builder().with_time_provider(provider).build();

        store.create("beta", 1).unwrap();

        clock.store(START + 999, Ordering::SeqCst);
        store.create("beta-2", 1).unwrap();

        clock.store(START + 1_000, Ordering::SeqCst);
        assert_eq!(store.consume("beta"), Err(SecretError::Expired));
        // Expired records stay in place and keep reporting Expired
        assert_eq!(store.consume("beta"), Err(SecretError::Expired));
        assert_eq!(store.consume("beta-2").map(|v| v.len()), Ok(64));
    }

    #[test]
    fn test_identifier_unavailable_after_consume_and_expiry() {
        let (clock, provider) = manual_clock();
        let store = SecretStore::builder().with_time_provider(provider).build();

        store.create("consumed", 10).unwrap();
        store.consume("consumed").unwrap();
        assert_eq!(
            store.create("consumed", 10),
            Err(SecretError::IdentifierUnavailable)
        );

        store.create("expired", 1).unwrap();
        clock.store(START + 5_000, Ordering::SeqCst);
        assert_eq!(
            store.create("expired", 10),
            Err(SecretError::IdentifierUnavailable)
        );
    }

    #[test]
    fn test_zero_ttl_is_immediately_expired() {
        let (_clock, provider) = manual_clock();
        let store = SecretStore::builder().with_time_provider(provider).build();

        store.create("zero", 0).unwrap();
        assert_eq!(store.consume("zero"), Err(SecretError::Expired));
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let store = SecretStore::builder().build();

        store.create("forever", u64::MAX).unwrap();
        assert!(store.consume("forever").is_ok());
    }

    #[test]
    fn test_describe_does_not_consume() {
        let (clock, provider) = manual_clock();
        let store = SecretStore::builder().with_time_provider(provider).build();

        assert_eq!(store.describe("missing"), None);

        store.create("meta", 5).unwrap();
        let meta = store.describe("meta").unwrap();
        assert_eq!(meta.created_at, START);
        assert_eq!(meta.expires_at, START + 5_000);
        assert!(!meta.consumed());
        assert!(!meta.expired);

        assert!(store.consume("meta").is_ok());
        clock.store(START + 5_000, Ordering::SeqCst);
        let meta = store.describe("meta").unwrap();
        assert!(meta.consumed());
        assert!(meta.expired);
    }

    #[test]
    fn test_reset() {
        let store = SecretStore::builder().build();
        store.create("a", 10).unwrap();
        store.create("b", 10).unwrap();
        store.consume("a").unwrap();

        store.reset();

        assert!(store.is_empty());
        assert_eq!(store.consume("b"), Err(SecretError::NotFound));
        assert!(store.create("a", 10).is_ok());
    }

    #[test]
    fn test_reset_waits_for_in_flight_create() {
        use std::sync::atomic::AtomicBool;
        use std::sync::{Mutex, mpsc};
        use std::time::Duration;

        let (entered_tx, entered_rx) = mpsc::channel::<()>();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let release_rx = Mutex::new(release_rx);
        let hold = Arc::new(AtomicBool::new(false));
        let hold_clock = Arc::clone(&hold);

        // The clock parks the next caller inside create until released
        let store = Arc::new(
            SecretStore::builder()
                .with_time_provider(move || {
                    if hold_clock.swap(false, Ordering::SeqCst) {
                        entered_tx.send(()).unwrap();
                        release_rx.lock().unwrap().recv().unwrap();
                    }
                    START
                })
                .build(),
        );

        hold.store(true, Ordering::SeqCst);
        let creator = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || store.create("in-flight", 10))
        };
        entered_rx.recv().unwrap();

        let resetter = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || store.reset())
        };
        std::thread::sleep(Duration::from_millis(50));
        assert!(
            !resetter.is_finished(),
            "Reset must wait for the in-flight create"
        );

        release_tx.send(()).unwrap();
        assert!(creator.join().unwrap().is_ok());
        resetter.join().unwrap();

        // The create completed before the clear, so nothing survives it
        assert!(store.is_empty());
        assert_eq!(store.consume("in-flight"), Err(SecretError::NotFound));
    }

    #[test]
    fn test_stats() {
        let (clock, provider) = manual_clock();
        let store = SecretStore::builder().with_time_provider(provider).build();

        store.create("live", 100).unwrap();
        store.create("consumed", 100).unwrap();
        store.consume("consumed").unwrap();
        store.create("expired", 1).unwrap();
        clock.store(START + 2_000, Ordering::SeqCst);

        let stats = store.stats();
        assert_eq!(
            stats,
            StoreStats {
                total_records: 3,
                live: 1,
                consumed: 1,
                expired: 1,
            }
        );
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_purge_dead_respects_retention() {
        let (clock, provider) = manual_clock();
        let store = SecretStore::builder().with_time_provider(provider).build();

        store.create("live", 100).unwrap();
        store.create("consumed", 100).unwrap();
        store.consume("consumed").unwrap();
        store.create("expired", 1).unwrap();

        // expired died at +1s, consumed died at +0s
        clock.store(START + 1_500, Ordering::SeqCst);
        assert_eq!(store.purge_dead(Duration::from_secs(1)), 1);
        assert_eq!(store.consume("consumed"), Err(SecretError::NotFound));
        assert_eq!(store.consume("expired"), Err(SecretError::Expired));

        clock.store(START + 2_000, Ordering::SeqCst);
        assert_eq!(store.purge_dead(Duration::from_secs(1)), 1);
        assert_eq!(store.consume("expired"), Err(SecretError::NotFound));

        // Live records survive any retention
        assert_eq!(store.purge_dead(Duration::ZERO), 0);
        assert_eq!(store.len(), 1);
        assert!(store.consume("live").is_ok());
    }

    #[test]
    fn test_lazy_cleanup_on_create() {
        let (clock, provider) = manual_clock();
        let config = SecretConfig {
            dead_record_retention: Some(Duration::from_secs(60)),
            ..SecretConfig::from(ConfigPreset::Production)
        };
        let store = SecretStore::builder()
            .with_config(config)
            .with_time_provider(provider)
            .with_hybrid_cleanup_thresholds(3, Duration::from_secs(3600))
            .build();

        store.create("old", 1).unwrap();
        clock.store(START + 120_000, Ordering::SeqCst);

        // Second create does not reach the count threshold
        store.create("new-1", 10).unwrap();
        assert_eq!(store.len(), 2);

        // Count threshold reached on the next create
        store.create("new-2", 10).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.create("old", 10).is_ok());
    }

    #[test]
    fn test_cleanup_strategy_ignored_without_retention() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = Arc::clone(&calls);
        let store = SecretStore::builder()
            .with_custom_cleanup_strategy(move || {
                calls_clone.fetch_add(1, Ordering::SeqCst);
                true
            })
            .build();

        store.create("a", 10).unwrap();
        store.consume("a").unwrap();
        store.create("b", 10).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_store_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SecretStore>();
    }

    #[test]
    fn test_concurrent_consume_single_winner() {
        let store = Arc::new(SecretStore::builder().build());
        let value = store.create("epsilon", 10).unwrap();

        let barrier = Arc::new(std::sync::Barrier::new(8));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    store.consume("epsilon")
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();

        assert_eq!(winners, vec![&value]);
        assert_eq!(
            results
                .iter()
                .filter(|r| **r == Err(SecretError::AlreadyConsumed))
                .count(),
            7
        );
    }
}
