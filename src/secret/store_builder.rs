use std::time::Duration;

use super::cleanup::{BoxedCleanupStrategy, CustomCleanupStrategy, HybridCleanupStrategy};
use super::config::{ConfigPreset, SecretConfig};
use super::generator::{RandomSecretGenerator, SecretGenerator};
use super::store::SecretStore;
use super::time_utils::{TimeProviderFn, current_timestamp_millis};

/// A builder for creating a [`SecretStore`].
///
/// Defaults to the [`ConfigPreset::Production`] configuration, a
/// [`RandomSecretGenerator`] sized from that configuration and the system
/// clock.
#[must_use = "The builder does nothing unless `.build()` is called."]
pub struct SecretStoreBuilder {
    config: SecretConfig,
    capacity: Option<usize>,
    generator: Option<Box<dyn SecretGenerator>>,
    time_provider: Option<TimeProviderFn>,
    cleanup_strategy: Option<BoxedCleanupStrategy>,
}

impl SecretStoreBuilder {
    pub(crate) fn new() -> Self {
        Self {
            config: SecretConfig::from(ConfigPreset::Production),
            capacity: None,
            generator: None,
            time_provider: None,
            // Hybrid by default, but only installed when a retention is set
            cleanup_strategy: None,
        }
    }

    /// Replaces the whole configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use onetime_secret::{ConfigPreset, SecretStore};
    ///
    /// let store = SecretStore::builder()
    ///     .with_config(ConfigPreset::Development.into())
    ///     .build();
    /// assert!(store.config().dead_record_retention.is_some());
    /// ```
    pub fn with_config(mut self, config: SecretConfig) -> Self {
        self.config = config;
        self
    }

    /// Pre-allocates room for `capacity` records, overriding the
    /// configuration's `initial_capacity`.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Enables eviction of records dead for at least `retention`.
    ///
    /// Evicted identifiers can be created again.
    pub fn with_dead_record_retention(mut self, retention: Duration) -> Self {
        self.config.dead_record_retention = Some(retention);
        self
    }

    /// Sets a custom value generator.
    pub fn with_generator<G>(mut self, generator: G) -> Self
    where
        G: SecretGenerator + 'static,
    {
        self.generator = Some(Box::new(generator));
        self
    }

    /// Sets a custom clock returning Unix milliseconds.
    ///
    /// # Example
    ///
    /// ```rust
    /// use onetime_secret::{SecretError, SecretStore};
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicI64, Ordering};
    ///
    /// let clock = Arc::new(AtomicI64::new(0));
    /// let reader = Arc::clone(&clock);
    /// let store = SecretStore::builder()
    ///     .with_time_provider(move || reader.load(Ordering::SeqCst))
    ///     .build();
    ///
    /// store.create("beta", 1)?;
    /// clock.store(1_500, Ordering::SeqCst);
    /// assert_eq!(store.consume("beta"), Err(SecretError::Expired));
    /// # Ok::<(), SecretError>(())
    /// ```
    pub fn with_time_provider<F>(mut self, provider: F) -> Self
    where
        F: Fn() -> i64 + Send + Sync + 'static,
    {
        self.time_provider = Some(Box::new(provider));
        self
    }

    /// Configures lazy cleanup with custom hybrid thresholds.
    ///
    /// Only takes effect when a dead-record retention is configured. The
    /// default thresholds are 100 creates or 5 minutes.
    pub fn with_hybrid_cleanup_thresholds(
        mut self,
        count_threshold: u32,
        time_threshold: Duration,
    ) -> Self {
        let strategy = HybridCleanupStrategy::new(count_threshold, time_threshold);
        self.cleanup_strategy = Some(Box::new(strategy));
        self
    }

    /// Configures lazy cleanup with a closure consulted after each create.
    ///
    /// Only takes effect when a dead-record retention is configured.
    pub fn with_custom_cleanup_strategy<F>(mut self, strategy_fn: F) -> Self
    where
        F: Fn() -> bool + Send + Sync + 'static,
    {
        self.cleanup_strategy = Some(Box::new(CustomCleanupStrategy::new(strategy_fn)));
        self
    }

    /// Uses an already boxed cleanup strategy.
    pub fn with_cleanup_strategy(mut self, strategy: BoxedCleanupStrategy) -> Self {
        self.cleanup_strategy = Some(strategy);
        self
    }

    /// Builds the `SecretStore`.
    ///
    /// Configuration warnings are logged, never fatal.
    pub fn build(self) -> SecretStore {
        for warning in self.config.validate() {
            tracing::warn!("{}", warning);
        }

        let cleanup_strategy = match self.config.dead_record_retention {
            Some(_) => Some(
                self.cleanup_strategy
                    .unwrap_or_else(|| Box::new(HybridCleanupStrategy::default())),
            ),
            None => {
                if self.cleanup_strategy.is_some() {
                    tracing::warn!("Cleanup strategy ignored: no dead record retention configured");
                }
                None
            }
        };

        let generator = self
            .generator
            .unwrap_or_else(|| Box::new(RandomSecretGenerator::new(self.config.secret_bytes)));
        let time_provider = self
            .time_provider
            .unwrap_or_else(|| Box::new(current_timestamp_millis));
        let capacity = self.capacity.unwrap_or(self.config.initial_capacity);

        tracing::debug!(config = %self.config.summary(), "Secret store built");

        SecretStore::new(
            self.config,
            capacity,
            generator,
            time_provider,
            cleanup_strategy,
        )
    }
}
