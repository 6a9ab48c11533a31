use std::time::Duration;

use super::generator::{DEFAULT_SECRET_BYTES, MIN_SECRET_BYTES};

/// Predefined configuration presets for common use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigPreset {
    /// Production-ready configuration.
    ///
    /// - Secret size: 32 bytes
    /// - No dead-record eviction (identifiers are never reused)
    /// - Sweep interval: 1 minute (unused without retention)
    Production,

    /// Development-friendly configuration.
    ///
    /// Dead records are evicted after 10 minutes so identifiers can be
    /// reused while iterating locally:
    /// - Secret size: 32 bytes
    /// - Retention: 10 minutes
    /// - Sweep interval: 1 minute
    Development,

    /// Configuration for test suites.
    ///
    /// Smaller secrets, otherwise identical to `Production`:
    /// - Secret size: 16 bytes
    /// - No dead-record eviction
    Testing,

    /// Load configuration from environment variables.
    ///
    /// Reads configuration from:
    /// - `ONETIME_SECRET_BYTES`: random bytes per secret (default: 32)
    /// - `ONETIME_SECRET_INITIAL_CAPACITY`: pre-allocated records (default: 0)
    /// - `ONETIME_SECRET_RETENTION_SECS`: dead-record retention (default: unset)
    /// - `ONETIME_SECRET_SWEEP_INTERVAL_SECS`: sweep period (default: 60)
    FromEnv,
}

/// Configuration for a [`SecretStore`](crate::SecretStore).
///
/// # Environment Variables
///
/// `SecretConfig::default()` reads:
/// - `ONETIME_SECRET_BYTES`: random bytes per secret (default: 32)
/// - `ONETIME_SECRET_INITIAL_CAPACITY`: pre-allocated records (default: 0)
/// - `ONETIME_SECRET_RETENTION_SECS`: dead-record retention (default: unset)
/// - `ONETIME_SECRET_SWEEP_INTERVAL_SECS`: sweep period (default: 60)
///
/// Unparseable values fall back to the defaults.
///
/// # Example
///
/// ```rust
/// use onetime_secret::SecretConfig;
/// use std::time::Duration;
///
/// let config = SecretConfig {
///     secret_bytes: 32,
///     initial_capacity: 1024,
///     dead_record_retention: Some(Duration::from_secs(3600)),
///     sweep_interval: Duration::from_secs(300),
/// };
/// assert!(config.validate().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretConfig {
    /// Random bytes behind each generated secret
    pub secret_bytes: usize,
    /// Number of records to pre-allocate room for
    pub initial_capacity: usize,
    /// How long a consumed or expired record is kept before it may be evicted.
    ///
    /// `None` disables eviction entirely, so identifiers are never reused.
    pub dead_record_retention: Option<Duration>,
    /// Period of the background sweeper. Zero disables it.
    pub sweep_interval: Duration,
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

impl Default for SecretConfig {
    fn default() -> Self {
        Self {
            secret_bytes: env_parse("ONETIME_SECRET_BYTES").unwrap_or(DEFAULT_SECRET_BYTES),
            initial_capacity: env_parse("ONETIME_SECRET_INITIAL_CAPACITY").unwrap_or(0),
            dead_record_retention: env_parse("ONETIME_SECRET_RETENTION_SECS")
                .map(Duration::from_secs),
            sweep_interval: Duration::from_secs(
                env_parse("ONETIME_SECRET_SWEEP_INTERVAL_SECS").unwrap_or(60),
            ),
        }
    }
}

impl SecretConfig {
    /// Validates the configuration and returns any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.secret_bytes < MIN_SECRET_BYTES {
            warnings.push(format!(
                "Secret size below {MIN_SECRET_BYTES} bytes will be raised to {MIN_SECRET_BYTES}"
            ));
        }

        if let Some(retention) = self.dead_record_retention {
            if retention.as_secs() < 60 {
                warnings.push(
                    "Very short retention (< 1 minute) lets identifiers be reused quickly"
                        .to_string(),
                );
            }
            if self.sweep_interval.is_zero() {
                warnings.push("Sweep interval of zero disables the background sweeper".to_string());
            }
        } else if self.sweep_interval != Duration::from_secs(60) {
            warnings.push(
                "Sweep interval has no effect without a dead record retention".to_string(),
            );
        }

        warnings
    }

    /// Returns a summary of the current configuration.
    pub fn summary(&self) -> String {
        let retention = match self.dead_record_retention {
            Some(retention) => format!("{}s", retention.as_secs()),
            None => "disabled".to_string(),
        };
        format!(
            "SecretConfig {{ Secret Bytes: {}, Initial Capacity: {}, Retention: {}, Sweep Interval: {}s }}",
            self.secret_bytes,
            self.initial_capacity,
            retention,
            self.sweep_interval.as_secs(),
        )
    }
}

impl From<ConfigPreset> for SecretConfig {
    fn from(preset: ConfigPreset) -> Self {
        match preset {
            ConfigPreset::Production => Self {
                secret_bytes: DEFAULT_SECRET_BYTES,
                initial_capacity: 0,
                dead_record_retention: None,
                sweep_interval: Duration::from_secs(60),
            },
            ConfigPreset::Development => Self {
                secret_bytes: DEFAULT_SECRET_BYTES,
                initial_capacity: 0,
                dead_record_retention: Some(Duration::from_secs(600)),
                sweep_interval: Duration::from_secs(60),
            },
            ConfigPreset::Testing => Self {
                secret_bytes: MIN_SECRET_BYTES,
                initial_capacity: 0,
                dead_record_retention: None,
                sweep_interval: Duration::from_secs(60),
            },
            ConfigPreset::FromEnv => Self::default(),
        }
    }
}
