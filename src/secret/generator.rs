//! Value generators for newly created secrets.

use rand::RngCore;

/// Default number of random bytes behind each generated secret.
pub const DEFAULT_SECRET_BYTES: usize = 32;

/// Smallest number of random bytes a [`RandomSecretGenerator`] will use.
pub const MIN_SECRET_BYTES: usize = 16;

/// Produces values suitable for use as one-time secrets.
///
/// Implementations must draw from a source with enough entropy that two
/// calls never return the same string in practice. Generation cannot fail.
///
/// Any `Fn() -> String + Send + Sync` closure is a generator, which makes it
/// easy to plug in a deterministic sequence for tests:
///
/// ```rust
/// use onetime_secret::SecretStore;
/// use std::sync::atomic::{AtomicU64, Ordering};
///
/// let counter = AtomicU64::new(0);
/// let store = SecretStore::builder()
///     .with_generator(move || format!("secret-{}", counter.fetch_add(1, Ordering::SeqCst)))
///     .build();
///
/// assert_eq!(store.create("a", 10)?, "secret-0");
/// # Ok::<(), onetime_secret::SecretError>(())
/// ```
pub trait SecretGenerator: Send + Sync {
    /// Generates a fresh secret value.
    fn generate(&self) -> String;
}

impl<F> SecretGenerator for F
where
    F: Fn() -> String + Send + Sync,
{
    fn generate(&self) -> String {
        self()
    }
}

/// Generates hex-encoded random bytes from the thread-local CSPRNG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomSecretGenerator {
    bytes: usize,
}

impl RandomSecretGenerator {
    /// Creates a generator producing `bytes` random bytes per secret.
    ///
    /// Values below [`MIN_SECRET_BYTES`] are raised to it.
    pub fn new(bytes: usize) -> Self {
        Self {
            bytes: bytes.max(MIN_SECRET_BYTES),
        }
    }

    /// Number of random bytes per secret.
    pub fn bytes(&self) -> usize {
        self.bytes
    }
}

impl Default for RandomSecretGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_SECRET_BYTES)
    }
}

impl SecretGenerator for RandomSecretGenerator {
    fn generate(&self) -> String {
        let mut buf = vec![0u8; self.bytes];
        rand::thread_rng().fill_bytes(&mut buf);
        hex::encode(buf)
    }
}

/// Generates random (v4) UUID strings.
#[cfg(feature = "default-generators")]
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidSecretGenerator;

#[cfg(feature = "default-generators")]
impl SecretGenerator for UuidSecretGenerator {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}
