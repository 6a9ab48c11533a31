//! # Onetime Secret
//!
//! An in-memory store for one-time secret exchange.
//!
//! A producer claims an identifier with a time-to-live and receives a freshly
//! generated secret value. Exactly one later retrieval of that identifier
//! returns the value; every other attempt fails with a precise reason.
//!
//! ## Features
//!
//! - **Atomic creation**: two writers can never both claim the same identifier
//! - **Atomic single consumption**: among racing readers exactly one gets the value
//! - **Lazy expiry**: TTLs are checked on access, no timer is required
//! - **Single-use identifiers**: consumed and expired records keep their identifier occupied
//! - **Per-key locking**: unrelated identifiers never contend on a global lock
//! - **Optional eviction**: opt-in purge of long-dead records, lazily or from a background sweeper
//!
//! ## Quick Start
//!
//! ```rust
//! use onetime_secret::{SecretError, SecretStore};
//!
//! let store = SecretStore::builder().build();
//!
//! // The producer claims an identifier for 10 seconds
//! let value = store.create("alpha", 10)?;
//!
//! // The consumer retrieves it exactly once
//! assert_eq!(store.consume("alpha")?, value);
//! assert_eq!(store.consume("alpha"), Err(SecretError::AlreadyConsumed));
//!
//! // Unknown identifiers are distinguishable from used ones
//! assert_eq!(store.consume("gamma"), Err(SecretError::NotFound));
//! # Ok::<(), SecretError>(())
//! ```
//!
//! ## Sharing Across Threads and Tasks
//!
//! `SecretStore` is `Send + Sync` and every operation takes `&self`; wrap it
//! in an `Arc` to share it. Operations never block on I/O and never yield.
//!
//! ```rust
//! use onetime_secret::SecretStore;
//! use std::sync::Arc;
//!
//! let store = Arc::new(SecretStore::builder().build());
//! store.create("epsilon", 10).unwrap();
//!
//! let handles: Vec<_> = (0..5)
//!     .map(|_| {
//!         let store = Arc::clone(&store);
//!         std::thread::spawn(move || store.consume("epsilon").is_ok())
//!     })
//!     .collect();
//!
//! let successes = handles
//!     .into_iter()
//!     .map(|h| h.join().unwrap())
//!     .filter(|consumed| *consumed)
//!     .count();
//! assert_eq!(successes, 1);
//! ```
//!
//! ## Configuration
//!
//! See [`SecretConfig`] for the environment variables read by
//! `SecretConfig::default()` and [`ConfigPreset`] for predefined settings.
//!
//! ## Architecture
//!
//! - **[`SecretStore`]**: the stateful core with `create`, `consume` and `reset`
//! - **[`SecretGenerator`]**: produces the random value attached to each secret
//! - **[`SecretError`]**: the four expected failure kinds and their client-facing reasons
//! - **[`cleanup`](secret::cleanup)**: optional bounded-growth eviction

pub mod secret;

// Re-export commonly used types
pub use secret::{
    BoxedCleanupStrategy, CleanupStrategy, ConfigPreset, CustomCleanupStrategy, ErrorBody,
    ErrorReason, HybridCleanupStrategy, RandomSecretGenerator, SecretConfig, SecretError,
    SecretGenerator, SecretMeta, SecretStore, SecretStoreBuilder, StoreStats, Sweeper,
    SweeperHandle,
};

#[cfg(feature = "default-generators")]
pub use secret::UuidSecretGenerator;
