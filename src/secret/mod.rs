// Core store components
mod config;
mod error;
mod generator;
mod record;
mod store;
mod store_builder;
mod time_utils;

// Optional eviction of dead records
pub mod cleanup;

pub use config::{ConfigPreset, SecretConfig};
pub use error::{ErrorBody, ErrorReason, SecretError};
#[cfg(feature = "default-generators")]
pub use generator::UuidSecretGenerator;
pub use generator::{DEFAULT_SECRET_BYTES, MIN_SECRET_BYTES, RandomSecretGenerator, SecretGenerator};
pub use record::SecretMeta;
pub use store::{SecretStore, StoreStats};
pub use store_builder::SecretStoreBuilder;
pub use time_utils::TimeProviderFn;

pub use cleanup::{
    BoxedCleanupStrategy, CleanupStrategy, CustomCleanupStrategy, HybridCleanupStrategy, Sweeper,
    SweeperHandle,
};
