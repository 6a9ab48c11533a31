use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types returned by [`SecretStore`](crate::SecretStore) operations.
///
/// Every variant is an expected, caller-correctable outcome rather than an
/// internal fault. The store never retries and never recovers silently: the
/// precise kind always reaches the caller, which decides how to present it.
///
/// # Error Categories
///
/// - **Creation**: `IdentifierUnavailable`
/// - **Consumption**: `NotFound`, `Expired`, `AlreadyConsumed`
///
/// # Example
///
/// ```rust
/// use onetime_secret::{SecretError, SecretStore};
///
/// let store = SecretStore::builder().build();
/// store.create("alpha", 10)?;
/// store.consume("alpha")?;
///
/// match store.consume("alpha") {
///     Ok(value) => println!("Got {value}"),
///     Err(SecretError::AlreadyConsumed) => println!("Already retrieved"),
///     Err(SecretError::Expired) => println!("Too late"),
///     Err(e) => println!("Other error: {e}"),
/// }
/// # Ok::<(), SecretError>(())
/// ```
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretError {
    /// An entry for the identifier already exists.
    ///
    /// Identifiers are single-use for the lifetime of the store: a live,
    /// consumed or expired record all keep the identifier occupied. Only
    /// `reset` or an opted-in dead-record purge frees it.
    #[error("The provided ID is currently unavailable (in use or recently used).")]
    IdentifierUnavailable,

    /// No record was ever created under the identifier.
    #[error("No secret found with the provided ID.")]
    NotFound,

    /// The record exists but its time-to-live has elapsed.
    ///
    /// Expiry wins over consumption: a record that was consumed and has since
    /// expired reports `Expired`.
    #[error("The secret is no longer available.")]
    Expired,

    /// The record is still within its time-to-live but was already retrieved.
    #[error("This secret has already been retrieved.")]
    AlreadyConsumed,
}

/// Machine-readable error categories for presenting failures to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorReason {
    /// Malformed request input. Produced by the request layer, never by the store.
    InvalidInput,
    IdUnavailable,
    NotFound,
    AlreadyConsumed,
    Expired,
}

/// A serializable `{ message, reason }` pair describing a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable description
    pub message: String,
    /// Machine-readable category
    pub reason: ErrorReason,
}

impl SecretError {
    /// Returns the machine-readable category for this error.
    pub fn reason(&self) -> ErrorReason {
        match self {
            SecretError::IdentifierUnavailable => ErrorReason::IdUnavailable,
            SecretError::NotFound => ErrorReason::NotFound,
            SecretError::Expired => ErrorReason::Expired,
            SecretError::AlreadyConsumed => ErrorReason::AlreadyConsumed,
        }
    }

    /// Builds the serializable body for this error.
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            message: self.to_string(),
            reason: self.reason(),
        }
    }
}

impl From<SecretError> for ErrorBody {
    fn from(err: SecretError) -> Self {
        err.to_body()
    }
}
