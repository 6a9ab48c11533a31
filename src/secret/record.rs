use serde::{Deserialize, Serialize};

use super::error::SecretError;

/// A stored secret together with its lifecycle metadata.
///
/// Records are owned exclusively by [`SecretStore`](crate::SecretStore) and
/// never leave it. All timestamps are Unix milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SecretRecord {
    id: String,
    value: String,
    created_at: i64,
    expires_at: i64,
    consumed_at: Option<i64>,
}

impl SecretRecord {
    pub(crate) fn new(id: String, value: String, created_at: i64, expires_at: i64) -> Self {
        Self {
            id,
            value,
            created_at,
            expires_at,
            consumed_at: None,
        }
    }

    pub(crate) fn consumed(&self) -> bool {
        self.consumed_at.is_some()
    }

    /// A record is expired once `now` reaches `expires_at`.
    pub(crate) fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    /// The instant the record stopped being retrievable, or `None` while it
    /// is still live at `now`.
    pub(crate) fn dead_since(&self, now: i64) -> Option<i64> {
        match self.consumed_at {
            Some(consumed_at) => Some(consumed_at.min(self.expires_at)),
            None if self.is_expired_at(now) => Some(self.expires_at),
            None => None,
        }
    }

    /// Performs the check-and-set of a single retrieval.
    ///
    /// Must be called while the caller holds exclusive access to the record.
    /// Expiry is checked before consumption.
    pub(crate) fn try_consume(&mut self, now: i64) -> Result<String, SecretError> {
        if self.is_expired_at(now) {
            return Err(SecretError::Expired);
        }
        if self.consumed_at.is_some() {
            return Err(SecretError::AlreadyConsumed);
        }
        self.consumed_at = Some(now);
        Ok(self.value.clone())
    }
}

/// Metadata about a stored secret. Never includes the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretMeta {
    /// The caller-chosen identifier
    pub id: String,
    /// Unix milliseconds when the secret was created
    pub created_at: i64,
    /// Unix milliseconds from which the secret can no longer be consumed
    pub expires_at: i64,
    /// Unix milliseconds when the secret was consumed, if it was
    pub consumed_at: Option<i64>,
    /// Whether the secret had expired when the metadata was read
    pub expired: bool,
}

impl SecretMeta {
    pub(crate) fn from_record(record: &SecretRecord, now: i64) -> Self {
        Self {
            id: record.id.clone(),
            created_at: record.created_at,
            expires_at: record.expires_at,
            consumed_at: record.consumed_at,
            expired: record.is_expired_at(now),
        }
    }

    /// Whether the single permitted retrieval has happened.
    pub fn consumed(&self) -> bool {
        self.consumed_at.is_some()
    }
}
