use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::{KeyValueStore, StorageError};

/// Typed view over a [`KeyValueStore`] that stores every value as JSON text.
///
/// Reads never fail: an absent, unreadable, or malformed entry yields the
/// caller's default so corrupt storage cannot take the caller down.
#[derive(Debug, Clone)]
pub struct JsonStore<S: KeyValueStore> {
    inner: S,
}

impl<S: KeyValueStore> JsonStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Access the underlying raw store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Load `key` as `T`, falling back to `default` when it is absent or
    /// cannot be decoded.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.inner.get(key) {
            Ok(raw) => raw,
            Err(StorageError::NotFound { .. }) => {
                debug!(key, "no stored value, using default");
                return default;
            }
            Err(err) => {
                warn!(key, %err, "failed to read stored value, using default");
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, %err, "malformed stored value, using default");
                default
            }
        }
    }

    /// Serialize `value` and write it under `key`, replacing any prior value.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value).map_err(|err| StorageError::Storage {
            reason: format!("encode failed: {err}"),
        })?;
        self.inner.set(key, &json)
    }
}
