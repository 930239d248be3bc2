use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::warn;

use super::backend::Storage;

/// Infallible wrapper over a `Storage` backend.
///
/// Strings are stored verbatim so opaque values such as tokens are never
/// quote-wrapped; everything else is JSON-encoded. Reads try a JSON decode
/// first and fall back to the raw string.
pub struct PersistedStore<S: Storage> {
    backend: S,
}

impl<S: Storage> PersistedStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Store `value` under `key`. Failures are logged and dropped.
    pub fn set<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        let encoded = match serde_json::to_value(value) {
            Ok(Value::String(s)) => s,
            Ok(other) => other.to_string(),
            Err(e) => {
                warn!(key, error = %e, "Failed to encode value for storage");
                return;
            }
        };
        if let Err(e) = self.backend.set_item(key, &encoded) {
            warn!(key, error = %e, "Failed to write to storage");
        }
    }

    /// Read `key`, decoding JSON when possible. `None` when unset or unreadable.
    pub fn get(&self, key: &str) -> Option<Value> {
        let raw = self.raw(key)?;
        Some(serde_json::from_str(&raw).unwrap_or(Value::String(raw)))
    }

    /// Read `key` exactly as stored, without a JSON decode.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.raw(key)
    }

    /// Read and deserialize `key`. A value that does not fit `T` is logged
    /// and reported as absent.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(key, error = %e, "Stored value has unexpected shape");
                None
            }
        }
    }

    pub fn remove(&mut self, key: &str) {
        if let Err(e) = self.backend.remove_item(key) {
            warn!(key, error = %e, "Failed to remove from storage");
        }
    }

    /// Remove a group of keys in one backend call.
    pub fn remove_all(&mut self, keys: &[&str]) {
        if let Err(e) = self.backend.remove_items(keys) {
            warn!(?keys, error = %e, "Failed to remove entries from storage");
        }
    }

    pub fn clear(&mut self) {
        if let Err(e) = self.backend.clear() {
            warn!(error = %e, "Failed to clear storage");
        }
    }

    fn raw(&self, key: &str) -> Option<String> {
        match self.backend.get_item(key) {
            Ok(Some(raw)) if !raw.is_empty() => Some(raw),
            Ok(_) => None,
            Err(e) => {
                warn!(key, error = %e, "Failed to read from storage");
                None
            }
        }
    }
}
