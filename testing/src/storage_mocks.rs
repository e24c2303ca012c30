//! In-memory storage for persistence tests
//!
//! [`InMemoryStorage`] keeps records in a `HashMap` and can be told to fail
//! loads or saves, so tests can check that persistence errors are logged and
//! swallowed instead of surfacing to the user.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use taskdeck_core::persist::{PersistError, Result, Storage};
use taskdeck_core::serde_json::{self, Value};

/// In-memory storage backend for fast, deterministic testing.
///
/// Clones share the same records and failure switches.
///
/// # Example
///
/// ```
/// use taskdeck_testing::InMemoryStorage;
/// use taskdeck_core::persist::Storage;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let storage = InMemoryStorage::new();
///
/// storage.save("counter", br#"{"value":3}"#).await?;
/// assert!(storage.load("counter").await?.is_some());
///
/// storage.fail_saves(true);
/// assert!(storage.save("counter", b"{}").await.is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryStorage {
    data: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    fail_loads: Arc<AtomicBool>,
    fail_saves: Arc<AtomicBool>,
    saves: Arc<AtomicUsize>,
}

impl InMemoryStorage {
    /// Create a new empty storage
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `load` fail (or succeed again)
    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `save` fail (or succeed again)
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Seed a raw record, bypassing failure injection
    pub fn insert(&self, key: &str, data: impl Into<Vec<u8>>) {
        self.data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), data.into());
    }

    /// Raw bytes stored under `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Record under `key` parsed as JSON (`None` if absent or not JSON)
    #[must_use]
    pub fn get_json(&self, key: &str) -> Option<Value> {
        self.get(key)
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
    }

    /// Check if a key exists in the storage
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }
}

impl Storage for InMemoryStorage {
    async fn load(&self, key: &str) -> Result<Option<Vec<u8>>> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(PersistError::Storage(format!("injected load failure for '{key}'")));
        }
        Ok(self.get(key))
    }

    async fn save(&self, key: &str, data: &[u8]) -> Result<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(PersistError::Storage(format!("injected save failure for '{key}'")));
        }
        self.insert(key, data);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.data
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can unwrap
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_load_remove() {
        let storage = InMemoryStorage::new();
        assert!(storage.load("todo").await.unwrap().is_none());

        storage.save("todo", br#"{"todos":[]}"#).await.unwrap();
        assert_eq!(storage.get_json("todo"), Some(serde_json::json!({ "todos": [] })));
        assert_eq!(storage.save_count(), 1);

        storage.remove("todo").await.unwrap();
        assert!(!storage.contains_key("todo"));
    }

    #[tokio::test]
    async fn injected_failures_leave_data_untouched() {
        let storage = InMemoryStorage::new();
        storage.insert("counter", r#"{"value":1}"#);

        storage.fail_saves(true);
        storage.fail_loads(true);
        assert!(storage.save("counter", b"{}").await.is_err());
        assert!(storage.load("counter").await.is_err());

        storage.fail_loads(false);
        let bytes = storage.load("counter").await.unwrap();
        assert_eq!(bytes.as_deref(), Some(br#"{"value":1}"#.as_slice()));
        assert_eq!(storage.save_count(), 0);
    }
}
