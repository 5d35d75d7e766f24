//! Key-value persistence for weightlog.
//!
//! The ledger never talks to a database directly. It receives a
//! [`KeyValueStore`] and reads or rewrites whole values under fixed keys.
//! [`MemoryStore`] serves tests and dry runs; [`SqliteStore`] keeps the
//! values in a `SQLite` file for the CLI.

pub mod migrations;
pub mod schema;
mod sqlite;

use std::collections::HashMap;
use std::fmt;

use crate::error::Result;

pub use sqlite::SqliteStore;

/// A synchronous string key-value store.
///
/// Writes replace the whole value. There is no partial update and no
/// transaction spanning several keys.
pub trait KeyValueStore: fmt::Debug {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the write.
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store rejects the delete.
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// In-memory store backed by a `HashMap`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether `key` currently holds a value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of keys held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// A store whose every operation fails, like a browser store over quota.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FailingStore;

#[cfg(test)]
impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(crate::error::Error::storage("localStorage error"))
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
        Err(crate::error::Error::storage("localStorage error"))
    }

    fn remove(&mut self, _key: &str) -> Result<()> {
        Err(crate::error::Error::storage("localStorage error"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_get_missing() {
        let store = MemoryStore::new();
        assert_eq!(store.get("userWeights").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_memory_store_set_and_get() {
        let mut store = MemoryStore::new();
        store.set("userName", "Juan").unwrap();

        assert_eq!(store.get("userName").unwrap().as_deref(), Some("Juan"));
        assert!(store.contains_key("userName"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_memory_store_set_overwrites() {
        let mut store = MemoryStore::new();
        store.set("userName", "Juan").unwrap();
        store.set("userName", "Ana").unwrap();

        assert_eq!(store.get("userName").unwrap().as_deref(), Some("Ana"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_memory_store_remove() {
        let mut store = MemoryStore::new();
        store.set("userWeights", "[]").unwrap();
        store.remove("userWeights").unwrap();

        assert!(!store.contains_key("userWeights"));
        // Removing again is fine
        store.remove("userWeights").unwrap();
    }

    #[test]
    fn test_boxed_store_delegates() {
        let mut store: Box<dyn KeyValueStore> = Box::new(MemoryStore::new());
        store.set("userName", "Juan").unwrap();
        assert_eq!(store.get("userName").unwrap().as_deref(), Some("Juan"));
        store.remove("userName").unwrap();
        assert_eq!(store.get("userName").unwrap(), None);
    }
}
