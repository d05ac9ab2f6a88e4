//! Durable key-value storage port.
//!
//! The whole session history lives under one fixed key as a single JSON
//! document, so the contract is deliberately tiny: read a value, replace a
//! value. No partial updates.

use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;

/// Errors raised by a storage backend.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Other(String),
}

/// A byte store addressed by string keys.
///
/// Calls are synchronous: the store flushes after every mutation and must
/// not return before the value is durable.
pub trait KeyValueStore: Send + Sync {
    /// Read the value under `key`, or `None` if nothing was ever written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Volatile implementation used in tests.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `value` already stored under `key`.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.into(), value.into());
        }
        store
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Other(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Other(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
