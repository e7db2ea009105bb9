//! Key-value storage abstraction.
//!
//! Callers only see [`KeyValueStore`]; [`MemoryStore`] is the in-process
//! backend and holds nothing across restarts.

use dashmap::DashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("conflict: {0}")]
    Conflict(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub trait KeyValueStore<V>: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<V>>;

    /// Insert or replace the value stored under `key`.
    fn set(&self, key: String, value: V) -> StoreResult<()>;

    /// Every value matching `predicate`, in no particular order.
    fn scan(&self, predicate: &dyn Fn(&V) -> bool) -> StoreResult<Vec<V>>;

    fn len(&self) -> StoreResult<usize>;

    fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

/// Concurrent in-memory backend.
pub struct MemoryStore<V> {
    entries: DashMap<String, V>,
}

impl<V> MemoryStore<V> {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> KeyValueStore<V> for MemoryStore<V>
where
    V: Clone + Send + Sync,
{
    fn get(&self, key: &str) -> StoreResult<Option<V>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn set(&self, key: String, value: V) -> StoreResult<()> {
        self.entries.insert(key, value);
        Ok(())
    }

    fn scan(&self, predicate: &dyn Fn(&V) -> bool) -> StoreResult<Vec<V>> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| predicate(entry.value()))
            .map(|entry| entry.value().clone())
            .collect())
    }

    fn len(&self) -> StoreResult<usize> {
        Ok(self.entries.len())
    }
}
