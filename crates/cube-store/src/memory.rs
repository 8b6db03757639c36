//! Volatile in-process store.
//!
//! Records live in a `HashMap` and are gone when the process exits. There is
//! no locking: mutation goes through `&mut self`.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::record::Record;
use crate::store::Store;

/// In-memory store for one record type.
#[derive(Debug, Clone)]
pub struct MemoryStore<T> {
    db: HashMap<String, T>,
}

impl<T: Record> MemoryStore<T> {
    pub fn new() -> Self {
        Self { db: HashMap::new() }
    }
}

impl<T: Record> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Store<T> for MemoryStore<T> {
    fn put(&mut self, key: &str, value: T) -> StoreResult<()> {
        self.db.insert(key.to_string(), value);
        debug!(kind = T::KIND, %key, "record stored in memory");
        Ok(())
    }

    fn get(&self, key: &str) -> StoreResult<T> {
        self.db.get(key).cloned().ok_or_else(|| StoreError::NotFound {
            kind: T::KIND,
            key: key.to_string(),
        })
    }

    fn list(&self) -> StoreResult<Vec<T>> {
        Ok(self.db.values().cloned().collect())
    }

    fn count(&self) -> StoreResult<usize> {
        Ok(self.db.len())
    }
}
