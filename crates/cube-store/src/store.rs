//! The keyed persistence contract shared by every backend.

use crate::error::StoreResult;
use crate::record::Record;

/// Keyed put/get/list/count over one record type.
///
/// A store is bound to its record type at construction, so a task can never
/// be written into an event store. `put` takes `&mut self`: a store has a
/// single writer at a time, and callers that share one across threads wrap
/// it in their own lock.
pub trait Store<T: Record>: Send {
    /// Write `value` under `key`, replacing any existing record.
    fn put(&mut self, key: &str, value: T) -> StoreResult<()>;

    /// Fetch the record stored under `key`.
    ///
    /// Returns [`StoreError::NotFound`](crate::StoreError::NotFound) when
    /// the key is absent.
    fn get(&self, key: &str) -> StoreResult<T>;

    /// Every record in this store. Callers must not depend on the order.
    fn list(&self) -> StoreResult<Vec<T>>;

    /// Number of records in this store.
    fn count(&self) -> StoreResult<usize>;
}
