//! Durable store backed by redb.
//!
//! An [`Engine`] owns one database file. Any number of [`DurableStore`]s can
//! be opened on it, each scoped to a bucket. Every store call runs in its own
//! redb transaction: writes commit individually, and `list`/`count` read a
//! consistent snapshot. Nothing spans two calls, so a task write and the
//! event write that follows it are two independent commits.

use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::record::Record;
use crate::store::Store;
use crate::tables::{BUCKETS, RECORDS, TABLE_NAMES};

/// Convert any `Display` error into a `StoreError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StoreError::$variant(e.to_string())
    };
}

// ── Engine ────────────────────────────────────────────────────────

/// Handle to one redb database file shared by several buckets.
///
/// Cloning is cheap. The file is released when the last engine or store
/// referencing it is closed or dropped.
#[derive(Clone)]
pub struct Engine {
    db: Arc<Database>,
}

impl Engine {
    /// Open (or create) the database file at `path`.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let engine = Database::create(path)
            .map_err(map_err!(Open))
            .and_then(Self::with_tables)?;
        info!(?path, tables = ?TABLE_NAMES, "cube database opened");
        Ok(engine)
    }

    /// Create an ephemeral in-memory engine (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let engine = Database::builder()
            .create_with_backend(redb::backends::InMemoryBackend::new())
            .map_err(map_err!(Open))
            .and_then(Self::with_tables)?;
        debug!(tables = ?TABLE_NAMES, "in-memory cube database opened");
        Ok(engine)
    }

    /// Wrap `db`, creating the record and bucket tables on first use.
    fn with_tables(db: Database) -> StoreResult<Self> {
        let txn = db.begin_write().map_err(map_err!(Transaction))?;
        txn.open_table(RECORDS).map_err(map_err!(Table))?;
        txn.open_table(BUCKETS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(Self { db: Arc::new(db) })
    }

    /// Open a store for `T` records in `bucket`.
    ///
    /// The first open binds the bucket to `T::KIND`. Opening it again for a
    /// different record type fails with [`StoreError::TypeMismatch`].
    pub fn store<T: Record>(&self, bucket: &str) -> StoreResult<DurableStore<T>> {
        if bucket.is_empty() {
            return Err(StoreError::InvalidBucket(bucket.to_string()));
        }
        self.bind_bucket(bucket, T::KIND)?;
        debug!(%bucket, kind = T::KIND, "durable store opened");
        Ok(DurableStore {
            engine: self.clone(),
            bucket: bucket.to_string(),
            _record: PhantomData,
        })
    }

    fn bind_bucket(&self, bucket: &str, kind: &'static str) -> StoreResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(BUCKETS).map_err(map_err!(Table))?;
            let bound = table
                .get(bucket)
                .map_err(map_err!(Read))?
                .map(|guard| guard.value().to_string());
            match bound {
                Some(found) if found != kind => {
                    return Err(StoreError::TypeMismatch {
                        bucket: bucket.to_string(),
                        expected: kind,
                        found,
                    });
                }
                Some(_) => {}
                None => {
                    table.insert(bucket, kind).map_err(map_err!(Write))?;
                }
            }
        }
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    /// Drop this handle. Stores opened from it keep the file open.
    pub fn close(self) {
        let released = Arc::strong_count(&self.db) == 1;
        debug!(released, "durable engine handle closed");
    }
}

// ── DurableStore ──────────────────────────────────────────────────

/// A bucket-scoped store of `T` records on an [`Engine`].
pub struct DurableStore<T> {
    engine: Engine,
    bucket: String,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> DurableStore<T> {
    /// Open a store with its own database file.
    pub fn open(path: &Path, bucket: &str) -> StoreResult<Self> {
        Engine::open(path)?.store(bucket)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Release this store's handle on the engine.
    ///
    /// Consumes the store, so it cannot be used afterwards. The database file
    /// is closed once no other store or engine handle shares it.
    pub fn close(self) {
        let released = Arc::strong_count(&self.engine.db) == 1;
        debug!(bucket = %self.bucket, released, "durable store closed");
    }

    fn decode(bytes: &[u8]) -> StoreResult<T> {
        serde_json::from_slice(bytes).map_err(map_err!(Deserialize))
    }
}

impl<T: Record> Store<T> for DurableStore<T> {
    fn put(&mut self, key: &str, value: T) -> StoreResult<()> {
        let buf = serde_json::to_vec(&value).map_err(map_err!(Serialize))?;
        let txn = self.engine.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(RECORDS).map_err(map_err!(Table))?;
            table
                .insert((self.bucket.as_str(), key), buf.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(bucket = %self.bucket, %key, "record stored");
        Ok(())
    }

    fn get(&self, key: &str) -> StoreResult<T> {
        let txn = self.engine.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(RECORDS).map_err(map_err!(Table))?;
        match table
            .get((self.bucket.as_str(), key))
            .map_err(map_err!(Read))?
        {
            Some(guard) => Self::decode(guard.value()),
            None => Err(StoreError::NotFound {
                kind: T::KIND,
                key: key.to_string(),
            }),
        }
    }

    fn list(&self) -> StoreResult<Vec<T>> {
        let txn = self.engine.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(RECORDS).map_err(map_err!(Table))?;
        let start = (self.bucket.as_str(), "");
        let mut results = Vec::new();
        for entry in table.range(start..).map_err(map_err!(Read))? {
            let (key, value) = entry.map_err(map_err!(Read))?;
            if key.value().0 != self.bucket {
                break;
            }
            results.push(Self::decode(value.value())?);
        }
        Ok(results)
    }

    fn count(&self) -> StoreResult<usize> {
        let txn = self.engine.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(RECORDS).map_err(map_err!(Table))?;
        let start = (self.bucket.as_str(), "");
        let mut count = 0;
        for entry in table.range(start..).map_err(map_err!(Read))? {
            let (key, _) = entry.map_err(map_err!(Read))?;
            if key.value().0 != self.bucket {
                break;
            }
            count += 1;
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cube_core::{State, Task, TaskEvent};

    fn pending_task(id: &str) -> Task {
        let mut task = Task::new(format!("task-{id}"), "alpine:3");
        task.state = State::Pending;
        task
    }

    // ── Round trips ────────────────────────────────────────────────

    #[test]
    fn task_put_and_get() {
        let engine = Engine::open_in_memory().unwrap();
        let mut store = engine.store::<Task>("tasks").unwrap();
        let task = pending_task("1");

        store.put("1", task.clone()).unwrap();

        assert_eq!(store.get("1").unwrap(), task);
    }

    #[test]
    fn event_put_and_get() {
        let engine = Engine::open_in_memory().unwrap();
        let mut store = engine.store::<TaskEvent>("task_events").unwrap();
        let event = TaskEvent::new(&pending_task("1"), State::Scheduled);

        store.put(&event.key(), event.clone()).unwrap();

        assert_eq!(store.get(&event.key()).unwrap(), event);
    }

    #[test]
    fn get_missing_is_not_found() {
        let engine = Engine::open_in_memory().unwrap();
        let store = engine.store::<Task>("tasks").unwrap();

        let err = store.get("missing").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn put_overwrites_existing_key() {
        let engine = Engine::open_in_memory().unwrap();
        let mut store = engine.store::<Task>("tasks").unwrap();
        let mut task = pending_task("1");
        store.put("1", task.clone()).unwrap();

        task.state = State::Running;
        store.put("1", task).unwrap();

        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.get("1").unwrap().state, State::Running);
    }

    #[test]
    fn count_after_distinct_puts() {
        let engine = Engine::open_in_memory().unwrap();
        let mut store = engine.store::<Task>("tasks").unwrap();
        for i in 0..25 {
            store.put(&i.to_string(), pending_task(&i.to_string())).unwrap();
        }

        assert_eq!(store.count().unwrap(), 25);
        assert_eq!(store.list().unwrap().len(), 25);
    }

    #[test]
    fn list_is_key_ordered_within_bucket() {
        let engine = Engine::open_in_memory().unwrap();
        let mut store = engine.store::<Task>("tasks").unwrap();
        for key in ["c", "a", "b"] {
            store.put(key, pending_task(key)).unwrap();
        }

        let names: Vec<String> = store.list().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, ["task-a", "task-b", "task-c"]);
    }

    #[test]
    fn empty_bucket_operations() {
        let engine = Engine::open_in_memory().unwrap();
        let store = engine.store::<TaskEvent>("task_events").unwrap();

        assert!(store.list().unwrap().is_empty());
        assert_eq!(store.count().unwrap(), 0);
    }

    // ── Bucket isolation ───────────────────────────────────────────

    #[test]
    fn disjoint_buckets_do_not_leak() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::open(&dir.path().join("cube.redb")).unwrap();
        let mut tasks = engine.store::<Task>("task").unwrap();
        let mut events = engine.store::<TaskEvent>("taskevent").unwrap();

        let task = pending_task("1");
        tasks.put("1", task.clone()).unwrap();
        for state in [State::Scheduled, State::Running] {
            let event = TaskEvent::new(&task, state);
            events.put(&event.key(), event).unwrap();
        }

        assert_eq!(tasks.count().unwrap(), 1);
        assert_eq!(tasks.list().unwrap(), vec![task]);
        assert_eq!(events.count().unwrap(), 2);
        assert_eq!(events.list().unwrap().len(), 2);
    }

    #[test]
    fn prefixing_bucket_names_do_not_leak() {
        // "task" is a literal prefix of "tasks"; with tuple keys the two
        // ranges never overlap.
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::open(&dir.path().join("cube.redb")).unwrap();
        let mut short = engine.store::<Task>("task").unwrap();
        let mut long = engine.store::<Task>("tasks").unwrap();
        assert_eq!(short.bucket(), "task");
        assert_eq!(long.bucket(), "tasks");

        short.put("1", pending_task("short-1")).unwrap();
        long.put("1", pending_task("long-1")).unwrap();
        long.put("2", pending_task("long-2")).unwrap();
        // Would have collided with bucket "task" under "<bucket>-<key>" keys.
        long.put("-1", pending_task("long-dash")).unwrap();

        assert_eq!(short.count().unwrap(), 1);
        assert_eq!(short.get("1").unwrap().name, "task-short-1");
        assert!(short.get("s-1").unwrap_err().is_not_found());
        assert_eq!(long.count().unwrap(), 3);
        assert!(long.list().unwrap().iter().all(|t| t.name.starts_with("task-long")));
    }

    #[test]
    fn same_key_in_two_buckets_is_independent() {
        let engine = Engine::open_in_memory().unwrap();
        let mut a = engine.store::<Task>("a").unwrap();
        let mut b = engine.store::<Task>("b").unwrap();

        a.put("k", pending_task("from-a")).unwrap();
        b.put("k", pending_task("from-b")).unwrap();

        assert_eq!(a.get("k").unwrap().name, "task-from-a");
        assert_eq!(b.get("k").unwrap().name, "task-from-b");
    }

    // ── Bucket binding ─────────────────────────────────────────────

    #[test]
    fn reopening_bucket_as_other_type_is_type_mismatch() {
        let engine = Engine::open_in_memory().unwrap();
        let _tasks = engine.store::<Task>("tasks").unwrap();

        match engine.store::<TaskEvent>("tasks") {
            Err(StoreError::TypeMismatch {
                bucket,
                expected,
                found,
            }) => {
                assert_eq!(bucket, "tasks");
                assert_eq!(expected, "task_event");
                assert_eq!(found, "task");
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected type mismatch"),
        }

        // Reopening with the bound type is fine.
        assert!(engine.store::<Task>("tasks").is_ok());
    }

    #[test]
    fn empty_bucket_name_rejected() {
        let engine = Engine::open_in_memory().unwrap();
        assert!(matches!(
            engine.store::<Task>(""),
            Err(StoreError::InvalidBucket(_))
        ));
    }

    #[test]
    fn corrupt_record_fails_list_with_deserialize_error() {
        let engine = Engine::open_in_memory().unwrap();
        let mut store = engine.store::<Task>("tasks").unwrap();
        store.put("1", pending_task("1")).unwrap();

        let txn = engine.db.begin_write().unwrap();
        {
            let mut table = txn.open_table(RECORDS).unwrap();
            table.insert(("tasks", "2"), b"not json".as_slice()).unwrap();
        }
        txn.commit().unwrap();

        assert!(matches!(store.list(), Err(StoreError::Deserialize(_))));
        assert!(matches!(store.get("2"), Err(StoreError::Deserialize(_))));
        // Counting does not decode.
        assert_eq!(store.count().unwrap(), 2);
    }

    // ── Lifecycle ──────────────────────────────────────────────────

    #[test]
    fn open_creates_both_tables() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::open(&dir.path().join("cube.redb")).unwrap();

        let txn = engine.db.begin_read().unwrap();
        assert!(txn.open_table(RECORDS).is_ok());
        assert!(txn.open_table(BUCKETS).is_ok());
    }

    #[test]
    fn open_in_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("cube.redb");

        assert!(matches!(
            DurableStore::<Task>::open(&path, "tasks"),
            Err(StoreError::Open(_))
        ));
    }

    #[test]
    fn task_survives_close_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tasks.redb");
        let task = pending_task("1");

        let mut store = DurableStore::<Task>::open(&path, "tasks").unwrap();
        store.put("1", task.clone()).unwrap();
        store.close();

        let store = DurableStore::<Task>::open(&path, "tasks").unwrap();
        let reopened = store.get("1").unwrap();
        assert_eq!(reopened, task);
        assert_eq!(reopened.state, State::Pending);
    }

    #[test]
    fn shared_engine_stays_open_until_last_store_closes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.redb");
        let engine = Engine::open(&path).unwrap();
        let mut tasks = engine.store::<Task>("tasks").unwrap();
        let events = engine.store::<TaskEvent>("task_events").unwrap();
        engine.close();

        tasks.put("1", pending_task("1")).unwrap();
        tasks.close();
        assert_eq!(events.count().unwrap(), 0);
        events.close();

        // All handles gone: the file can be opened again.
        let store = DurableStore::<Task>::open(&path, "tasks").unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }
}
