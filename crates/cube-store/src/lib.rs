//! cube-store — task and task-event persistence for the cube manager.
//!
//! Two backends implement the [`Store`] contract:
//!
//! - [`MemoryStore`] keeps records in a `HashMap`; nothing survives the process.
//! - [`DurableStore`] persists JSON-serialized records in a redb database.
//!   Several stores can share one [`Engine`] file, each scoped to a bucket.
//!
//! # Architecture
//!
//! ```text
//! Engine (Arc<redb::Database>)
//!   ├── records: (bucket, key) → JSON bytes
//!   └── buckets: bucket → record kind
//! DurableStore<T> = Engine + bucket
//! ```
//!
//! Stores are typed by their [`Record`]: a `DurableStore<Task>` only accepts
//! tasks, and a bucket bound to tasks refuses to open as an event store.

pub mod durable;
pub mod error;
pub mod memory;
pub mod record;
pub mod store;
pub mod stores;
pub mod tables;

pub use durable::{DurableStore, Engine};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use record::Record;
pub use store::Store;
pub use stores::{TaskStores, open_task_stores};
