//! Build the manager's task and event stores from configuration.

use cube_core::config::{StoreBackend, StoreConfig};
use cube_core::{Task, TaskEvent};
use tracing::info;

use crate::durable::Engine;
use crate::error::StoreResult;
use crate::memory::MemoryStore;
use crate::store::Store;

/// The pair of stores a manager persists into.
///
/// Writing a task and then its event are two separate calls; a crash between
/// them leaves one without the other.
pub struct TaskStores {
    pub tasks: Box<dyn Store<Task>>,
    pub events: Box<dyn Store<TaskEvent>>,
}

/// Open the configured backend. Durable stores share one database file.
pub fn open_task_stores(config: &StoreConfig) -> StoreResult<TaskStores> {
    match config.backend {
        StoreBackend::Memory => {
            info!("using in-memory task stores");
            Ok(TaskStores {
                tasks: Box::new(MemoryStore::<Task>::new()),
                events: Box::new(MemoryStore::<TaskEvent>::new()),
            })
        }
        StoreBackend::Durable => {
            let engine = Engine::open(&config.path)?;
            let tasks = engine.store::<Task>(&config.task_bucket)?;
            let events = engine.store::<TaskEvent>(&config.event_bucket)?;
            info!(
                path = ?config.path,
                task_bucket = %config.task_bucket,
                event_bucket = %config.event_bucket,
                "using durable task stores"
            );
            Ok(TaskStores {
                tasks: Box::new(tasks),
                events: Box::new(events),
            })
        }
    }
}
