//! cube-core — records shared by the scheduler and the store.
//!
//! Nodes, tasks, and task events are plain data: they carry no behaviour
//! beyond small helpers, and every field round-trips through JSON.

pub mod config;
pub mod node;
pub mod task;

pub use config::CubeConfig;
pub use node::{Node, Role};
pub use task::{RestartPolicy, State, Task, TaskEvent};
