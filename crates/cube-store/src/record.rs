//! Records a store can hold.

use serde::Serialize;
use serde::de::DeserializeOwned;

use cube_core::{Task, TaskEvent};

/// A value type persisted by a [`Store`](crate::Store).
///
/// `KIND` names the record family. The durable backend binds each bucket to
/// one kind the first time it is opened.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: &'static str;
}

impl Record for Task {
    const KIND: &'static str = "task";
}

impl Record for TaskEvent {
    const KIND: &'static str = "task_event";
}
