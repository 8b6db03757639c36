//! Task and task-event records.
//!
//! A [`Task`] is the manager's current snapshot of one unit of work; a
//! [`TaskEvent`] is an immutable record of one state transition. The two are
//! persisted independently and nothing links them transactionally.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── State ─────────────────────────────────────────────────────────

/// Lifecycle state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum State {
    #[default]
    Pending,
    Scheduled,
    Running,
    Completed,
    Failed,
}

impl State {
    /// States reachable from `self` in one step.
    pub fn successors(&self) -> &'static [State] {
        match self {
            State::Pending => &[State::Scheduled],
            State::Scheduled => &[State::Scheduled, State::Running, State::Failed],
            State::Running => &[
                State::Running,
                State::Completed,
                State::Failed,
                State::Scheduled,
            ],
            State::Completed => &[],
            State::Failed => &[State::Scheduled],
        }
    }

    pub fn can_transition_to(&self, next: State) -> bool {
        self.successors().contains(&next)
    }

    /// Completed tasks never move again. Failed tasks may be rescheduled.
    pub fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }
}

impl std::fmt::Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            State::Pending => "pending",
            State::Scheduled => "scheduled",
            State::Running => "running",
            State::Completed => "completed",
            State::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Container restart policy, docker naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicy {
    #[default]
    No,
    Always,
    UnlessStopped,
    OnFailure,
}

// ── Task ──────────────────────────────────────────────────────────

/// A unit of schedulable work.
///
/// Resource and container fields are opaque to the scheduler and the store;
/// they exist so the manager and workers can round-trip them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    #[serde(default)]
    pub container_id: String,
    pub name: String,
    #[serde(default)]
    pub state: State,
    pub image: String,
    #[serde(default)]
    pub cpu: f64,
    #[serde(default)]
    pub memory: u64,
    #[serde(default)]
    pub disk: u64,
    #[serde(default)]
    pub exposed_ports: Vec<String>,
    /// Container port → host port.
    #[serde(default)]
    pub port_bindings: HashMap<String, String>,
    #[serde(default)]
    pub restart_policy: RestartPolicy,
    #[serde(default)]
    pub restart_count: u32,
    /// HTTP path probed by the worker, empty when unchecked.
    #[serde(default)]
    pub health_check: String,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finish_time: Option<DateTime<Utc>>,
}

impl Task {
    /// A new pending task with a fresh id.
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            container_id: String::new(),
            name: name.into(),
            state: State::Pending,
            image: image.into(),
            cpu: 0.0,
            memory: 0,
            disk: 0,
            exposed_ports: Vec::new(),
            port_bindings: HashMap::new(),
            restart_policy: RestartPolicy::No,
            restart_count: 0,
            health_check: String::new(),
            start_time: None,
            finish_time: None,
        }
    }

    /// Logical store key for this task.
    pub fn key(&self) -> String {
        self.id.to_string()
    }
}

// ── TaskEvent ─────────────────────────────────────────────────────

/// One recorded state transition of a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEvent {
    pub id: Uuid,
    pub state: State,
    pub timestamp: DateTime<Utc>,
    /// Snapshot of the task when the event was raised.
    pub task: Task,
}

impl TaskEvent {
    /// Record `task` entering `state` now.
    pub fn new(task: &Task, state: State) -> Self {
        Self {
            id: Uuid::new_v4(),
            state,
            timestamp: Utc::now(),
            task: task.clone(),
        }
    }

    pub fn key(&self) -> String {
        self.id.to_string()
    }

    pub fn task_id(&self) -> Uuid {
        self.task.id
    }
}
