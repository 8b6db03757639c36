//! Worker machine records.

use serde::{Deserialize, Serialize};

/// Role a machine plays in the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Worker,
    Manager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Worker => "worker",
            Role::Manager => "manager",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A machine that can host tasks.
///
/// `task_count` is advisory telemetry reported by the manager. Nothing in
/// this workspace keeps it in step with the tasks actually assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique node name; scores are keyed by it.
    pub name: String,
    /// Address of the node's worker API (host:port).
    #[serde(default)]
    pub api: String,
    /// Total memory capacity.
    pub memory: u64,
    #[serde(default)]
    pub memory_allocated: u64,
    /// Total disk capacity in bytes.
    pub disk: u64,
    #[serde(default)]
    pub disk_allocated: u64,
    pub role: Role,
    #[serde(default)]
    pub task_count: u32,
}

impl Node {
    /// A node with no capacity information yet.
    pub fn new(name: impl Into<String>, api: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            api: api.into(),
            memory: 0,
            memory_allocated: 0,
            disk: 0,
            disk_allocated: 0,
            role,
            task_count: 0,
        }
    }

    pub fn free_memory(&self) -> u64 {
        self.memory.saturating_sub(self.memory_allocated)
    }

    pub fn free_disk(&self) -> u64 {
        self.disk.saturating_sub(self.disk_allocated)
    }
}
