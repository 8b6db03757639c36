//! The scheduler contract.

use std::collections::HashMap;

use cube_core::config::{SchedulerConfig, SchedulerPolicy};
use cube_core::{Node, Task};
use tracing::{debug, warn};

use crate::round_robin::RoundRobin;

/// Node name → score. Lower is more preferred.
pub type Scores = HashMap<String, f64>;

/// A placement policy.
pub trait Scheduler: Send + Sync {
    fn name(&self) -> &str;

    /// Nodes eligible to host `task`, in input order.
    fn select_candidate_nodes<'a>(&self, task: &Task, nodes: &'a [Node]) -> Vec<&'a Node>;

    /// Score every candidate.
    fn score(&self, task: &Task, candidates: &[&Node]) -> Scores;

    /// The most preferred candidate, or `None` when there are none.
    fn pick<'a>(&self, scores: &Scores, candidates: &[&'a Node]) -> Option<&'a Node>;

    /// Run all three stages for `task`.
    fn place<'a>(&self, task: &Task, nodes: &'a [Node]) -> Option<&'a Node> {
        let candidates = self.select_candidate_nodes(task, nodes);
        if candidates.is_empty() {
            warn!(task = %task.id, scheduler = self.name(), "no eligible node");
            return None;
        }
        let scores = self.score(task, &candidates);
        let picked = self.pick(&scores, &candidates);
        if let Some(node) = picked {
            debug!(task = %task.id, node = %node.name, scheduler = self.name(), "task placed");
        }
        picked
    }
}

/// Lowest-scoring candidate, scanning in order.
///
/// Only a strictly lower score replaces the current best, so ties go to the
/// earliest candidate. A candidate missing from `scores` scores 0.0, which
/// is as preferred as a candidate can be.
pub fn lowest_score<'a>(scores: &Scores, candidates: &[&'a Node]) -> Option<&'a Node> {
    let score_of = |node: &Node| scores.get(&node.name).copied().unwrap_or(0.0);

    let (first, rest) = candidates.split_first()?;
    let mut best = *first;
    let mut lowest = score_of(best);
    for &node in rest {
        let score = score_of(node);
        if score < lowest {
            best = node;
            lowest = score;
        }
    }
    Some(best)
}

/// Build the configured scheduler.
pub fn from_config(config: &SchedulerConfig) -> Box<dyn Scheduler> {
    match config.policy {
        SchedulerPolicy::RoundRobin => Box::new(RoundRobin::new("round-robin")),
    }
}
