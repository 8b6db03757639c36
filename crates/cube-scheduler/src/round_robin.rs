//! Round-robin placement.
//!
//! Each `score` call prefers the candidate after the one preferred by the
//! previous call, wrapping to the front of the list. The cycle is only fair
//! while the candidate list keeps the same length and order between calls;
//! the index is positional and is not re-anchored when nodes come or go.

use std::sync::{Mutex, PoisonError};

use cube_core::{Node, Task};
use tracing::debug;

use crate::scheduler::{Scheduler, Scores, lowest_score};

/// Score given to the preferred candidate.
const PREFERRED: f64 = 0.1;
/// Score given to every other candidate.
const OTHER: f64 = 1.0;

/// One round-robin step.
///
/// `last` is the previously preferred index (`None` before the first call).
/// Returns the next index, or `None` when there are no candidates.
pub fn next_worker(last: Option<usize>, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match last {
        Some(last) if last + 1 < len => Some(last + 1),
        _ => Some(0),
    }
}

/// Round-robin scheduler.
///
/// The last preferred index sits behind a mutex, held for the whole step,
/// so concurrent `score` calls on one instance run one at a time.
#[derive(Debug)]
pub struct RoundRobin {
    name: String,
    last_worker: Mutex<Option<usize>>,
}

impl RoundRobin {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_last_worker(name, None)
    }

    /// Resume a cycle from a known index.
    pub fn with_last_worker(name: impl Into<String>, last_worker: Option<usize>) -> Self {
        Self {
            name: name.into(),
            last_worker: Mutex::new(last_worker),
        }
    }

    /// Index preferred by the most recent `score` call.
    pub fn last_worker(&self) -> Option<usize> {
        *self.last_worker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RoundRobin {
    fn default() -> Self {
        Self::new("round-robin")
    }
}

impl Scheduler for RoundRobin {
    fn name(&self) -> &str {
        &self.name
    }

    fn select_candidate_nodes<'a>(&self, _task: &Task, nodes: &'a [Node]) -> Vec<&'a Node> {
        nodes.iter().collect()
    }

    fn score(&self, task: &Task, candidates: &[&Node]) -> Scores {
        let mut last = self.last_worker.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(next) = next_worker(*last, candidates.len()) else {
            return Scores::new();
        };
        *last = Some(next);

        debug!(task = %task.id, node = %candidates[next].name, index = next, "round-robin turn");
        candidates
            .iter()
            .enumerate()
            .map(|(idx, node)| {
                let score = if idx == next { PREFERRED } else { OTHER };
                (node.name.clone(), score)
            })
            .collect()
    }

    fn pick<'a>(&self, scores: &Scores, candidates: &[&'a Node]) -> Option<&'a Node> {
        lowest_score(scores, candidates)
    }
}
