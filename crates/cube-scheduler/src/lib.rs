//! cube-scheduler — decides which node a task runs on.
//!
//! Placement is three stages, composed by the caller or by
//! [`Scheduler::place`]:
//!
//! ```text
//! nodes ──select_candidate_nodes──▶ candidates ──score──▶ {name: score}
//!                                        └──────────pick──────┘──▶ Option<&Node>
//! ```
//!
//! Lower scores are better. [`RoundRobin`] is the one policy: it prefers
//! the candidate after the one it preferred last time.

pub mod round_robin;
pub mod scheduler;

pub use round_robin::{RoundRobin, next_worker};
pub use scheduler::{Scheduler, Scores, from_config, lowest_score};
