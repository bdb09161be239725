//! Execution counters for a pipeline.
//!
//! [`RunMetrics`] accumulates over every scheduler run of one pipeline
//! and is reset together with it.

use std::time::Duration;

/// Node counts and timings accumulated across runs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunMetrics {
    /// Number of scheduler runs that dispatched at least one node.
    pub runs: u64,
    /// Nodes whose closure returned successfully.
    pub executed: u64,
    /// Nodes whose closure returned an error or panicked.
    pub failed: u64,
    /// Nodes never dispatched because an input had failed.
    pub skipped: u64,
    /// Summed closure execution time across all workers.
    pub busy: Duration,
    /// Wall-clock time spent inside scheduler runs.
    pub wall: Duration,
}

impl RunMetrics {
    /// Every node the scheduler has resolved, one way or another.
    pub fn resolved(&self) -> u64 {
        self.executed + self.failed + self.skipped
    }

    /// Average number of busy workers over the wall-clock time, or 0
    /// before anything ran.
    pub fn parallelism(&self) -> f64 {
        if self.wall.is_zero() {
            0.0
        } else {
            self.busy.as_secs_f64() / self.wall.as_secs_f64()
        }
    }
}
