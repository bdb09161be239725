//! Strongly-typed identifiers used by the execution graph.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies a grid slot within one pipeline.
///
/// Assigned sequentially as grids are inserted. Ids are never reused
/// inside a pipeline, so a finalized grid's id stays dead.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridId(pub u32);

impl fmt::Display for GridId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for GridId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies a node in the execution graph, in submission order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NodeId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Version counter of one grid's history.
///
/// Generation 0 is the state the grid had when it entered the pipeline.
/// Every node submitted against the grid produces the next generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Generation(pub u32);

impl Generation {
    /// The generation following this one.
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Counter for unique [`PipelineId`] allocation.
static PIPELINE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance identifier for a pipeline.
///
/// Handles carry the id of the pipeline that issued them, so a handle
/// presented to a different pipeline is rejected instead of silently
/// aliasing an unrelated grid slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PipelineId(u64);

impl PipelineId {
    /// Allocate a fresh, unique pipeline id. Thread-safe.
    pub fn next() -> Self {
        Self(PIPELINE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for PipelineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
