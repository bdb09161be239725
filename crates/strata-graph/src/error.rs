//! Error types for deferred execution.

use std::error::Error;
use std::fmt;

use strata_core::{GridError, GridId, NodeId};

use crate::config::ConfigError;

/// A node whose closure returned an error or panicked.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeFailure {
    /// The failed node.
    pub node: NodeId,
    /// The grid the node was mutating.
    pub grid: GridId,
    /// Name of that grid.
    pub grid_name: String,
    /// Label given at submission.
    pub label: String,
    /// Error message or panic payload.
    pub reason: String,
}

impl fmt::Display for NodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "node {} ({}) on grid '{}' failed: {}",
            self.node, self.label, self.grid_name, self.reason
        )
    }
}

/// Errors raised by a [`Pipeline`](crate::Pipeline).
#[derive(Debug, PartialEq)]
pub enum GraphError {
    /// A grid operation failed synchronously.
    Grid(GridError),
    /// The handle belongs to another pipeline, or its grid was finalized
    /// or discarded by a reset.
    UnknownGrid {
        /// The unknown grid.
        grid: GridId,
    },
    /// A node read a grid it did not declare as a dependency.
    UndeclaredDependency {
        /// The grid that was read.
        grid: GridId,
    },
    /// A grid was accessed with the wrong cell type.
    TypeMismatch {
        /// The grid.
        grid: GridId,
        /// Cell type the grid holds.
        expected: &'static str,
        /// Cell type that was requested.
        actual: &'static str,
    },
    /// A node on the awaited grid failed.
    NodeFailed(NodeFailure),
    /// The awaited grid depends on a failed node of another grid.
    UpstreamFailed {
        /// Name of the awaited grid.
        grid: String,
        /// The failure it inherited.
        origin: NodeFailure,
    },
    /// The grid cannot leave the pipeline while pending nodes read it.
    GridInUse {
        /// Name of the grid.
        grid: String,
        /// Number of pending readers.
        readers: usize,
    },
    /// Failures that no await observed before `finish` or `reset`.
    UnobservedFailures(Vec<NodeFailure>),
    /// A worker stopped answering while nodes were in flight.
    WorkerLost,
    /// A worker thread could not be spawned.
    ThreadSpawnFailed {
        /// OS error description.
        reason: String,
    },
    /// Invalid pipeline configuration.
    Config(ConfigError),
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid(e) => write!(f, "grid: {e}"),
            Self::UnknownGrid { grid } => write!(f, "grid {grid} is not part of this pipeline"),
            Self::UndeclaredDependency { grid } => {
                write!(f, "grid {grid} was read without being declared as a dependency")
            }
            Self::TypeMismatch {
                grid,
                expected,
                actual,
            } => write!(f, "grid {grid} holds {expected}, requested {actual}"),
            Self::NodeFailed(failure) => write!(f, "{failure}"),
            Self::UpstreamFailed { grid, origin } => {
                write!(f, "grid '{grid}' depends on a failed node: {origin}")
            }
            Self::GridInUse { grid, readers } => {
                write!(f, "grid '{grid}' is still read by {readers} pending node(s)")
            }
            Self::UnobservedFailures(failures) => {
                write!(f, "{} node failure(s) were never awaited", failures.len())?;
                for failure in failures {
                    write!(f, "; {failure}")?;
                }
                Ok(())
            }
            Self::WorkerLost => write!(f, "worker pool disconnected with nodes in flight"),
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl Error for GraphError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<GridError> for GraphError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

impl From<ConfigError> for GraphError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}
