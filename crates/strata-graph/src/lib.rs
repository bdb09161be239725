//! Deferred execution for Strata grid pipelines.
//!
//! A [`Pipeline`] takes ownership of grids and hands out typed
//! [`GridHandle`]s. Mutations are submitted as closures and recorded as
//! nodes of a dependency graph. Nothing runs until a result is awaited;
//! then the scheduler drains exactly the nodes that result depends on
//! on a pool of scoped worker threads.
//!
//! Ordering guarantees:
//!
//! - Nodes targeting the same grid run in submission order.
//! - A node reading another grid sees that grid as it was when the node
//!   was submitted, regardless of what was submitted after it.
//! - Nothing else is ordered.
//!
//! A failing node poisons its output and every state derived from it.
//! The failure is reported by the first await that depends on it, and
//! failures nobody awaited are returned by [`Pipeline::finish`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod handle;
pub mod metrics;
mod node;
pub mod pipeline;
mod scheduler;

pub use config::{ConfigError, PipelineConfig};
pub use error::{GraphError, NodeFailure};
pub use handle::{GridHandle, GridRef};
pub use metrics::RunMetrics;
pub use node::Inputs;
pub use pipeline::Pipeline;
