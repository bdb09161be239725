//! Core types and traits for the Strata grid engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions used throughout the Strata workspace:
//! cell types and their storage buffers, grid coordinates, identifiers,
//! and the shared error type.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod buffer;
pub mod cell;
pub mod error;
pub mod id;
pub mod point;

pub use buffer::{BitBuffer, CellBuffer, DenseBuffer};
pub use cell::{Cell, CellKind, Ordered, Vec2, Vec3, Vec4, Vector};
pub use error::GridError;
pub use id::{Generation, GridId, NodeId, PipelineId};
pub use point::{Point, Points};
