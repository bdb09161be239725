//! Symmetry engine for Strata grids.
//!
//! Pure coordinate mathematics: for a chosen [`Symmetry`] group and a
//! grid size, computes the counterpart coordinates of any point, the
//! angular counterparts of a direction, and the [`FundamentalDomain`]
//! whose symmetric images cover the grid. Nothing here reads or writes
//! grid contents.
//!
//! A grid carries one group per [`SymmetryRole`] in its
//! [`SymmetrySettings`]; grid mutators keep the spawn role invariant.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod domain;
pub mod error;
pub mod settings;
pub mod symmetry;

pub use domain::FundamentalDomain;
pub use error::SymmetryError;
pub use settings::{SymmetryRole, SymmetrySettings};
pub use symmetry::{Angles, Symmetry};
