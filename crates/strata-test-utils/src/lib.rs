//! Test utilities for Strata development.
//!
//! Grid fixtures, brute-force reference implementations of the fast
//! algorithms, symmetry assertions and an execution [`Timeline`] for
//! scheduler ordering tests.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod assertions;
pub mod fixtures;
pub mod reference;
pub mod timeline;

pub use assertions::{assert_symmetric, rotate_quarter};
pub use fixtures::{disc_mask, ramp_grid, random_mask, seeded_grid};
pub use timeline::{Span, Timeline};
