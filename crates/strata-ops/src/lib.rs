//! Grid algorithms for the Strata terrain engine.
//!
//! Each family of algorithms is an extension trait on
//! [`Grid`](strata_grid::Grid), so `use strata_ops::prelude::*` makes
//! them available as methods:
//!
//! - [`Blur`] / [`Resample`]: box averages through a [`SummedAreaTable`].
//! - [`Morphology`]: inflate, deflate, erode, dilute, outline, corners.
//! - [`DistanceTransform`]: exact Euclidean distance to the nearest true
//!   cell, plus gap filling and widening built on it.
//! - [`AreaFilter`]: size-bounded connected-component removal.
//! - [`Walks`] / [`Paths`]: random walks, jittered paths, Bezier paths.
//! - [`Spacing`]: greedy spaced point selection.
//!
//! Operations that decide per orbit representative finish with a
//! symmetry pass when the spawn group is imperfect. Operations that
//! treat every cell alike commute with the symmetry and skip it.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod blur;
pub mod components;
pub mod distance;
pub mod gaps;
mod grid_helpers;
pub mod morphology;
pub mod path;
pub mod spacing;
pub mod summed_area;
pub mod walk;

pub use blur::{Blur, Resample};
pub use components::AreaFilter;
pub use distance::DistanceTransform;
pub use gaps::Gaps;
pub use morphology::Morphology;
pub use path::{BezierParams, BezierParamsBuilder, PathParams, PathParamsBuilder, Paths};
pub use spacing::Spacing;
pub use summed_area::SummedAreaTable;
pub use walk::Walks;

/// All algorithm traits, for glob import.
pub mod prelude {
    pub use crate::{
        AreaFilter, Blur, DistanceTransform, Gaps, Morphology, Paths, Resample, Spacing, Walks,
    };
}
