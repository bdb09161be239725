//! Square grids for the Strata terrain engine.
//!
//! [`Grid<T>`] stores one cell per coordinate of a square of side
//! `size`, for any [`Cell`](strata_core::Cell) type. Every mutator keeps
//! the grid invariant under its spawn [`Symmetry`](strata_symmetry::Symmetry):
//! writes go to a cell and all of its in-bounds counterparts, and
//! whole-grid operations either preserve symmetry by construction or
//! finish with [`Grid::apply_symmetry`].
//!
//! Grids are plain values. Deferred execution lives in `strata-graph`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod algebra;
pub mod brush;
pub mod convert;
pub mod digest;
pub mod grid;
pub mod ordered;
pub mod placement;
pub mod raster;
pub mod resize;
pub mod stats;

pub use algebra::BinaryOp;
pub use brush::{BrushSource, MemoryBrushes};
pub use grid::{Grid, GridBuilder};
pub use placement::Placement;
pub use raster::{Luma32FImage, RasterScale};
pub use resize::remap_index;
pub use stats::ComponentBounds;
