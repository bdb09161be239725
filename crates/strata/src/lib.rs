//! Strata: symmetric terrain grids for competitive map generation.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Strata sub-crates. For most users, adding `strata` as a single dependency is
//! sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use strata::prelude::*;
//!
//! let mut pipeline = Pipeline::new(PipelineConfig::default()).unwrap();
//! let land = pipeline.insert(
//!     Grid::<bool>::builder(64)
//!         .seed(7)
//!         .symmetry(SymmetrySettings::uniform(Symmetry::Point4))
//!         .name("land")
//!         .build()
//!         .unwrap(),
//! );
//!
//! // Nothing runs yet: both closures are recorded against `land`.
//! pipeline
//!     .submit(&land, &[], "walk", |g, _| Ok(g.random_walk(4, 100)?))
//!     .unwrap();
//! pipeline
//!     .submit(&land, &[], "grow", |g, _| {
//!         g.inflate(1.5);
//!         Ok(())
//!     })
//!     .unwrap();
//!
//! let land = pipeline.finalize(land).unwrap();
//! assert!(land.is_symmetric());
//! pipeline.finish().unwrap();
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `strata-core` | Cell types, buffers, points, ids, `GridError` |
//! | [`symmetry`] | `strata-symmetry` | Symmetry groups, role settings, fundamental domains |
//! | [`grid`] | `strata-grid` | `Grid`, algebra, placement, resize, raster export |
//! | [`ops`] | `strata-ops` | Blur, morphology, distances, area filters, walks, paths |
//! | [`graph`] | `strata-graph` | Deferred pipeline and worker pool |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Cell types, storage and ids (`strata-core`).
///
/// Contains the [`types::Cell`] trait with its boolean, integer, float
/// and vector implementations, plus [`types::GridError`].
pub use strata_core as types;

/// Symmetry groups and role settings (`strata-symmetry`).
///
/// [`symmetry::SymmetrySettings`] assigns a [`symmetry::Symmetry`] to each
/// [`symmetry::SymmetryRole`].
pub use strata_symmetry as symmetry;

/// The symmetric grid container (`strata-grid`).
pub use strata_grid as grid;

/// Grid algorithms as extension traits (`strata-ops`).
pub use strata_ops as ops;

/// Deferred, dependency-ordered execution (`strata-graph`).
///
/// [`graph::Pipeline`] owns grids and runs submitted closures on a
/// worker pool when results are awaited.
pub use strata_graph as graph;

/// Common imports for typical Strata usage.
///
/// ```rust
/// use strata::prelude::*;
/// ```
///
/// This imports the grid type, symmetry settings, the pipeline and every
/// algorithm trait.
pub mod prelude {
    // Core types
    pub use strata_core::{Cell, GridError, Point, Vec2, Vec3, Vec4};

    // Symmetry
    pub use strata_symmetry::{Symmetry, SymmetryRole, SymmetrySettings};

    // Grid
    pub use strata_grid::{BinaryOp, Grid, Placement, RasterScale};

    // Algorithms
    pub use strata_ops::prelude::*;
    pub use strata_ops::{BezierParams, PathParams};

    // Pipeline
    pub use strata_graph::{
        GraphError, GridHandle, GridRef, Inputs, Pipeline, PipelineConfig, RunMetrics,
    };
}
