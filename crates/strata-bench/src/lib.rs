//! Benchmark profiles for the Strata terrain engine.
//!
//! Provides pre-built [`MapProfile`]s and the map generator they drive:
//!
//! - [`reference_profile`]: 128x128 four-player island map
//! - [`stress_profile`]: 512x512 with proportionally more walkers
//! - [`generate`]: the full deferred pipeline for a profile

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use strata_core::{GridError, Point};
use strata_graph::{GraphError, Pipeline, PipelineConfig};
use strata_grid::{BinaryOp, Grid};
use strata_ops::prelude::*;
use strata_ops::PathParams;
use strata_symmetry::{Symmetry, SymmetrySettings};

/// Parameters of one generated map.
#[derive(Clone, Debug, PartialEq)]
pub struct MapProfile {
    /// Side length.
    pub size: usize,
    /// Symmetry group applied in every role.
    pub symmetry: Symmetry,
    /// Root seed; each layer derives its own from it.
    pub seed: u64,
    /// Land walkers.
    pub walkers: usize,
    /// Steps per walker.
    pub steps: usize,
}

/// Build a reference profile: 128x128 (16K cells), quarter-turn symmetry.
pub fn reference_profile(seed: u64) -> MapProfile {
    MapProfile {
        size: 128,
        symmetry: Symmetry::Point4,
        seed,
        walkers: 6,
        steps: 400,
    }
}

/// Build a stress profile: 512x512 (~262K cells).
///
/// Same layers as [`reference_profile`] with 16x the cell count.
pub fn stress_profile(seed: u64) -> MapProfile {
    MapProfile {
        size: 512,
        symmetry: Symmetry::Point4,
        seed,
        walkers: 24,
        steps: 1600,
    }
}

/// Seeded layer of `profile`. Layers differ only in their seed offset.
pub fn layer<T: strata_core::Cell>(
    profile: &MapProfile,
    name: &str,
    offset: u64,
) -> Result<Grid<T>, GridError> {
    Grid::builder(profile.size)
        .seed(profile.seed.wrapping_add(offset))
        .symmetry(SymmetrySettings::uniform(profile.symmetry))
        .name(name)
        .build()
}

/// Generate the height map for `profile`.
///
/// Layers: a walked land mask cleaned of specks and narrow channels,
/// hills restricted to land, and a road from the first base towards the
/// centre. Heights add land and hills, cut the roads in and blur.
pub fn generate(profile: &MapProfile, config: PipelineConfig) -> Result<Grid<f32>, GraphError> {
    let size = profile.size;
    let mut p = Pipeline::new(config)?;
    let land = p.insert(layer::<bool>(profile, "land", 0)?);
    let hills = p.insert(layer::<bool>(profile, "hills", 1)?);
    let roads = p.insert(layer::<bool>(profile, "roads", 2)?);
    let heights = p.insert(layer::<f32>(profile, "heights", 3)?);

    let (walkers, steps) = (profile.walkers, profile.steps);
    p.submit(&land, &[], "walk", move |g, _| {
        Ok(g.random_walk(walkers, steps)?)
    })?;
    p.submit(&land, &[], "grow", move |g, _| {
        g.inflate(2.0);
        g.remove_areas_smaller_than(size);
        Ok(g.fill_gaps(3.0)?)
    })?;

    p.submit(&hills, &[], "walk", move |g, _| {
        Ok(g.progressive_walk(walkers / 2 + 1, steps / 2)?)
    })?;
    p.combine(&hills, &land, BinaryOp::Multiply)?;

    let params = PathParams::builder()
        .max_step_size(2.0)
        .max_angle_error(0.5)
        .midpoints(2)
        .midpoint_distance(0.0, size as f32 / 8.0)
        .build()
        .map_err(|e| GridError::invalid("path", e))?;
    let (base, centre) = {
        let q = (size / 8) as i32;
        let c = (size / 2) as i32;
        (Point::new(q, q), Point::new(c, c))
    };
    p.submit(&roads, &[], "road", move |g, _| {
        Ok(g.path(base, centre, &params)?)
    })?;

    p.submit(
        &heights,
        &[land.to_ref(), hills.to_ref(), roads.to_ref()],
        "compose",
        move |g, inputs| {
            g.add(&inputs.get::<bool>(land)?.to_float(0.0, 1.0))?;
            g.add(&inputs.get::<bool>(hills)?.to_float(0.0, 2.0))?;
            g.subtract(&inputs.get::<bool>(roads)?.to_float(0.0, 0.5))?;
            Ok(())
        },
    )?;
    p.submit(&heights, &[], "blur", |g, _| {
        g.blur(2);
        Ok(())
    })?;

    let out = p.finalize(heights)?;
    p.finish()?;
    Ok(out)
}
