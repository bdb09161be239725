//! Ready-made grids.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use strata_core::{Cell, Point};
use strata_grid::Grid;
use strata_symmetry::{Symmetry, SymmetrySettings};

/// Seeded zero grid with `symmetry` in every role.
pub fn seeded_grid<T: Cell>(size: usize, symmetry: Symmetry, seed: u64) -> Grid<T> {
    Grid::builder(size)
        .seed(seed)
        .symmetry(SymmetrySettings::uniform(symmetry))
        .name("fixture")
        .build()
        .expect("fixture size is non-zero")
}

/// Float grid where cell `(x, y)` holds `x + size * y`, no symmetry.
pub fn ramp_grid(size: usize) -> Grid<f32> {
    let mut g = seeded_grid::<f32>(size, Symmetry::None, 0);
    for i in 0..size * size {
        g.set_cell(i, i as f32);
    }
    g
}

/// True within `radius` of `center`, no symmetry.
pub fn disc_mask(size: usize, center: Point, radius: f32) -> Grid<bool> {
    let mut g = seeded_grid::<bool>(size, Symmetry::None, 0);
    for i in 0..size * size {
        let p = Point::from_index(i, size);
        g.set_cell(i, p.distance(center) <= radius);
    }
    g
}

/// Independent coin flips with probability `density`, no symmetry.
pub fn random_mask(size: usize, density: f64, seed: u64) -> Grid<bool> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut g = seeded_grid::<bool>(size, Symmetry::None, seed);
    for i in 0..size * size {
        g.set_cell(i, rng.gen_bool(density));
    }
    g
}
