//! Binary morphology on boolean grids.
//!
//! A cell is on the boundary when any in-bounds 4-neighbour holds the
//! other value. Every operation reads a snapshot of the grid and writes
//! its result separately, so decisions never cascade within one pass.

use rand::Rng;
use strata_core::{GridError, Point};
use strata_grid::Grid;

use crate::blur::blur_bool;
use crate::grid_helpers::{disc_offsets, is_boundary, neighbours4};

/// Upper bound on [`Morphology::cut_corners`] passes.
const MAX_CORNER_PASSES: usize = 256;

/// Morphological operations on boolean masks.
pub trait Morphology {
    /// Grow true regions: every true boundary cell sets all cells within
    /// `radius + 0.5` to true.
    fn inflate(&mut self, radius: f32);

    /// Shrink true regions: every false boundary cell sets all cells
    /// within `radius + 0.5` to false.
    fn deflate(&mut self, radius: f32);

    /// Clear each true boundary cell with probability `strength`,
    /// `passes` times.
    fn erode(&mut self, strength: f32, passes: usize) -> Result<(), GridError>;

    /// Set each false boundary cell with probability `strength`,
    /// `passes` times.
    fn dilute(&mut self, strength: f32, passes: usize) -> Result<(), GridError>;

    /// Keep only boundary cells.
    fn outline(&mut self);

    /// Clear true cells with more than one false 4-neighbour.
    fn cut_corners_once(&mut self);

    /// Repeat [`cut_corners_once`](Morphology::cut_corners_once) until
    /// nothing changes.
    fn cut_corners(&mut self);

    /// Box blur with a density threshold in `[0, 1]`.
    fn blur_density(&mut self, radius: usize, density: f32) -> Result<(), GridError>;
}

fn stamp_boundary(grid: &mut Grid<bool>, radius: f32, value: bool) {
    let offsets = disc_offsets(radius + 0.5);
    let size = grid.size();
    let mut out = grid.clone();
    for i in 0..grid.cell_count() {
        if grid.cell(i) != value || !is_boundary(grid, i) {
            continue;
        }
        let p = Point::from_index(i, size);
        for &(dx, dy) in &offsets {
            if let Some(j) = p.offset(dx, dy).index(size) {
                out.set_cell(j, value);
            }
        }
    }
    *grid = out;
}

fn flip_boundary(
    grid: &mut Grid<bool>,
    from: bool,
    strength: f32,
    passes: usize,
    op: &'static str,
) -> Result<(), GridError> {
    if !(0.0..=1.0).contains(&strength) {
        return Err(GridError::invalid(
            op,
            format!("strength {strength} outside [0, 1]"),
        ));
    }
    let domain = grid.spawn_domain();
    let size = grid.size();
    for _ in 0..passes {
        let snapshot = grid.clone();
        let candidates: Vec<Point> = domain
            .iter()
            .filter(|p| {
                let i = p.x as usize + p.y as usize * size;
                snapshot.cell(i) == from && is_boundary(&snapshot, i)
            })
            .collect();
        let rng = grid.rng_mut()?;
        let flipped: Vec<Point> = candidates
            .into_iter()
            .filter(|_| rng.gen::<f32>() < strength)
            .collect();
        for p in flipped {
            grid.write_orbit(p, !from);
        }
    }
    grid.settle_symmetry();
    Ok(())
}

impl Morphology for Grid<bool> {
    fn inflate(&mut self, radius: f32) {
        stamp_boundary(self, radius, true);
    }

    fn deflate(&mut self, radius: f32) {
        stamp_boundary(self, radius, false);
    }

    fn erode(&mut self, strength: f32, passes: usize) -> Result<(), GridError> {
        flip_boundary(self, true, strength, passes, "erode")
    }

    fn dilute(&mut self, strength: f32, passes: usize) -> Result<(), GridError> {
        flip_boundary(self, false, strength, passes, "dilute")
    }

    fn outline(&mut self) {
        let snapshot = self.clone();
        for i in 0..self.cell_count() {
            self.set_cell(i, is_boundary(&snapshot, i));
        }
    }

    fn cut_corners_once(&mut self) {
        cut_pass(self);
    }

    fn cut_corners(&mut self) {
        for _ in 0..MAX_CORNER_PASSES {
            if cut_pass(self) == 0 {
                return;
            }
        }
        tracing::warn!(grid = %self.name(), passes = MAX_CORNER_PASSES, "cut_corners hit pass cap");
    }

    fn blur_density(&mut self, radius: usize, density: f32) -> Result<(), GridError> {
        blur_bool(self, radius, density)
    }
}

/// One corner-cutting pass; returns the number of cleared cells.
fn cut_pass(grid: &mut Grid<bool>) -> usize {
    let snapshot = grid.clone();
    let size = grid.size();
    let mut cleared = 0;
    for i in 0..grid.cell_count() {
        if !snapshot.cell(i) {
            continue;
        }
        let open = neighbours4(Point::from_index(i, size), size)
            .into_iter()
            .filter(|&j| !snapshot.cell(j))
            .count();
        if open > 1 {
            grid.set_cell(i, false);
            cleared += 1;
        }
    }
    cleared
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_symmetry::{Symmetry, SymmetrySettings};
    use strata_test_utils::{assert_symmetric, disc_mask, seeded_grid};

    #[test]
    fn inflate_single_cell_makes_disc() {
        let mut g = disc_mask(9, Point::new(4, 4), 0.0);
        g.inflate(1.0);
        // Offsets within 1.5: the 3x3 block.
        assert_eq!(g.count(), 9);
        g.inflate(1.0);
        assert_eq!(g.count(), 25);
        assert!(g.get(4, 2));
        assert!(!g.get(4, 1));
    }

    #[test]
    fn deflate_undoes_inflate_on_convex_region() {
        let original = disc_mask(32, Point::new(16, 16), 8.0);
        let mut g = original.clone();
        g.inflate(2.0);
        g.deflate(2.0);
        let mut diff = g.clone();
        diff.divide(&original).unwrap();
        assert!(diff.count() <= 16, "symmetric difference {}", diff.count());
    }

    #[test]
    fn outline_keeps_boundary_only() {
        let mut g = disc_mask(7, Point::new(3, 3), 2.0);
        g.outline();
        assert!(!g.get(3, 3));
        assert!(g.get(1, 3));
        assert!(g.get(0, 3));
    }

    #[test]
    fn cut_corners_removes_spurs() {
        let mut g = Grid::<bool>::builder(5).build().unwrap();
        for x in 1..4 {
            for y in 1..4 {
                g.set(x, y, true).unwrap();
            }
        }
        g.cut_corners_once();
        assert!(!g.get(1, 1));
        assert!(g.get(2, 1));
        assert!(g.get(2, 2));
        g.cut_corners();
        assert_eq!(g.count(), 0);
    }

    #[test]
    fn erode_needs_seed_and_valid_strength() {
        let mut unseeded = Grid::<bool>::builder(4).fill(true).build().unwrap();
        unseeded.set_cell(0, false);
        assert!(matches!(
            unseeded.erode(0.5, 1),
            Err(GridError::MissingSeed { .. })
        ));
        let mut g = seeded_grid::<bool>(4, Symmetry::None, 3);
        assert!(g.erode(1.5, 1).is_err());
    }

    #[test]
    fn full_strength_dilute_grows_one_ring() {
        let mut g = seeded_grid::<bool>(9, Symmetry::Point4, 11);
        g.set(4, 4, true).unwrap();
        g.dilute(1.0, 1).unwrap();
        assert_eq!(g.count(), 5);
        assert_symmetric(&g);
    }

    #[test]
    fn erosion_keeps_symmetry() {
        let sym = SymmetrySettings::uniform(Symmetry::Quad);
        let mut g = Grid::<bool>::builder(16)
            .seed(5)
            .symmetry(sym)
            .build()
            .unwrap();
        for x in 2..14 {
            for y in 3..13 {
                g.set(x, y, true).unwrap();
            }
        }
        g.erode(0.5, 3).unwrap();
        assert_symmetric(&g);
        assert!(g.count() < 120);
    }
}
