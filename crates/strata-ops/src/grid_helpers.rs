//! Shared neighbourhood helpers for the boolean algorithms.

use smallvec::SmallVec;
use strata_core::Point;
use strata_grid::Grid;

/// Axis-aligned unit steps: left, right, up, down.
pub(crate) const STEPS_4: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Flat indices of the in-bounds 4-neighbours of `p`.
pub(crate) fn neighbours4(p: Point, size: usize) -> SmallVec<[usize; 4]> {
    STEPS_4
        .iter()
        .filter_map(|&(dx, dy)| p.offset(dx, dy).index(size))
        .collect()
}

/// Whether cell `i` differs from any in-bounds 4-neighbour.
pub(crate) fn is_boundary(grid: &Grid<bool>, i: usize) -> bool {
    let v = grid.cell(i);
    neighbours4(Point::from_index(i, grid.size()), grid.size())
        .into_iter()
        .any(|j| grid.cell(j) != v)
}

/// Offsets within Euclidean distance `radius` of the origin.
pub(crate) fn disc_offsets(radius: f32) -> Vec<(i32, i32)> {
    let r = radius.max(0.0);
    let reach = r.floor() as i32;
    let r2 = r * r;
    let mut out = Vec::new();
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            if (dx * dx + dy * dy) as f32 <= r2 {
                out.push((dx, dy));
            }
        }
    }
    out
}
