//! Symmetry assertions.

use strata_core::{Cell, Point};
use strata_grid::Grid;
use strata_symmetry::SymmetryRole;

/// Panic with the first cell that differs from a spawn counterpart.
pub fn assert_symmetric<T: Cell>(grid: &Grid<T>) {
    let size = grid.size();
    for i in 0..grid.cell_count() {
        let p = Point::from_index(i, size);
        let v = grid.cell(i);
        for q in grid.symmetry().points(SymmetryRole::Spawn, p, size) {
            assert_eq!(
                grid.at(q),
                v,
                "{} breaks {} symmetry: {p} != {q}",
                grid.name(),
                grid.symmetry().spawn()
            );
        }
    }
}

/// Copy of `grid` rotated a quarter turn about its centre.
pub fn rotate_quarter<T: Cell>(grid: &Grid<T>) -> Grid<T> {
    let s = grid.size() as i32;
    let mut out = grid.clone();
    for i in 0..grid.cell_count() {
        let p = Point::from_index(i, grid.size());
        let q = Point::new(s - 1 - p.y, p.x);
        if let Some(j) = q.index(grid.size()) {
            out.set_cell(j, grid.cell(i));
        }
    }
    out
}
