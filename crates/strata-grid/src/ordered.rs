//! Operations on grids whose cells are ordered (`i32`, `f32`).

use strata_core::{Cell, Ordered, Point};

use crate::grid::Grid;

const NEIGHBOURS_8: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

impl<T: Ordered> Grid<T> {
    fn compare_neighbours(&self, p: Point, keep: impl Fn(T, T) -> bool) -> bool {
        let v = self.at(p);
        NEIGHBOURS_8
            .iter()
            .map(|&(dx, dy)| p.offset(dx, dy))
            .filter(|q| self.in_bounds(*q))
            .all(|q| keep(v, self.at(q)))
    }

    /// Whether `(x, y)` is `>=` all of its in-bounds 8-neighbours.
    pub fn is_local_max(&self, x: i32, y: i32) -> bool {
        self.compare_neighbours(Point::new(x, y), |v, n| v >= n)
    }

    /// Whether `(x, y)` is `<=` all of its in-bounds 8-neighbours.
    pub fn is_local_min(&self, x: i32, y: i32) -> bool {
        self.compare_neighbours(Point::new(x, y), |v, n| v <= n)
    }

    /// Local maxima whose value lies in `[min, max]`.
    pub fn local_maxima(&self, min: T, max: T) -> Grid<bool> {
        let mut out = self.derive(false);
        for i in 0..self.cell_count() {
            let p = Point::from_index(i, self.size());
            let v = self.cell(i);
            if v >= min && v <= max && self.is_local_max(p.x, p.y) {
                out.set_cell(i, true);
            }
        }
        out
    }

    /// Local minima whose value lies in `[min, max]`.
    pub fn local_minima(&self, min: T, max: T) -> Grid<bool> {
        let mut out = self.derive(false);
        for i in 0..self.cell_count() {
            let p = Point::from_index(i, self.size());
            let v = self.cell(i);
            if v >= min && v <= max && self.is_local_min(p.x, p.y) {
                out.set_cell(i, true);
            }
        }
        out
    }

    fn update(&mut self, f: impl Fn(T) -> T) {
        for i in 0..self.cell_count() {
            let v = self.cell(i);
            self.set_cell(i, f(v));
        }
    }

    /// Cap every cell at `max`.
    pub fn clamp_max(&mut self, max: T) {
        self.update(|v| if v > max { max } else { v });
    }

    /// Raise every cell to at least `min`.
    pub fn clamp_min(&mut self, min: T) {
        self.update(|v| if v < min { min } else { v });
    }

    /// Clamp every cell into `[min, max]`.
    pub fn clamp(&mut self, min: T, max: T) {
        self.clamp_min(min);
        self.clamp_max(max);
    }

    /// Zero every cell outside `[min, max]`.
    pub fn zero_outside_range(&mut self, min: T, max: T) {
        self.update(|v| if v < min || v > max { <T as Cell>::zero() } else { v });
    }

    /// Zero every cell inside `[min, max]`.
    pub fn zero_in_range(&mut self, min: T, max: T) {
        self.update(|v| if v >= min && v <= max { <T as Cell>::zero() } else { v });
    }

    /// True where the value is strictly above `threshold`.
    pub fn above(&self, threshold: T) -> Grid<bool> {
        self.map(|v| v > threshold)
    }

    /// Smallest cell value.
    pub fn min(&self) -> T {
        self.extreme(T::highest(), |v, best| v < best)
    }

    /// Largest cell value.
    pub fn max(&self) -> T {
        self.extreme(T::lowest(), |v, best| v > best)
    }

    fn extreme(&self, start: T, better: impl Fn(T, T) -> bool) -> T {
        (0..self.cell_count())
            .map(|i| self.cell(i))
            .fold(start, |best, v| if better(v, best) { v } else { best })
    }
}
