//! Two-dimensional prefix sums for O(1) window aggregates.
//!
//! Values are stored as fixed-point `i64`: booleans as 0/1, integers
//! unchanged, floats and vector components multiplied by
//! [`FIXED_SCALE`] and rounded. Window sums are therefore exact and
//! independent of summation order.

use strata_core::{Cell, CellKind, Point};
use strata_grid::Grid;

/// Fixed-point multiplier for float components.
pub const FIXED_SCALE: i64 = 1000;

/// Inclusive prefix sums over a grid, one plane per cell component.
///
/// Entry `(x + 1, y + 1)` of a plane holds the sum of all cells with
/// coordinates `<= (x, y)`; row and column 0 are zero padding.
#[derive(Clone, Debug)]
pub struct SummedAreaTable {
    size: usize,
    arity: usize,
    scale: i64,
    table: Vec<i64>,
}

impl SummedAreaTable {
    /// Build the table for `grid`.
    pub fn new<T: Cell>(grid: &Grid<T>) -> Self {
        let size = grid.size();
        let arity = T::ARITY;
        let scale = match T::KIND {
            CellKind::Bool | CellKind::Int => 1,
            CellKind::Float | CellKind::Vector(_) => FIXED_SCALE,
        };
        let stride = size + 1;
        let plane = stride * stride;
        let mut table = vec![0i64; plane * arity];
        for y in 0..size {
            for x in 0..size {
                let v = grid.cell(y * size + x);
                for c in 0..arity {
                    let fixed = v.fixed_component(c, scale);
                    let base = c * plane;
                    let above = table[base + y * stride + x + 1];
                    let left = table[base + (y + 1) * stride + x];
                    let diag = table[base + y * stride + x];
                    table[base + (y + 1) * stride + x + 1] = fixed + above + left - diag;
                }
            }
        }
        Self {
            size,
            arity,
            scale,
            table,
        }
    }

    /// Side length of the source grid.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Fixed-point multiplier applied to every stored value.
    pub fn scale(&self) -> i64 {
        self.scale
    }

    fn at(&self, component: usize, x: usize, y: usize) -> i64 {
        let stride = self.size + 1;
        self.table[component * stride * stride + y * stride + x]
    }

    /// Fixed-point sum of `component` over the inclusive rectangle
    /// `[x0, x1] × [y0, y1]`, which must lie inside the grid.
    pub fn rect_sum(&self, component: usize, x0: usize, y0: usize, x1: usize, y1: usize) -> i64 {
        let d = self.at(component, x1 + 1, y1 + 1);
        let a = self.at(component, x0, y0);
        let b = self.at(component, x1 + 1, y0);
        let c = self.at(component, x0, y1 + 1);
        d + a - b - c
    }

    /// Clipped window `[p - r, p + r]²` as an inclusive rectangle plus
    /// its cell count.
    fn window(&self, p: Point, radius: usize) -> (usize, usize, usize, usize, usize) {
        let max = self.size - 1;
        let x = p.x.max(0) as usize;
        let y = p.y.max(0) as usize;
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = (x + radius).min(max);
        let y1 = (y + radius).min(max);
        let area = (x1 - x0 + 1) * (y1 - y0 + 1);
        (x0, y0, x1, y1, area)
    }

    /// Mean of `component` over the `(2r+1)²` window around `p`,
    /// clipped to the grid, in cell units.
    pub fn window_mean(&self, p: Point, radius: usize, component: usize) -> f64 {
        let (x0, y0, x1, y1, area) = self.window(p, radius);
        let sum = self.rect_sum(component, x0, y0, x1, y1);
        sum as f64 / (area as i64 * self.scale) as f64
    }

    /// Window mean of every component, as a cell value. Integer means
    /// are computed exactly before rounding.
    pub fn window_value<T: Cell>(&self, p: Point, radius: usize) -> T {
        let (x0, y0, x1, y1, area) = self.window(p, radius);
        let mut sums = [0i64; 4];
        for (c, slot) in sums.iter_mut().enumerate().take(self.arity) {
            *slot = self.rect_sum(c, x0, y0, x1, y1);
        }
        T::from_fixed(&sums[..self.arity], area as i64 * self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_test_utils::{ramp_grid, reference};

    #[test]
    fn matches_brute_force_for_every_radius() {
        let g = ramp_grid(7);
        let sat = SummedAreaTable::new(&g);
        for r in 0..=7 {
            for i in 0..49 {
                let p = Point::from_index(i, 7);
                let fast = sat.window_mean(p, r, 0);
                let slow = reference::window_mean(&g, p, r);
                assert!((fast - slow).abs() < 1e-9, "r={r} p={p}: {fast} vs {slow}");
            }
        }
    }

    #[test]
    fn integers_are_unscaled() {
        let g = Grid::<i32>::builder(3).fill(2).build().unwrap();
        let sat = SummedAreaTable::new(&g);
        assert_eq!(sat.scale(), 1);
        assert_eq!(sat.rect_sum(0, 0, 0, 2, 2), 18);
    }

    #[test]
    fn large_integers_survive_the_table() {
        let big = 16_777_217;
        let g = Grid::<i32>::builder(3).fill(big).build().unwrap();
        let sat = SummedAreaTable::new(&g);
        assert_eq!(sat.rect_sum(0, 0, 0, 2, 2), 9 * i64::from(big));
        assert_eq!(sat.window_value::<i32>(Point::new(1, 1), 1), big);
    }

    #[test]
    fn floats_round_to_thousandths() {
        let g = Grid::<f32>::builder(2).fill(0.0004).build().unwrap();
        let sat = SummedAreaTable::new(&g);
        assert_eq!(sat.rect_sum(0, 0, 0, 1, 1), 0);
    }
}
