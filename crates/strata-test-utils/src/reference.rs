//! Brute-force reference implementations.

use std::collections::VecDeque;

use strata_core::{Cell, Point};
use strata_grid::Grid;

/// Mean of component 0 over the `(2r+1)²` window around `p`, clipped.
pub fn window_mean<T: Cell>(grid: &Grid<T>, p: Point, radius: usize) -> f64 {
    let r = radius as i32;
    let mut sum = 0.0f64;
    let mut n = 0usize;
    for y in p.y - r..=p.y + r {
        for x in p.x - r..=p.x + r {
            let q = Point::new(x, y);
            if grid.in_bounds(q) {
                sum += f64::from(grid.at(q).component(0));
                n += 1;
            }
        }
    }
    sum / n as f64
}

/// Distance from every cell to the nearest true cell, by exhaustive
/// search. `f32::INFINITY` when no cell is true.
pub fn distance_field(mask: &Grid<bool>) -> Vec<f32> {
    let size = mask.size();
    let seeds: Vec<Point> = (0..mask.cell_count())
        .filter(|&i| mask.cell(i))
        .map(|i| Point::from_index(i, size))
        .collect();
    (0..mask.cell_count())
        .map(|i| {
            let p = Point::from_index(i, size);
            seeds
                .iter()
                .map(|s| p.distance(*s))
                .fold(f32::INFINITY, f32::min)
        })
        .collect()
}

/// Sizes of the 4-connected true components, in discovery order.
pub fn component_sizes(mask: &Grid<bool>) -> Vec<usize> {
    let size = mask.size();
    let mut seen = vec![false; mask.cell_count()];
    let mut sizes = Vec::new();
    for start in 0..mask.cell_count() {
        if seen[start] || !mask.cell(start) {
            continue;
        }
        seen[start] = true;
        let mut queue = VecDeque::from([start]);
        let mut count = 0;
        while let Some(i) = queue.pop_front() {
            count += 1;
            let p = Point::from_index(i, size);
            for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
                if let Some(j) = p.offset(dx, dy).index(size) {
                    if !seen[j] && mask.cell(j) {
                        seen[j] = true;
                        queue.push_back(j);
                    }
                }
            }
        }
        sizes.push(count);
    }
    sizes
}
