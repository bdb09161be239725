//! Exact Euclidean distance transform.
//!
//! Felzenszwalb and Huttenlocher's separable algorithm: a 1D lower
//! envelope of parabolas along every row, then along every column of the
//! row result, giving squared distances in `O(n)` per line.

use strata_grid::Grid;

/// Cost of a cell with no seed. Large but finite so the envelope
/// intersections stay well defined.
const FAR: f64 = 1e20;

/// Distance to the nearest true cell.
pub trait DistanceTransform {
    /// Euclidean distance from every cell to the nearest true cell;
    /// `f32::INFINITY` everywhere when no cell is true.
    fn distance_field(&self) -> Grid<f32>;
}

impl DistanceTransform for Grid<bool> {
    fn distance_field(&self) -> Grid<f32> {
        let size = self.size();
        let mut cost: Vec<f64> = (0..self.cell_count())
            .map(|i| if self.cell(i) { 0.0 } else { FAR })
            .collect();

        let mut scratch = Envelope::new(size);
        let mut line = vec![0.0; size];
        let mut out = vec![0.0; size];

        for y in 0..size {
            line.copy_from_slice(&cost[y * size..(y + 1) * size]);
            scratch.transform(&line, &mut out);
            cost[y * size..(y + 1) * size].copy_from_slice(&out);
        }
        for x in 0..size {
            for y in 0..size {
                line[y] = cost[y * size + x];
            }
            scratch.transform(&line, &mut out);
            for y in 0..size {
                cost[y * size + x] = out[y];
            }
        }

        let mut field = self.derive(0.0f32);
        for (i, d) in cost.into_iter().enumerate() {
            let v = if d >= FAR / 2.0 {
                f32::INFINITY
            } else {
                d.sqrt() as f32
            };
            field.set_cell(i, v);
        }
        field
    }
}

/// Reusable buffers for the 1D transform.
struct Envelope {
    /// Abscissae of the parabolas forming the envelope.
    vertices: Vec<usize>,
    /// Boundaries between consecutive envelope parabolas.
    bounds: Vec<f64>,
}

impl Envelope {
    fn new(n: usize) -> Self {
        Self {
            vertices: vec![0; n],
            bounds: vec![0.0; n + 1],
        }
    }

    /// Squared distance transform of `f` into `d`.
    fn transform(&mut self, f: &[f64], d: &mut [f64]) {
        let n = f.len();
        if n == 0 {
            return;
        }
        let v = &mut self.vertices;
        let z = &mut self.bounds;
        let mut k = 0usize;
        v[0] = 0;
        z[0] = f64::NEG_INFINITY;
        z[1] = f64::INFINITY;
        for q in 1..n {
            let qf = q as f64;
            let mut s;
            loop {
                let r = v[k] as f64;
                s = ((f[q] + qf * qf) - (f[v[k]] + r * r)) / (2.0 * qf - 2.0 * r);
                // z[0] is -inf, so this never pops the first vertex.
                if s <= z[k] {
                    k -= 1;
                } else {
                    break;
                }
            }
            k += 1;
            v[k] = q;
            z[k] = s;
            z[k + 1] = f64::INFINITY;
        }
        k = 0;
        for (q, out) in d.iter_mut().enumerate().take(n) {
            while z[k + 1] < q as f64 {
                k += 1;
            }
            let dq = q as f64 - v[k] as f64;
            *out = dq * dq + f[v[k]];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use strata_core::Point;
    use strata_test_utils::{disc_mask, random_mask, reference};

    #[test]
    fn single_seed_is_exact() {
        let n = 13;
        let c = Point::new(4, 9);
        let mut mask = Grid::<bool>::builder(n).build().unwrap();
        mask.set(c.x, c.y, true).unwrap();
        let field = mask.distance_field();
        for i in 0..n * n {
            let p = Point::from_index(i, n);
            let want = p.distance(c);
            assert!((field.cell(i) - want).abs() < 1e-5, "{p}");
        }
    }

    #[test]
    fn empty_mask_is_infinite() {
        let mask = Grid::<bool>::builder(5).build().unwrap();
        let field = mask.distance_field();
        assert!((0..25).all(|i| field.cell(i).is_infinite()));
    }

    #[test]
    fn true_cells_are_zero() {
        let mask = disc_mask(9, Point::new(4, 4), 2.0);
        let field = mask.distance_field();
        assert_eq!(field.get(4, 4), 0.0);
        assert_eq!(field.get(4, 7), 1.0);
    }

    proptest! {
        #[test]
        fn matches_brute_force(size in 1usize..20, density in 0.01f64..0.5, seed in any::<u64>()) {
            let mask = random_mask(size, density, seed);
            let field = mask.distance_field();
            let want = reference::distance_field(&mask);
            for i in 0..size * size {
                let (a, b) = (field.cell(i), want[i]);
                prop_assert!(a == b || (a - b).abs() < 1e-4, "cell {i}: {a} vs {b}");
            }
        }
    }
}
