//! Size-bounded filtering of 4-connected components.
//!
//! Fills are seeded from the spawn domain in iteration order and stop as
//! soon as a component reaches the size threshold. Cells of a stopped fill
//! are labelled large, so later fills that touch them stop immediately.

use strata_core::Point;
use strata_grid::Grid;

use crate::grid_helpers::neighbours4;

/// Component size filters on boolean masks.
pub trait AreaFilter {
    /// Clear true components with fewer than `min_area` cells.
    fn remove_areas_smaller_than(&mut self, min_area: usize);

    /// Clear true components with more than `max_area` cells.
    fn remove_areas_bigger_than(&mut self, max_area: usize);

    /// Clear true components whose size lies in `[min_area, max_area]`.
    fn remove_areas_in_size_range(&mut self, min_area: usize, max_area: usize);

    /// Keep only true components whose size lies in `[min_area, max_area]`.
    fn remove_areas_outside_size_range(&mut self, min_area: usize, max_area: usize);

    /// Set false components with fewer than `min_area` cells to true.
    fn fill_areas_smaller_than(&mut self, min_area: usize);
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Label {
    Unseen,
    Small,
    Large,
}

/// Overwrite every `value` component smaller than `threshold` with
/// `!value`. Returns the number of components cleared.
fn clear_small(grid: &mut Grid<bool>, value: bool, threshold: usize) -> usize {
    let size = grid.size();
    let n = grid.cell_count();
    let mut labels = vec![Label::Unseen; n];
    let mut stamps = vec![0u32; n];
    let mut fill = 0u32;
    let mut small: Vec<Vec<usize>> = Vec::new();

    for seed in grid.spawn_domain().iter() {
        let Some(start) = seed.index(size) else {
            continue;
        };
        if grid.cell(start) != value || labels[start] != Label::Unseen {
            continue;
        }
        fill += 1;
        stamps[start] = fill;
        let mut region = vec![start];
        let mut head = 0;
        let mut large = false;
        'fill: while head < region.len() {
            if region.len() >= threshold {
                large = true;
                break;
            }
            let i = region[head];
            head += 1;
            for j in neighbours4(Point::from_index(i, size), size) {
                if grid.cell(j) != value || stamps[j] == fill {
                    continue;
                }
                if labels[j] == Label::Large {
                    large = true;
                    break 'fill;
                }
                stamps[j] = fill;
                region.push(j);
            }
        }
        let label = if large { Label::Large } else { Label::Small };
        for &i in &region {
            labels[i] = label;
        }
        if !large {
            small.push(region);
        }
    }

    for region in &small {
        for &i in region {
            grid.write_orbit(Point::from_index(i, size), !value);
        }
    }
    grid.settle_symmetry();
    small.len()
}

/// Clear every cell of `grid` that is true in `mask`.
fn clear_where(grid: &mut Grid<bool>, mask: &Grid<bool>) {
    for i in 0..grid.cell_count() {
        if mask.cell(i) {
            grid.set_cell(i, false);
        }
    }
}

impl AreaFilter for Grid<bool> {
    fn remove_areas_smaller_than(&mut self, min_area: usize) {
        let removed = clear_small(self, true, min_area);
        tracing::debug!(grid = %self.name(), min_area, removed, "small areas removed");
    }

    fn remove_areas_bigger_than(&mut self, max_area: usize) {
        let mut large = self.clone();
        large.remove_areas_smaller_than(max_area.saturating_add(1));
        clear_where(self, &large);
    }

    fn remove_areas_in_size_range(&mut self, min_area: usize, max_area: usize) {
        let mut band = self.clone();
        band.remove_areas_bigger_than(max_area);
        band.remove_areas_smaller_than(min_area);
        clear_where(self, &band);
    }

    fn remove_areas_outside_size_range(&mut self, min_area: usize, max_area: usize) {
        self.remove_areas_smaller_than(min_area);
        self.remove_areas_bigger_than(max_area);
    }

    fn fill_areas_smaller_than(&mut self, min_area: usize) {
        let filled = clear_small(self, false, min_area);
        tracing::debug!(grid = %self.name(), min_area, filled, "small holes filled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use strata_symmetry::Symmetry;
    use strata_test_utils::{assert_symmetric, random_mask, reference, seeded_grid};

    /// Components of 1, 4 and 9 cells.
    fn three_blobs() -> Grid<bool> {
        let mut g = Grid::<bool>::builder(10).build().unwrap();
        g.set(0, 0, true).unwrap();
        for (x, y) in [(3, 0), (4, 0), (3, 1), (4, 1)] {
            g.set(x, y, true).unwrap();
        }
        for x in 6..9 {
            for y in 5..8 {
                g.set(x, y, true).unwrap();
            }
        }
        g
    }

    fn sorted_sizes(g: &Grid<bool>) -> Vec<usize> {
        let mut sizes = reference::component_sizes(g);
        sizes.sort_unstable();
        sizes
    }

    #[test]
    fn smaller_than_threshold_is_removed() {
        let mut g = three_blobs();
        g.remove_areas_smaller_than(4);
        assert_eq!(sorted_sizes(&g), vec![4, 9]);
    }

    #[test]
    fn bigger_than_threshold_is_removed() {
        let mut g = three_blobs();
        g.remove_areas_bigger_than(4);
        assert_eq!(sorted_sizes(&g), vec![1, 4]);
    }

    #[test]
    fn size_range_filters() {
        let mut inside = three_blobs();
        inside.remove_areas_in_size_range(2, 5);
        assert_eq!(sorted_sizes(&inside), vec![1, 9]);

        let mut outside = three_blobs();
        outside.remove_areas_outside_size_range(2, 5);
        assert_eq!(sorted_sizes(&outside), vec![4]);
    }

    #[test]
    fn small_holes_are_filled() {
        let mut g = three_blobs();
        g.invert();
        g.fill_areas_smaller_than(5);
        assert_eq!(g.count(), 100 - 9);
    }

    #[test]
    fn zero_threshold_keeps_everything() {
        let mut g = three_blobs();
        g.remove_areas_smaller_than(0);
        assert_eq!(g, three_blobs());
    }

    #[test]
    fn symmetric_filtering_stays_symmetric() {
        for sym in [Symmetry::Point2, Symmetry::Point4, Symmetry::Quad] {
            let mut g = seeded_grid::<bool>(15, sym, 2);
            for (x, y) in [(1, 1), (2, 1), (5, 7), (5, 8), (6, 7), (12, 3)] {
                g.set(x, y, true).unwrap();
            }
            g.remove_areas_smaller_than(3);
            assert_symmetric(&g);
        }
    }

    proptest! {
        #[test]
        fn removal_matches_reference(size in 1usize..24, density in 0.1f64..0.7, seed in any::<u64>(), k in 0usize..12) {
            let original = random_mask(size, density, seed);
            let mut g = original.clone();
            g.remove_areas_smaller_than(k);

            let kept: usize = reference::component_sizes(&original)
                .into_iter()
                .filter(|&s| s >= k)
                .sum();
            prop_assert_eq!(g.count(), kept);
            prop_assert!(reference::component_sizes(&g).iter().all(|&s| s >= k));

            let mut again = g.clone();
            again.remove_areas_smaller_than(k);
            prop_assert_eq!(again, g);
        }
    }
}
