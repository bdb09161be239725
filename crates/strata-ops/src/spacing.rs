//! Greedy spaced point selection.

use rand::Rng;
use strata_core::{GridError, Point};
use strata_grid::Grid;
use strata_symmetry::SymmetryRole;

/// Spaced subsets of a boolean mask.
pub trait Spacing {
    /// Pick true spawn-domain cells greedily: take a random remaining
    /// candidate, then drop every candidate closer than a spacing drawn
    /// from `[min_spacing, max_spacing]` to it or to any of its
    /// counterparts. Returns the picks, one per orbit.
    fn random_coordinates(
        &mut self,
        min_spacing: f32,
        max_spacing: f32,
    ) -> Result<Vec<Point>, GridError>;

    /// Replace the mask with the orbits of
    /// [`random_coordinates`](Spacing::random_coordinates).
    fn space(&mut self, min_spacing: f32, max_spacing: f32) -> Result<(), GridError>;
}

impl Spacing for Grid<bool> {
    fn random_coordinates(
        &mut self,
        min_spacing: f32,
        max_spacing: f32,
    ) -> Result<Vec<Point>, GridError> {
        if !(min_spacing >= 0.0 && min_spacing <= max_spacing && max_spacing.is_finite()) {
            return Err(GridError::invalid(
                "random_coordinates",
                format!("spacing range {min_spacing}..{max_spacing} is not ordered and non-negative"),
            ));
        }
        let size = self.size();
        let symmetry = *self.symmetry();
        let mut candidates: Vec<Point> = self
            .spawn_domain()
            .iter()
            .filter(|&p| self.at(p))
            .collect();
        let rng = self.rng_mut()?;
        let mut picked = Vec::new();
        while !candidates.is_empty() {
            let p = candidates.swap_remove(rng.gen_range(0..candidates.len()));
            let spacing = rng.gen_range(min_spacing..=max_spacing);
            let mut anchors = symmetry.points_unbounded(SymmetryRole::Spawn, p, size);
            anchors.push(p);
            candidates.retain(|c| anchors.iter().all(|a| c.distance(*a) >= spacing));
            picked.push(p);
        }
        tracing::debug!(grid = %self.name(), picked = picked.len(), "spaced coordinates chosen");
        Ok(picked)
    }

    fn space(&mut self, min_spacing: f32, max_spacing: f32) -> Result<(), GridError> {
        let picked = self.random_coordinates(min_spacing, max_spacing)?;
        self.fill(false);
        for p in picked {
            self.write_orbit(p, true);
        }
        self.settle_symmetry();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_symmetry::Symmetry;
    use strata_test_utils::{assert_symmetric, seeded_grid};

    fn full(size: usize, sym: Symmetry, seed: u64) -> Grid<bool> {
        let mut g = seeded_grid::<bool>(size, sym, seed);
        g.fill(true);
        g
    }

    #[test]
    fn picks_respect_spacing_and_cover_the_mask() {
        let mut g = full(32, Symmetry::None, 8);
        let picks = g.random_coordinates(4.0, 6.0).unwrap();
        assert!(picks.len() > 1);
        for (i, a) in picks.iter().enumerate() {
            for b in &picks[i + 1..] {
                assert!(a.distance(*b) >= 4.0, "{a} and {b} too close");
            }
        }
        for i in 0..g.cell_count() {
            let p = Point::from_index(i, 32);
            assert!(picks.iter().any(|q| p.distance(*q) < 6.0 || p == *q));
        }
    }

    #[test]
    fn zero_spacing_keeps_every_candidate() {
        let mut g = full(6, Symmetry::None, 1);
        let picks = g.random_coordinates(0.0, 0.0).unwrap();
        assert_eq!(picks.len(), 36);
    }

    #[test]
    fn only_true_cells_are_candidates() {
        let mut g = seeded_grid::<bool>(10, Symmetry::None, 2);
        g.set(3, 4, true).unwrap();
        assert_eq!(g.random_coordinates(1.0, 2.0).unwrap(), vec![Point::new(3, 4)]);
    }

    #[test]
    fn space_is_symmetric() {
        for sym in [Symmetry::Point2, Symmetry::Point4, Symmetry::Diag] {
            let mut g = full(24, sym, 6);
            g.space(3.0, 5.0).unwrap();
            assert_symmetric(&g);
            assert!(g.any());
        }
    }

    #[test]
    fn invalid_ranges_fail() {
        let mut g = full(8, Symmetry::None, 0);
        assert!(g.random_coordinates(3.0, 2.0).is_err());
        assert!(g.random_coordinates(-1.0, 2.0).is_err());
        assert!(g.random_coordinates(1.0, f32::INFINITY).is_err());
        let mut unseeded = Grid::<bool>::builder(4).fill(true).build().unwrap();
        assert!(matches!(
            unseeded.space(1.0, 2.0),
            Err(GridError::MissingSeed { .. })
        ));
    }
}
