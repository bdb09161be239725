//! Index-remap resizing.

use strata_core::{Cell, CellBuffer, GridError, Point};
use strata_symmetry::SymmetryRole;

use crate::grid::Grid;

/// Source index for target index `i` when resampling `old` cells to `new`.
///
/// Rounds symmetrically from both edges, so mirrored target cells map
/// to mirrored source cells.
pub fn remap_index(i: usize, old: usize, new: usize) -> usize {
    let j = i.min(new - 1 - i);
    let base = ((2 * j + 1) * old) / (2 * new);
    if i > j {
        old - 1 - base
    } else {
        base
    }
}

impl<T: Cell> Grid<T> {
    /// Resize to `new_size` by index remapping.
    ///
    /// Nearest-cell sampling with no filtering. Symmetry is re-applied
    /// afterwards since a parity change can break the middle row.
    ///
    /// # Errors
    ///
    /// [`GridError::EmptyGrid`] if `new_size` is 0.
    pub fn resize(&mut self, new_size: usize) -> Result<(), GridError> {
        if new_size == 0 {
            return Err(GridError::EmptyGrid);
        }
        let old = self.size();
        if new_size == old {
            return Ok(());
        }
        let map: Vec<usize> = (0..new_size)
            .map(|i| remap_index(i, old, new_size))
            .collect();
        let mut cells = T::Buffer::filled(new_size * new_size, T::zero());
        for y in 0..new_size {
            for x in 0..new_size {
                let src = Point::new(map[x] as i32, map[y] as i32);
                cells.set(y * new_size + x, self.at(src));
            }
        }
        self.replace_storage(new_size, cells);
        self.apply_symmetry(SymmetryRole::Spawn);
        tracing::debug!(grid = %self.name(), old, new = new_size, "grid resized");
        Ok(())
    }

    /// Copy resized to `new_size`.
    pub fn resized(&self, new_size: usize) -> Result<Grid<T>, GridError> {
        let mut out = self.clone();
        out.resize(new_size)?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use strata_symmetry::{Symmetry, SymmetrySettings};

    #[test]
    fn remap_doubles() {
        let m: Vec<usize> = (0..8).map(|i| remap_index(i, 4, 8)).collect();
        assert_eq!(m, vec![0, 0, 1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn remap_halves() {
        let m: Vec<usize> = (0..4).map(|i| remap_index(i, 8, 4)).collect();
        assert_eq!(m, vec![1, 3, 4, 6]);
    }

    #[test]
    fn resize_keeps_symmetry_across_parity() {
        let mut g = Grid::<i32>::builder(6)
            .symmetry(SymmetrySettings::uniform(Symmetry::Point4))
            .build()
            .unwrap();
        g.set(0, 1, 3).unwrap();
        g.set(2, 2, 7).unwrap();
        g.resize(9).unwrap();
        assert_eq!(g.size(), 9);
        assert!(g.is_symmetric());
    }

    #[test]
    fn zero_size_rejected() {
        let mut g = Grid::<f32>::builder(4).build().unwrap();
        assert_eq!(g.resize(0), Err(GridError::EmptyGrid));
        assert_eq!(g.size(), 4);
    }

    proptest! {
        #[test]
        fn remap_is_mirror_symmetric(old in 1usize..64, new in 1usize..64) {
            for i in 0..new {
                let a = remap_index(i, old, new);
                prop_assert!(a < old);
                // The middle cell of an odd target has no mirror partner.
                if 2 * i + 1 != new {
                    let b = remap_index(new - 1 - i, old, new);
                    prop_assert_eq!(a, old - 1 - b);
                }
            }
        }
    }
}
