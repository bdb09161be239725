//! Conversions between cell types.

use strata_core::GridError;

use crate::grid::Grid;

impl Grid<bool> {
    /// Float grid with `high` where true and `low` where false.
    pub fn to_float(&self, low: f32, high: f32) -> Grid<f32> {
        self.map(|b| if b { high } else { low })
    }

    /// Integer grid with `1` where true.
    pub fn to_int(&self) -> Grid<i32> {
        self.map(i32::from)
    }

    /// Flip every cell.
    pub fn invert(&mut self) {
        self.buffer_mut().invert();
    }

    /// Number of true cells.
    pub fn count(&self) -> usize {
        self.buffer().count_ones()
    }

    /// Whether any cell is true.
    pub fn any(&self) -> bool {
        self.buffer().words().iter().any(|w| *w != 0)
    }
}

impl Grid<i32> {
    /// Float copy of an integer grid.
    pub fn to_float(&self) -> Grid<f32> {
        self.map(|v| v as f32)
    }
}

impl Grid<f32> {
    /// Integer copy, rounding to nearest.
    pub fn to_int(&self) -> Grid<i32> {
        self.map(|v| v.round() as i32)
    }

    /// Boolean grid, true where the value is at least `threshold`.
    pub fn to_bool(&self, threshold: f32) -> Grid<bool> {
        self.map(|v| v >= threshold)
    }

    /// Overwrite with another float grid of equal size and symmetry.
    pub fn copy_from(&mut self, other: &Grid<f32>) -> Result<(), GridError> {
        self.check_compatible(other)?;
        for i in 0..self.cell_count() {
            self.set_cell(i, other.cell(i));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invert_is_an_involution() {
        let mut g = Grid::<bool>::builder(9).build().unwrap();
        g.set(2, 3, true).unwrap();
        g.set(8, 8, true).unwrap();
        let before = g.clone();
        g.invert();
        assert_eq!(g.count(), 79);
        g.invert();
        assert_eq!(g, before);
    }

    #[test]
    fn bool_to_float() {
        let mut g = Grid::<bool>::builder(2).build().unwrap();
        g.set(1, 1, true).unwrap();
        let f = g.to_float(-1.0, 2.0);
        assert_eq!(f.get(1, 1), 2.0);
        assert_eq!(f.get(0, 0), -1.0);
        assert!(g.any());
    }
}
