//! Whole-grid summaries.

use smallvec::SmallVec;
use strata_core::{Cell, CellKind, GridError};

use crate::grid::Grid;

/// Per-component `(min, max)` pairs, one per cell component.
pub type ComponentBounds = SmallVec<[(f32, f32); 4]>;

impl<T: Cell> Grid<T> {
    fn check_summable(op: &'static str) -> Result<(), GridError> {
        if T::KIND == CellKind::Bool {
            return Err(GridError::UnsupportedCellType { op, kind: T::KIND });
        }
        Ok(())
    }

    /// Exact integer sums; floats would be scaled, so only used for
    /// integer grids.
    fn integer_sums(&self) -> SmallVec<[i64; 4]> {
        let mut sums: SmallVec<[i64; 4]> = SmallVec::from_elem(0, T::ARITY);
        for i in 0..self.cell_count() {
            let v = self.cell(i);
            for (c, s) in sums.iter_mut().enumerate() {
                *s += v.fixed_component(c, 1);
            }
        }
        sums
    }

    fn component_sums(&self) -> SmallVec<[f64; 4]> {
        let mut sums: SmallVec<[f64; 4]> = SmallVec::from_elem(0.0, T::ARITY);
        for i in 0..self.cell_count() {
            let v = self.cell(i);
            for (c, s) in sums.iter_mut().enumerate() {
                *s += f64::from(v.component(c));
            }
        }
        sums
    }

    /// Sum of all cells, componentwise for vectors. Integer sums are
    /// exact and wrap outside the `i32` range.
    ///
    /// # Errors
    ///
    /// [`GridError::UnsupportedCellType`] on boolean grids; use
    /// `count` for those.
    pub fn sum(&self) -> Result<T, GridError> {
        Self::check_summable("sum")?;
        if T::KIND == CellKind::Int {
            return Ok(T::from_fixed(&self.integer_sums(), 1));
        }
        let sums = self.component_sums();
        let comps: SmallVec<[f32; 4]> = sums.iter().map(|s| *s as f32).collect();
        Ok(T::from_components(&comps))
    }

    /// Mean cell value, componentwise for vectors. Integer means round.
    ///
    /// # Errors
    ///
    /// [`GridError::UnsupportedCellType`] on boolean grids.
    pub fn mean(&self) -> Result<T, GridError> {
        Self::check_summable("mean")?;
        if T::KIND == CellKind::Int {
            return Ok(T::from_fixed(&self.integer_sums(), self.cell_count() as i64));
        }
        let n = self.cell_count() as f64;
        let sums = self.component_sums();
        let comps: SmallVec<[f32; 4]> = sums.iter().map(|s| (*s / n) as f32).collect();
        Ok(T::from_components(&comps))
    }

    /// Smallest and largest value of each component.
    pub fn component_bounds(&self) -> ComponentBounds {
        let mut bounds: ComponentBounds =
            SmallVec::from_elem((f32::INFINITY, f32::NEG_INFINITY), T::ARITY);
        for i in 0..self.cell_count() {
            let v = self.cell(i);
            for (c, (lo, hi)) in bounds.iter_mut().enumerate() {
                let x = v.component(c);
                *lo = lo.min(x);
                *hi = hi.max(x);
            }
        }
        bounds
    }
}
