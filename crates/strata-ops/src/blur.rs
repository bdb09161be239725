//! Box blur and filtered resampling.

use strata_core::{Cell, CellKind, GridError, Point};
use strata_grid::Grid;

use crate::summed_area::SummedAreaTable;

/// Default density threshold of a boolean blur.
pub const DEFAULT_DENSITY: f32 = 0.5;

/// Windowed averaging.
pub trait Blur {
    /// Replace every cell with the mean of the `(2r+1)²` window around
    /// it, clipped to the grid. Integer means round to nearest; boolean
    /// cells become true where at least half the window is true.
    fn blur(&mut self, radius: usize);
}

impl<T: Cell> Blur for Grid<T> {
    fn blur(&mut self, radius: usize) {
        if radius == 0 {
            return;
        }
        let sat = SummedAreaTable::new(self);
        let size = self.size();
        for i in 0..self.cell_count() {
            let v = sat.window_value(Point::from_index(i, size), radius);
            self.set_cell(i, v);
        }
    }
}

/// Boolean blur with an explicit threshold.
pub(crate) fn blur_bool(grid: &mut Grid<bool>, radius: usize, density: f32) -> Result<(), GridError> {
    if !(0.0..=1.0).contains(&density) {
        return Err(GridError::invalid(
            "blur",
            format!("density {density} outside [0, 1]"),
        ));
    }
    let sat = SummedAreaTable::new(grid);
    let size = grid.size();
    for i in 0..grid.cell_count() {
        let mean = sat.window_mean(Point::from_index(i, size), radius, 0);
        grid.set_cell(i, mean >= f64::from(density));
    }
    Ok(())
}

/// Resizing with anti-aliasing.
pub trait Resample: Sized {
    /// Resize to `new_size`, blurring before a downscale and after an
    /// upscale by half the scale factor.
    fn resample(&mut self, new_size: usize) -> Result<(), GridError>;
}

impl<T: Cell> Resample for Grid<T> {
    fn resample(&mut self, new_size: usize) -> Result<(), GridError> {
        if new_size == 0 {
            return Err(GridError::EmptyGrid);
        }
        let old = self.size();
        if T::KIND == CellKind::Bool {
            // Averaging a boolean mask before remapping only thins it.
            return self.resize(new_size);
        }
        if new_size < old {
            self.blur(old / new_size / 2);
            self.resize(new_size)
        } else {
            self.resize(new_size)?;
            self.blur(new_size / old / 2);
            Ok(())
        }
    }
}
