//! Raster export into `image` buffers.
//!
//! Scalar grids map to one luminance channel, vector grids to RGBA with
//! each component rescaled by its own range. Pixel `(x, y)` is cell
//! `(x, y)`.

use image::{GrayImage, ImageBuffer, Luma, Rgba, RgbaImage};
use strata_core::{Cell, CellKind, GridError};

use crate::grid::Grid;

/// Single-channel float image.
pub type Luma32FImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// How scalar cell values map onto the output range.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum RasterScale {
    /// Rescale the grid's own `[min, max]` onto the full output range.
    #[default]
    Auto,
    /// `value * scale + offset`, in units of the full output range
    /// (`1.0` is white), clamped.
    Linear {
        /// Multiplier.
        scale: f32,
        /// Added after scaling.
        offset: f32,
    },
}

impl RasterScale {
    fn unit(self, v: f32, lo: f32, hi: f32) -> f32 {
        let u = match self {
            Self::Auto if hi > lo => (v - lo) / (hi - lo),
            Self::Auto => 0.0,
            Self::Linear { scale, offset } => v * scale + offset,
        };
        u.clamp(0.0, 1.0)
    }
}

fn to_u8(unit: f32) -> u8 {
    (unit * 255.0).round() as u8
}

impl<T: Cell> Grid<T> {
    fn scalar_units(&self, op: &'static str, scale: RasterScale) -> Result<Vec<f32>, GridError> {
        if T::ARITY != 1 {
            return Err(GridError::UnsupportedCellType { op, kind: T::KIND });
        }
        if T::KIND == CellKind::Bool {
            return Ok((0..self.cell_count())
                .map(|i| self.cell(i).component(0))
                .collect());
        }
        let (lo, hi) = self.component_bounds()[0];
        Ok((0..self.cell_count())
            .map(|i| scale.unit(self.cell(i).component(0), lo, hi))
            .collect())
    }

    /// 8-bit greyscale image. Booleans map to 0/255 regardless of
    /// `scale`.
    ///
    /// # Errors
    ///
    /// [`GridError::UnsupportedCellType`] for vector grids.
    pub fn to_luma8(&self, scale: RasterScale) -> Result<GrayImage, GridError> {
        let units = self.scalar_units("to_luma8", scale)?;
        let size = self.size() as u32;
        Ok(GrayImage::from_fn(size, size, |x, y| {
            Luma([to_u8(units[(y * size + x) as usize])])
        }))
    }

    /// 32-bit float greyscale image with values in `[0, 1]`.
    pub fn to_luma32f(&self, scale: RasterScale) -> Result<Luma32FImage, GridError> {
        let units = self.scalar_units("to_luma32f", scale)?;
        let size = self.size() as u32;
        Ok(Luma32FImage::from_fn(size, size, |x, y| {
            Luma([units[(y * size + x) as usize]])
        }))
    }

    /// RGBA image from a vector grid. Components beyond the fourth are
    /// dropped; missing ones are 0, alpha defaults to opaque.
    ///
    /// # Errors
    ///
    /// [`GridError::UnsupportedCellType`] for scalar grids.
    pub fn to_rgba8(&self) -> Result<RgbaImage, GridError> {
        if !matches!(T::KIND, CellKind::Vector(_)) {
            return Err(GridError::UnsupportedCellType {
                op: "to_rgba8",
                kind: T::KIND,
            });
        }
        let bounds = self.component_bounds();
        let size = self.size() as u32;
        Ok(RgbaImage::from_fn(size, size, |x, y| {
            let v = self.cell((y * size + x) as usize);
            let mut px = [0u8, 0, 0, 255];
            for (c, slot) in px.iter_mut().enumerate().take(T::ARITY) {
                let (lo, hi) = bounds[c];
                *slot = to_u8(RasterScale::Auto.unit(v.component(c), lo, hi));
            }
            Rgba(px)
        }))
    }
}
