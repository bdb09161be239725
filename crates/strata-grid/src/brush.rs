//! Brush input seam.
//!
//! Brushes are small float grids supplied from outside the engine and
//! stamped onto height fields. Where they come from is up to the
//! [`BrushSource`] implementation.

use std::collections::HashMap;
use std::error::Error;

use strata_core::{GridError, Point};

use crate::grid::Grid;
use crate::placement::Placement;

/// Supplies brushes by name.
pub trait BrushSource {
    /// Error raised when a brush cannot be produced.
    type Error: Error + Send + Sync + 'static;

    /// Load the brush called `name`.
    fn load(&self, name: &str) -> Result<Grid<f32>, Self::Error>;
}

/// Brushes held in memory, keyed by name.
#[derive(Clone, Debug, Default)]
pub struct MemoryBrushes {
    brushes: HashMap<String, Grid<f32>>,
}

impl MemoryBrushes {
    /// Empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `brush` under `name`, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, brush: Grid<f32>) {
        self.brushes.insert(name.into(), brush);
    }
}

impl BrushSource for MemoryBrushes {
    type Error = GridError;

    fn load(&self, name: &str) -> Result<Grid<f32>, GridError> {
        self.brushes
            .get(name)
            .cloned()
            .ok_or_else(|| GridError::invalid("load_brush", format!("unknown brush '{name}'")))
    }
}

impl Grid<f32> {
    /// Add `brush` centred on `center`, resized to `footprint` cells and
    /// scaled by `intensity`.
    ///
    /// The stamp goes through offset placement, so it is mirrored like
    /// any other stamp.
    pub fn stamp_brush(
        &mut self,
        brush: &Grid<f32>,
        footprint: usize,
        center: Point,
        intensity: f32,
    ) -> Result<(), GridError> {
        let mut stamp = brush.resized(footprint)?;
        stamp.multiply_value(intensity)?;
        self.add_with_offset(&stamp, Placement::at(center).centered())
    }
}
