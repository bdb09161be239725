//! Closing and widening narrow false gaps between true regions.
//!
//! Both operations find the ridge of each narrow gap as local maxima of
//! the distance field, thicken the ridge by half the gap width, and then
//! add it to or subtract it from the mask.

use strata_core::GridError;
use strata_grid::Grid;

use crate::distance::DistanceTransform;
use crate::morphology::Morphology;

/// Gap manipulation on boolean masks.
pub trait Gaps {
    /// Fill false gaps narrower than `min_gap`.
    fn fill_gaps(&mut self, min_gap: f32) -> Result<(), GridError>;

    /// Clear true cells until every false gap narrower than `min_gap`
    /// is at least that wide.
    fn widen_gaps(&mut self, min_gap: f32) -> Result<(), GridError>;
}

fn gap_ridges(mask: &Grid<bool>, min_gap: f32, op: &'static str) -> Result<Grid<bool>, GridError> {
    if !(min_gap >= 0.0) {
        return Err(GridError::invalid(op, format!("gap width {min_gap} is negative")));
    }
    let half = min_gap / 2.0;
    let mut ridges = mask.distance_field().local_maxima(1.0, half);
    ridges.inflate(half);
    Ok(ridges)
}

impl Gaps for Grid<bool> {
    fn fill_gaps(&mut self, min_gap: f32) -> Result<(), GridError> {
        let ridges = gap_ridges(self, min_gap, "fill_gaps")?;
        self.add(&ridges)
    }

    fn widen_gaps(&mut self, min_gap: f32) -> Result<(), GridError> {
        let ridges = gap_ridges(self, min_gap, "widen_gaps")?;
        self.subtract(&ridges)
    }
}
