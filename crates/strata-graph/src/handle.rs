//! Typed and untyped references to grids owned by a pipeline.

use std::fmt;
use std::marker::PhantomData;

use strata_core::{Cell, GridId, PipelineId};

/// Typed handle to a grid inside a [`Pipeline`](crate::Pipeline).
///
/// Handles are cheap to copy and only meaningful to the pipeline that
/// issued them.
pub struct GridHandle<T: Cell> {
    pub(crate) pipeline: PipelineId,
    pub(crate) grid: GridId,
    _cell: PhantomData<fn() -> T>,
}

impl<T: Cell> GridHandle<T> {
    pub(crate) fn new(pipeline: PipelineId, grid: GridId) -> Self {
        Self {
            pipeline,
            grid,
            _cell: PhantomData,
        }
    }

    /// Id of the grid within its pipeline.
    pub fn id(&self) -> GridId {
        self.grid
    }

    /// Untyped reference for declaring dependencies.
    pub fn to_ref(self) -> GridRef {
        GridRef {
            pipeline: self.pipeline,
            grid: self.grid,
        }
    }
}

impl<T: Cell> Clone for GridHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: Cell> Copy for GridHandle<T> {}

impl<T: Cell> PartialEq for GridHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.pipeline == other.pipeline && self.grid == other.grid
    }
}

impl<T: Cell> Eq for GridHandle<T> {}

impl<T: Cell> fmt::Debug for GridHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GridHandle")
            .field("pipeline", &self.pipeline)
            .field("grid", &self.grid)
            .field("cell", &std::any::type_name::<T>())
            .finish()
    }
}

/// Untyped grid reference, used to declare node dependencies.
///
/// Only obtainable from a [`GridHandle`], so a grid outside the pipeline
/// can never be declared as a dependency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GridRef {
    pub(crate) pipeline: PipelineId,
    pub(crate) grid: GridId,
}

impl GridRef {
    /// Id of the grid within its pipeline.
    pub fn id(&self) -> GridId {
        self.grid
    }
}

impl<T: Cell> From<GridHandle<T>> for GridRef {
    fn from(h: GridHandle<T>) -> Self {
        h.to_ref()
    }
}

impl<T: Cell> From<&GridHandle<T>> for GridRef {
    fn from(h: &GridHandle<T>) -> Self {
        h.to_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_copy_and_convert() {
        let pipeline = PipelineId::next();
        let h = GridHandle::<f32>::new(pipeline, GridId(4));
        let copy = h;
        assert_eq!(h, copy);
        let r: GridRef = (&h).into();
        assert_eq!(r.id(), GridId(4));
        assert_eq!(r, copy.to_ref());
    }
}
