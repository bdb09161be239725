//! Stamping one grid onto another at an offset.

use indexmap::IndexMap;
use strata_core::{Cell, GridError, Point};
use strata_symmetry::SymmetryRole;

use crate::algebra::BinaryOp;
use crate::grid::Grid;

/// Where and how a source grid lands on a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Placement {
    /// Target coordinate of the source's corner, or of its centre when
    /// `centered` is set.
    pub offset: Point,
    /// Treat `offset` as the centre of the source.
    pub centered: bool,
    /// Wrap target coordinates modulo the target size instead of
    /// clipping them.
    pub wrap: bool,
}

impl Placement {
    /// Corner placement at `offset`, clipped at the edges.
    pub fn at(offset: Point) -> Self {
        Self {
            offset,
            centered: false,
            wrap: false,
        }
    }

    /// Treat the offset as the source centre.
    pub fn centered(mut self) -> Self {
        self.centered = true;
        self
    }

    /// Wrap around the target edges.
    pub fn wrapped(mut self) -> Self {
        self.wrap = true;
        self
    }

    fn origin(&self, offset: Point, source_size: usize) -> Point {
        if self.centered {
            let half = (source_size / 2) as i32;
            offset.offset(-half, -half)
        } else {
            offset
        }
    }

    fn resolve(&self, p: Point, size: usize) -> Option<Point> {
        if self.wrap {
            let s = size as i32;
            Some(Point::new(p.x.rem_euclid(s), p.y.rem_euclid(s)))
        } else if p.in_bounds(size) {
            Some(p)
        } else {
            None
        }
    }
}

impl<T: Cell> Grid<T> {
    /// Combine `source` into this grid at `placement`.
    ///
    /// With a perfect spawn group each target cell is folded onto its
    /// orbit representative; hits on one representative are applied in
    /// source order and the result is written to the whole orbit, so a
    /// single stamp stays symmetric. With an imperfect group the stamp is
    /// repeated at the offset and at each raw counterpart of the offset.
    ///
    /// # Errors
    ///
    /// [`GridError::DivisionByZero`] for integer division by a zero
    /// source cell that lands on the grid. Nothing is written in that
    /// case.
    pub fn combine_with_offset(
        &mut self,
        source: &Grid<T>,
        placement: Placement,
        op: BinaryOp,
    ) -> Result<(), GridError> {
        let size = self.size();
        let spawn = self.symmetry().spawn();
        let mut hits: IndexMap<usize, T> = IndexMap::new();

        if spawn.is_perfect() {
            let domain = self.spawn_domain();
            let origin = placement.origin(placement.offset, source.size());
            self.accumulate(source, origin, placement, op, &mut hits, |p| {
                domain.representative(p)
            })?;
            for (i, v) in hits {
                self.write_orbit(Point::from_index(i, size), v);
            }
        } else {
            let mut offsets = vec![placement.offset];
            offsets.extend(self.symmetry().points_unbounded(
                SymmetryRole::Spawn,
                placement.offset,
                size,
            ));
            for offset in offsets {
                let origin = placement.origin(offset, source.size());
                self.accumulate(source, origin, placement, op, &mut hits, |p| p)?;
            }
            for (i, v) in hits {
                self.set_cell(i, v);
            }
        }
        Ok(())
    }

    fn accumulate(
        &self,
        source: &Grid<T>,
        origin: Point,
        placement: Placement,
        op: BinaryOp,
        hits: &mut IndexMap<usize, T>,
        fold: impl Fn(Point) -> Point,
    ) -> Result<(), GridError> {
        let size = self.size();
        for j in 0..source.cell_count() {
            let sp = Point::from_index(j, source.size());
            let Some(target) = placement.resolve(origin.offset(sp.x, sp.y), size) else {
                continue;
            };
            let Some(i) = fold(target).index(size) else {
                continue;
            };
            let current = hits.get(&i).copied().unwrap_or_else(|| self.cell(i));
            let next = op
                .apply(current, source.cell(j))
                .ok_or(GridError::DivisionByZero { point: sp })?;
            hits.insert(i, next);
        }
        Ok(())
    }

    /// `self += source` at `placement`.
    pub fn add_with_offset(
        &mut self,
        source: &Grid<T>,
        placement: Placement,
    ) -> Result<(), GridError> {
        self.combine_with_offset(source, placement, BinaryOp::Add)
    }

    /// `self -= source` at `placement`.
    pub fn subtract_with_offset(
        &mut self,
        source: &Grid<T>,
        placement: Placement,
    ) -> Result<(), GridError> {
        self.combine_with_offset(source, placement, BinaryOp::Subtract)
    }

    /// `self *= source` at `placement`.
    pub fn multiply_with_offset(
        &mut self,
        source: &Grid<T>,
        placement: Placement,
    ) -> Result<(), GridError> {
        self.combine_with_offset(source, placement, BinaryOp::Multiply)
    }

    /// `self /= source` at `placement`.
    pub fn divide_with_offset(
        &mut self,
        source: &Grid<T>,
        placement: Placement,
    ) -> Result<(), GridError> {
        self.combine_with_offset(source, placement, BinaryOp::Divide)
    }

    /// Overwrite with `source` at `placement`.
    pub fn place(&mut self, source: &Grid<T>, placement: Placement) -> Result<(), GridError> {
        self.combine_with_offset(source, placement, BinaryOp::Replace)
    }
}
