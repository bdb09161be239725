//! Elementwise grid algebra.
//!
//! Binary operations require equal size and equal symmetry settings.
//! All checks, including integer division by zero, happen before the
//! first cell is written, so a failed call leaves the target untouched.
//! Combining two symmetric grids cell by cell yields a symmetric grid,
//! so no symmetry pass follows.

use std::fmt;

use strata_core::{Cell, CellKind, GridError, Point};

use crate::grid::Grid;

/// An elementwise combination of a target cell with an operand cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `target + operand` (OR for booleans).
    Add,
    /// `target - operand` (AND-NOT for booleans).
    Subtract,
    /// `target * operand` (AND for booleans).
    Multiply,
    /// `target / operand` (XOR for booleans).
    Divide,
    /// Overwrite the target with the operand.
    Replace,
}

impl BinaryOp {
    /// Combine two cells. `None` when undefined (integer division by zero).
    pub fn apply<T: Cell>(self, target: T, operand: T) -> Option<T> {
        match self {
            Self::Add => Some(target.plus(operand)),
            Self::Subtract => Some(target.minus(operand)),
            Self::Multiply => Some(target.times(operand)),
            Self::Divide => target.divided_by(operand),
            Self::Replace => Some(operand),
        }
    }

    /// Whether `operand` could make this op undefined for `T`.
    pub(crate) fn may_fail<T: Cell>(self) -> bool {
        self == Self::Divide && T::KIND == CellKind::Int
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Add => write!(f, "add"),
            Self::Subtract => write!(f, "subtract"),
            Self::Multiply => write!(f, "multiply"),
            Self::Divide => write!(f, "divide"),
            Self::Replace => write!(f, "replace"),
        }
    }
}

impl<T: Cell> Grid<T> {
    /// Combine with `other` cell by cell, optionally only where `mask` is
    /// true.
    pub fn combine(
        &mut self,
        other: &Grid<T>,
        mask: Option<&Grid<bool>>,
        op: BinaryOp,
    ) -> Result<(), GridError> {
        self.check_compatible(other)?;
        if let Some(mask) = mask {
            self.check_compatible(mask)?;
        }
        let selected = |i: usize| mask.is_none_or(|m| m.cell(i));
        if op.may_fail::<T>() {
            let zero = (0..self.cell_count())
                .filter(|&i| selected(i))
                .find(|&i| op.apply(self.cell(i), other.cell(i)).is_none());
            if let Some(i) = zero {
                return Err(GridError::DivisionByZero {
                    point: Point::from_index(i, self.size()),
                });
            }
        }
        for i in 0..self.cell_count() {
            if !selected(i) {
                continue;
            }
            if let Some(v) = op.apply(self.cell(i), other.cell(i)) {
                self.set_cell(i, v);
            }
        }
        Ok(())
    }

    /// Combine every cell with a constant.
    pub fn combine_value(&mut self, value: T, op: BinaryOp) -> Result<(), GridError> {
        if op.may_fail::<T>() && op.apply(T::zero(), value).is_none() {
            return Err(GridError::invalid("divide_value", "divisor is zero"));
        }
        for i in 0..self.cell_count() {
            if let Some(v) = op.apply(self.cell(i), value) {
                self.set_cell(i, v);
            }
        }
        Ok(())
    }

    /// `self += other`.
    pub fn add(&mut self, other: &Grid<T>) -> Result<(), GridError> {
        self.combine(other, None, BinaryOp::Add)
    }

    /// `self -= other`.
    pub fn subtract(&mut self, other: &Grid<T>) -> Result<(), GridError> {
        self.combine(other, None, BinaryOp::Subtract)
    }

    /// `self *= other`.
    pub fn multiply(&mut self, other: &Grid<T>) -> Result<(), GridError> {
        self.combine(other, None, BinaryOp::Multiply)
    }

    /// `self /= other`.
    pub fn divide(&mut self, other: &Grid<T>) -> Result<(), GridError> {
        self.combine(other, None, BinaryOp::Divide)
    }

    /// `self += other` where `mask` is true.
    pub fn add_masked(&mut self, other: &Grid<T>, mask: &Grid<bool>) -> Result<(), GridError> {
        self.combine(other, Some(mask), BinaryOp::Add)
    }

    /// `self -= other` where `mask` is true.
    pub fn subtract_masked(
        &mut self,
        other: &Grid<T>,
        mask: &Grid<bool>,
    ) -> Result<(), GridError> {
        self.combine(other, Some(mask), BinaryOp::Subtract)
    }

    /// `self *= other` where `mask` is true.
    pub fn multiply_masked(
        &mut self,
        other: &Grid<T>,
        mask: &Grid<bool>,
    ) -> Result<(), GridError> {
        self.combine(other, Some(mask), BinaryOp::Multiply)
    }

    /// `self /= other` where `mask` is true.
    pub fn divide_masked(&mut self, other: &Grid<T>, mask: &Grid<bool>) -> Result<(), GridError> {
        self.combine(other, Some(mask), BinaryOp::Divide)
    }

    /// Copy `other` into `self` where `mask` is true.
    pub fn replace_masked(
        &mut self,
        other: &Grid<T>,
        mask: &Grid<bool>,
    ) -> Result<(), GridError> {
        self.combine(other, Some(mask), BinaryOp::Replace)
    }

    /// Add a constant to every cell.
    pub fn add_value(&mut self, value: T) -> Result<(), GridError> {
        self.combine_value(value, BinaryOp::Add)
    }

    /// Subtract a constant from every cell.
    pub fn subtract_value(&mut self, value: T) -> Result<(), GridError> {
        self.combine_value(value, BinaryOp::Subtract)
    }

    /// Multiply every cell by a constant.
    pub fn multiply_value(&mut self, value: T) -> Result<(), GridError> {
        self.combine_value(value, BinaryOp::Multiply)
    }

    /// Divide every cell by a constant.
    pub fn divide_value(&mut self, value: T) -> Result<(), GridError> {
        self.combine_value(value, BinaryOp::Divide)
    }
}
