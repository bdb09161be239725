//! Cell types stored in grids.
//!
//! The set of cell types is closed: `bool`, `i32`, `f32` and the
//! fixed-arity float vectors [`Vec2`], [`Vec3`], [`Vec4`]. Each type
//! picks its storage through [`Cell::Buffer`], which is how boolean
//! grids end up bit-packed while everything else is stored densely.

use std::fmt;

use crate::buffer::{BitBuffer, CellBuffer, DenseBuffer};

/// Runtime tag for a cell type, used in errors and diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// `bool`, bit-packed.
    Bool,
    /// `i32`.
    Int,
    /// `f32`.
    Float,
    /// `Vector<N>` with the given arity.
    Vector(usize),
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Int => write!(f, "int"),
            Self::Float => write!(f, "float"),
            Self::Vector(n) => write!(f, "vec{n}"),
        }
    }
}

/// A value that can be stored in a grid cell.
///
/// The four arithmetic hooks define elementwise grid algebra. For
/// `bool` they are logical: `plus` is OR, `minus` is AND-NOT, `times`
/// is AND and `divided_by` is XOR.
pub trait Cell: Copy + PartialEq + fmt::Debug + Send + Sync + 'static {
    /// Runtime tag of this cell type.
    const KIND: CellKind;
    /// Number of scalar components.
    const ARITY: usize;
    /// Backing storage for a grid of this cell type.
    type Buffer: CellBuffer<Self>;

    /// Additive identity (`false` for booleans).
    fn zero() -> Self;

    /// Elementwise addition.
    fn plus(self, rhs: Self) -> Self;

    /// Elementwise subtraction.
    fn minus(self, rhs: Self) -> Self;

    /// Elementwise multiplication.
    fn times(self, rhs: Self) -> Self;

    /// Elementwise division. `None` when the division is undefined
    /// (integer division by zero).
    fn divided_by(self, rhs: Self) -> Option<Self>;

    /// Scalar component `index` as `f32` (`0.0`/`1.0` for booleans).
    fn component(&self, index: usize) -> f32;

    /// Build a value from `ARITY` scalar components. Integers round to
    /// nearest, booleans are `true` from `0.5` up.
    fn from_components(components: &[f32]) -> Self;

    /// Component `index` in fixed point. Booleans and integers are exact
    /// and ignore `scale`; float components are multiplied by `scale`
    /// and rounded.
    fn fixed_component(&self, index: usize, scale: i64) -> i64;

    /// Build a value from `ARITY` fixed-point sums divided by `divisor`,
    /// which must be positive and already include any float scale.
    /// Integers divide exactly, rounding half away from zero, and wrap
    /// outside the `i32` range; booleans are `true` from half up.
    fn from_fixed(sums: &[i64], divisor: i64) -> Self;

    /// Append the fixed little-endian byte layout of this value.
    fn write_le_bytes(&self, out: &mut Vec<u8>);
}

/// Cell types with a total-enough order for extrema and clamping.
pub trait Ordered: Cell + PartialOrd {
    /// Smallest representable value.
    fn lowest() -> Self;
    /// Largest representable value.
    fn highest() -> Self;
}

impl Cell for bool {
    const KIND: CellKind = CellKind::Bool;
    const ARITY: usize = 1;
    type Buffer = BitBuffer;

    fn zero() -> Self {
        false
    }

    fn plus(self, rhs: Self) -> Self {
        self | rhs
    }

    fn minus(self, rhs: Self) -> Self {
        self & !rhs
    }

    fn times(self, rhs: Self) -> Self {
        self & rhs
    }

    fn divided_by(self, rhs: Self) -> Option<Self> {
        Some(self ^ rhs)
    }

    fn component(&self, _index: usize) -> f32 {
        if *self {
            1.0
        } else {
            0.0
        }
    }

    fn from_components(components: &[f32]) -> Self {
        components[0] >= 0.5
    }

    fn fixed_component(&self, _index: usize, _scale: i64) -> i64 {
        i64::from(*self)
    }

    fn from_fixed(sums: &[i64], divisor: i64) -> Self {
        2 * sums[0] >= divisor
    }

    fn write_le_bytes(&self, out: &mut Vec<u8>) {
        out.push(u8::from(*self));
    }
}

impl Cell for i32 {
    const KIND: CellKind = CellKind::Int;
    const ARITY: usize = 1;
    type Buffer = DenseBuffer<i32>;

    fn zero() -> Self {
        0
    }

    fn plus(self, rhs: Self) -> Self {
        self.wrapping_add(rhs)
    }

    fn minus(self, rhs: Self) -> Self {
        self.wrapping_sub(rhs)
    }

    fn times(self, rhs: Self) -> Self {
        self.wrapping_mul(rhs)
    }

    fn divided_by(self, rhs: Self) -> Option<Self> {
        if rhs == 0 {
            None
        } else {
            Some(self.wrapping_div(rhs))
        }
    }

    fn component(&self, _index: usize) -> f32 {
        *self as f32
    }

    fn from_components(components: &[f32]) -> Self {
        components[0].round() as i32
    }

    fn fixed_component(&self, _index: usize, _scale: i64) -> i64 {
        i64::from(*self)
    }

    fn from_fixed(sums: &[i64], divisor: i64) -> Self {
        div_round(sums[0], divisor) as i32
    }

    fn write_le_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl Ordered for i32 {
    fn lowest() -> Self {
        i32::MIN
    }

    fn highest() -> Self {
        i32::MAX
    }
}

impl Cell for f32 {
    const KIND: CellKind = CellKind::Float;
    const ARITY: usize = 1;
    type Buffer = DenseBuffer<f32>;

    fn zero() -> Self {
        0.0
    }

    fn plus(self, rhs: Self) -> Self {
        self + rhs
    }

    fn minus(self, rhs: Self) -> Self {
        self - rhs
    }

    fn times(self, rhs: Self) -> Self {
        self * rhs
    }

    fn divided_by(self, rhs: Self) -> Option<Self> {
        Some(self / rhs)
    }

    fn component(&self, _index: usize) -> f32 {
        *self
    }

    fn from_components(components: &[f32]) -> Self {
        components[0]
    }

    fn fixed_component(&self, _index: usize, scale: i64) -> i64 {
        scale_float(*self, scale)
    }

    fn from_fixed(sums: &[i64], divisor: i64) -> Self {
        (sums[0] as f64 / divisor as f64) as f32
    }

    fn write_le_bytes(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl Ordered for f32 {
    fn lowest() -> Self {
        f32::NEG_INFINITY
    }

    fn highest() -> Self {
        f32::INFINITY
    }
}

fn scale_float(v: f32, scale: i64) -> i64 {
    (f64::from(v) * scale as f64).round() as i64
}

/// `n / d` rounded half away from zero, for `d > 0`.
fn div_round(n: i64, d: i64) -> i64 {
    let q = n / d;
    let r = n % d;
    if 2 * r.abs() >= d {
        q + n.signum()
    } else {
        q
    }
}

/// Fixed-arity float vector cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector<const N: usize>(pub [f32; N]);

/// Two-component vector cell.
pub type Vec2 = Vector<2>;
/// Three-component vector cell (normals, colours).
pub type Vec3 = Vector<3>;
/// Four-component vector cell.
pub type Vec4 = Vector<4>;

impl<const N: usize> Vector<N> {
    /// Vector with every component set to `value`.
    pub fn splat(value: f32) -> Self {
        Self([value; N])
    }

    /// Apply `f` to each pair of components.
    fn zip_with(self, rhs: Self, f: impl Fn(f32, f32) -> f32) -> Self {
        let mut out = self.0;
        for (o, r) in out.iter_mut().zip(rhs.0) {
            *o = f(*o, r);
        }
        Self(out)
    }
}

impl<const N: usize> Default for Vector<N> {
    fn default() -> Self {
        Self([0.0; N])
    }
}

impl<const N: usize> From<[f32; N]> for Vector<N> {
    fn from(v: [f32; N]) -> Self {
        Self(v)
    }
}

impl<const N: usize> Cell for Vector<N> {
    const KIND: CellKind = CellKind::Vector(N);
    const ARITY: usize = N;
    type Buffer = DenseBuffer<Vector<N>>;

    fn zero() -> Self {
        Self::default()
    }

    fn plus(self, rhs: Self) -> Self {
        self.zip_with(rhs, |a, b| a + b)
    }

    fn minus(self, rhs: Self) -> Self {
        self.zip_with(rhs, |a, b| a - b)
    }

    fn times(self, rhs: Self) -> Self {
        self.zip_with(rhs, |a, b| a * b)
    }

    fn divided_by(self, rhs: Self) -> Option<Self> {
        Some(self.zip_with(rhs, |a, b| a / b))
    }

    fn component(&self, index: usize) -> f32 {
        self.0[index]
    }

    fn from_components(components: &[f32]) -> Self {
        let mut out = [0.0; N];
        out.copy_from_slice(&components[..N]);
        Self(out)
    }

    fn fixed_component(&self, index: usize, scale: i64) -> i64 {
        scale_float(self.0[index], scale)
    }

    fn from_fixed(sums: &[i64], divisor: i64) -> Self {
        let mut out = [0.0; N];
        for (o, s) in out.iter_mut().zip(sums) {
            *o = (*s as f64 / divisor as f64) as f32;
        }
        Self(out)
    }

    fn write_le_bytes(&self, out: &mut Vec<u8>) {
        for c in self.0 {
            out.extend_from_slice(&c.to_le_bytes());
        }
    }
}
