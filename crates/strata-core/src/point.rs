//! Integer grid coordinates.

use smallvec::SmallVec;
use std::fmt;

/// A cell coordinate on a square grid.
///
/// Coordinates are signed so that symmetry and offset arithmetic can
/// produce points outside the grid without wrapping; use
/// [`in_bounds`](Point::in_bounds) before indexing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Point {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

/// A short list of points, inline up to the largest symmetry orbit.
pub type Points = SmallVec<[Point; 16]>;

impl Point {
    /// Create a point.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Whether the point lies inside a grid of side `size`.
    pub fn in_bounds(&self, size: usize) -> bool {
        self.x >= 0 && self.y >= 0 && (self.x as usize) < size && (self.y as usize) < size
    }

    /// Flat row-major index on a grid of side `size`, or `None` when
    /// the point is out of bounds.
    pub fn index(&self, size: usize) -> Option<usize> {
        if self.in_bounds(size) {
            Some(self.y as usize * size + self.x as usize)
        } else {
            None
        }
    }

    /// Inverse of [`index`](Point::index).
    pub fn from_index(index: usize, size: usize) -> Self {
        Self::new((index % size) as i32, (index / size) as i32)
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: Point) -> f32 {
        self.distance_squared(other).sqrt()
    }

    /// Squared Euclidean distance to `other`.
    pub fn distance_squared(&self, other: Point) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        dx * dx + dy * dy
    }

    /// Component-wise offset.
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_and_index() {
        let p = Point::new(2, 3);
        assert!(p.in_bounds(4));
        assert!(!p.in_bounds(3));
        assert_eq!(p.index(4), Some(14));
        assert_eq!(Point::from_index(14, 4), p);
        assert_eq!(Point::new(-1, 0).index(4), None);
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Point::new(0, 0);
        let b = Point::new(3, 4);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(a.distance_squared(b), 25.0);
    }
}
