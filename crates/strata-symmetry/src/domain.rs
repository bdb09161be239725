//! Fundamental domains: the region of a grid that holds one
//! representative of each symmetry orbit.

use std::f64::consts::TAU;
use std::ops::Range;

use strata_core::Point;

use crate::symmetry::{polar_angle, rotate, Symmetry};

/// Minimal iteration region for a symmetry group on a grid of one size.
///
/// Stored as an x-range plus one y-range per column. For perfect groups
/// every orbit has exactly one member inside the domain. For imperfect
/// point groups the domain is the angular wedge `[0, 2π/n)` about the
/// grid centre; its rounded images may overlap or leave gaps, so callers
/// that decide on representatives follow up with a full symmetry pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FundamentalDomain {
    symmetry: Symmetry,
    size: usize,
    x_start: i32,
    columns: Vec<Range<i32>>,
}

impl FundamentalDomain {
    /// Compute the domain of `symmetry` on a grid of side `size`.
    pub fn new(symmetry: Symmetry, size: usize) -> Self {
        let s = size as i32;
        let h = (s + 1) / 2;
        let m = s / 2;
        let odd = s % 2 == 1;

        let (x_start, columns): (i32, Vec<Range<i32>>) = match symmetry {
            Symmetry::None => (0, (0..s).map(|_| 0..s).collect()),
            Symmetry::Point2 => (
                0,
                (0..s)
                    .map(|x| if odd && x <= m { 0..m + 1 } else { 0..m })
                    .collect(),
            ),
            Symmetry::Point4 => {
                if odd {
                    (0, (0..=m).map(|x| if x == m { 0..m + 1 } else { 0..m }).collect())
                } else {
                    (0, (0..m).map(|_| 0..m).collect())
                }
            }
            Symmetry::X => (0, (0..h).map(|_| 0..s).collect()),
            Symmetry::Z => (0, (0..s).map(|_| 0..h).collect()),
            Symmetry::Xz => (0, (0..s).map(|x| x..s).collect()),
            Symmetry::Zx => (0, (0..s).map(|x| 0..s - x).collect()),
            Symmetry::Quad => (0, (0..h).map(|_| 0..h).collect()),
            Symmetry::Diag => (0, (0..h).map(|x| x..(s - x).max(x)).collect()),
            point => wedge(point.point_order().unwrap_or(1), size),
        };

        Self {
            symmetry,
            size,
            x_start,
            columns,
        }
    }

    /// The group this domain belongs to.
    pub fn symmetry(&self) -> Symmetry {
        self.symmetry
    }

    /// Grid side this domain was computed for.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether iterating the domain visits each orbit exactly once.
    pub fn is_perfect(&self) -> bool {
        self.symmetry.is_perfect()
    }

    /// Columns covered by the domain.
    pub fn x_range(&self) -> Range<i32> {
        self.x_start..self.x_start + self.columns.len() as i32
    }

    /// Rows covered in column `x`; empty outside the x-range.
    pub fn y_range(&self, x: i32) -> Range<i32> {
        if x < self.x_start {
            return 0..0;
        }
        self.columns
            .get((x - self.x_start) as usize)
            .cloned()
            .unwrap_or(0..0)
    }

    /// Smallest row range covering every column.
    pub fn y_bounds(&self) -> Range<i32> {
        let mut lo = i32::MAX;
        let mut hi = i32::MIN;
        for r in self.columns.iter().filter(|r| !r.is_empty()) {
            lo = lo.min(r.start);
            hi = hi.max(r.end);
        }
        if lo > hi {
            0..0
        } else {
            lo..hi
        }
    }

    /// Whether `p` is inside the domain.
    pub fn contains(&self, p: Point) -> bool {
        self.y_range(p.x).contains(&p.y)
    }

    /// Domain cells, column by column.
    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        self.x_range()
            .flat_map(move |x| self.y_range(x).map(move |y| Point::new(x, y)))
    }

    /// Number of cells in the domain.
    pub fn len(&self) -> usize {
        self.columns.iter().map(|r| r.len()).sum()
    }

    /// Whether the domain is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The member of `p`'s orbit that lies inside the domain.
    ///
    /// For imperfect groups the point is rotated back into the wedge
    /// and clamped to the grid.
    pub fn representative(&self, p: Point) -> Point {
        if self.contains(p) {
            return p;
        }
        if self.is_perfect() {
            return self
                .symmetry
                .raw_points(p, self.size, Symmetry::None)
                .into_iter()
                .find(|q| self.contains(*q))
                .unwrap_or(p);
        }
        let n = self.symmetry.point_order().unwrap_or(1);
        let step = TAU / f64::from(n);
        let sector = ((polar_angle(p, self.size) / step).floor() as u32).min(n - 1);
        let back = rotate(p, self.size, n - sector, n);
        let max = self.size as i32 - 1;
        Point::new(back.x.clamp(0, max), back.y.clamp(0, max))
    }
}

/// Angular wedge `[0, 2π/n)` about the grid centre.
fn wedge(n: u32, size: usize) -> (i32, Vec<Range<i32>>) {
    let s = size as i32;
    let limit = TAU / f64::from(n);
    let mut first = None;
    let mut columns = Vec::new();
    for x in 0..s {
        let ys: Vec<i32> = (0..s)
            .filter(|&y| polar_angle(Point::new(x, y), size) < limit)
            .collect();
        match (ys.first(), ys.last()) {
            (Some(&lo), Some(&hi)) => {
                first.get_or_insert(x);
                columns.push(lo..hi + 1);
            }
            _ if first.is_some() => columns.push(0..0),
            _ => {}
        }
    }
    while columns.last().is_some_and(|r| r.is_empty()) {
        columns.pop();
    }
    (first.unwrap_or(0), columns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const PERFECT: [Symmetry; 9] = [
        Symmetry::None,
        Symmetry::Point2,
        Symmetry::Point4,
        Symmetry::X,
        Symmetry::Z,
        Symmetry::Xz,
        Symmetry::Zx,
        Symmetry::Quad,
        Symmetry::Diag,
    ];

    fn orbit(sym: Symmetry, p: Point, size: usize) -> Vec<Point> {
        let mut pts: Vec<Point> = std::iter::once(p)
            .chain(sym.raw_points(p, size, Symmetry::None))
            .collect();
        pts.sort();
        pts.dedup();
        pts
    }

    #[test]
    fn perfect_domains_hold_one_member_per_orbit() {
        for sym in PERFECT {
            for size in 1..=12usize {
                let domain = FundamentalDomain::new(sym, size);
                for x in 0..size as i32 {
                    for y in 0..size as i32 {
                        let members = orbit(sym, Point::new(x, y), size)
                            .into_iter()
                            .filter(|q| domain.contains(*q))
                            .count();
                        assert_eq!(members, 1, "{sym} size {size} at ({x}, {y})");
                    }
                }
            }
        }
    }

    #[test]
    fn perfect_domain_len_counts_orbits() {
        for sym in PERFECT {
            for size in 1..=12usize {
                let domain = FundamentalDomain::new(sym, size);
                let mut reps: Vec<Point> = (0..size * size)
                    .map(|i| domain.representative(Point::from_index(i, size)))
                    .collect();
                reps.sort();
                reps.dedup();
                assert_eq!(reps.len(), domain.len(), "{sym} size {size}");
                assert_eq!(domain.iter().count(), domain.len());
            }
        }
    }

    #[test]
    fn odd_point4_is_pinwheel() {
        let d = FundamentalDomain::new(Symmetry::Point4, 5);
        assert_eq!(d.x_range(), 0..3);
        assert_eq!(d.y_range(0), 0..2);
        assert_eq!(d.y_range(2), 0..3);
        assert_eq!(d.len(), 7);
        assert!(d.contains(Point::new(2, 2)));
    }

    #[test]
    fn diag_is_left_triangle() {
        let d = FundamentalDomain::new(Symmetry::Diag, 4);
        assert_eq!(d.y_range(0), 0..4);
        assert_eq!(d.y_range(1), 1..3);
        assert_eq!(d.len(), 6);
    }

    #[test]
    fn imperfect_wedge_is_flagged() {
        let d = FundamentalDomain::new(Symmetry::Point3, 9);
        assert!(!d.is_perfect());
        assert!(d.contains(Point::new(4, 4)));
        assert!(d.contains(Point::new(8, 4)));
        assert!(!d.contains(Point::new(4, 0)));
        assert!(!d.is_empty());
    }

    #[test]
    fn y_range_outside_is_empty() {
        let d = FundamentalDomain::new(Symmetry::Quad, 6);
        assert!(d.y_range(-1).is_empty());
        assert!(d.y_range(3).is_empty());
        assert_eq!(d.y_bounds(), 0..3);
    }

    proptest! {
        #[test]
        fn imperfect_representative_is_in_bounds(n in 3u32..=16, size in 1usize..40, x in 0i32..40, y in 0i32..40) {
            let sym = Symmetry::from_point_order(n).unwrap();
            let d = FundamentalDomain::new(sym, size);
            let p = Point::new(x % size as i32, y % size as i32);
            let r = d.representative(p);
            prop_assert!(r.in_bounds(size));
        }

        #[test]
        fn perfect_representative_is_orbit_member(idx in 0usize..9, size in 1usize..30, x in 0i32..30, y in 0i32..30) {
            let sym = PERFECT[idx];
            let d = FundamentalDomain::new(sym, size);
            let p = Point::new(x % size as i32, y % size as i32);
            let r = d.representative(p);
            prop_assert!(d.contains(r));
            prop_assert!(orbit(sym, p, size).contains(&r));
        }
    }
}
