//! Symmetry groups and their coordinate transforms.

use smallvec::SmallVec;
use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::fmt;

use strata_core::{Point, Points};

/// Angular counterparts of a direction, inline up to the largest orbit.
pub type Angles = SmallVec<[f32; 16]>;

/// A symmetry group acting on a square grid.
///
/// Point groups rotate about the grid centre by multiples of `2π/n`.
/// `X` and `Z` mirror across the vertical and horizontal centre lines,
/// `Xz` and `Zx` across the main and anti diagonals. `Quad` and `Diag`
/// combine a pair of mirrors (and the half-turn they generate).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Symmetry {
    /// Identity only.
    None,
    /// Half-turn.
    Point2,
    /// Third-turns.
    Point3,
    /// Quarter-turns.
    Point4,
    /// Fifth-turns.
    Point5,
    /// Sixth-turns.
    Point6,
    /// Seventh-turns.
    Point7,
    /// Eighth-turns.
    Point8,
    /// Ninth-turns.
    Point9,
    /// Tenth-turns.
    Point10,
    /// Eleventh-turns.
    Point11,
    /// Twelfth-turns.
    Point12,
    /// Thirteenth-turns.
    Point13,
    /// Fourteenth-turns.
    Point14,
    /// Fifteenth-turns.
    Point15,
    /// Sixteenth-turns.
    Point16,
    /// Mirror across the vertical centre line (`x -> s-1-x`).
    X,
    /// Mirror across the horizontal centre line (`y -> s-1-y`).
    Z,
    /// Mirror across the main diagonal (`(x, y) -> (y, x)`).
    Xz,
    /// Mirror across the anti diagonal (`(x, y) -> (s-1-y, s-1-x)`).
    Zx,
    /// `X` and `Z` together.
    Quad,
    /// `Xz` and `Zx` together.
    Diag,
}

impl Symmetry {
    /// Every group, point groups in increasing order.
    pub const ALL: [Symmetry; 22] = [
        Symmetry::None,
        Symmetry::Point2,
        Symmetry::Point3,
        Symmetry::Point4,
        Symmetry::Point5,
        Symmetry::Point6,
        Symmetry::Point7,
        Symmetry::Point8,
        Symmetry::Point9,
        Symmetry::Point10,
        Symmetry::Point11,
        Symmetry::Point12,
        Symmetry::Point13,
        Symmetry::Point14,
        Symmetry::Point15,
        Symmetry::Point16,
        Symmetry::X,
        Symmetry::Z,
        Symmetry::Xz,
        Symmetry::Zx,
        Symmetry::Quad,
        Symmetry::Diag,
    ];

    /// Rotation order of a point group, `None` for every other group.
    pub fn point_order(self) -> Option<u32> {
        match self {
            Self::Point2 => Some(2),
            Self::Point3 => Some(3),
            Self::Point4 => Some(4),
            Self::Point5 => Some(5),
            Self::Point6 => Some(6),
            Self::Point7 => Some(7),
            Self::Point8 => Some(8),
            Self::Point9 => Some(9),
            Self::Point10 => Some(10),
            Self::Point11 => Some(11),
            Self::Point12 => Some(12),
            Self::Point13 => Some(13),
            Self::Point14 => Some(14),
            Self::Point15 => Some(15),
            Self::Point16 => Some(16),
            _ => None,
        }
    }

    /// The point group of order `n`, for `2 <= n <= 16`.
    pub fn from_point_order(n: u32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.point_order() == Some(n))
    }

    /// Number of points in an orbit of a generic cell.
    pub fn num_points(self) -> usize {
        match self {
            Self::None => 1,
            Self::X | Self::Z | Self::Xz | Self::Zx => 2,
            Self::Quad | Self::Diag => 4,
            other => other.point_order().map_or(1, |n| n as usize),
        }
    }

    /// Whether the group maps grid cells onto grid cells exactly, so
    /// that its orbits partition the grid.
    ///
    /// Rotations by anything other than a multiple of a quarter turn
    /// need rounding and are not perfect.
    pub fn is_perfect(self) -> bool {
        !matches!(self.point_order(), Some(n) if n != 2 && n != 4)
    }

    /// The two mirror axes of a composite group.
    pub fn components(self) -> Option<(Symmetry, Symmetry)> {
        match self {
            Self::Quad => Some((Self::X, Self::Z)),
            Self::Diag => Some((Self::Xz, Self::Zx)),
            _ => None,
        }
    }

    /// Counterparts of `p` on a grid of side `size`, excluding `p`
    /// itself. May lie outside the grid for imperfect groups.
    ///
    /// For composite groups the image across the axis selected by
    /// `team` comes first, then the other axis, then the half-turn.
    pub fn raw_points(self, p: Point, size: usize, team: Symmetry) -> Points {
        let s = size as i32;
        let mut out = Points::new();
        match self {
            Self::None => {}
            Self::X => out.push(mirror_x(p, s)),
            Self::Z => out.push(mirror_z(p, s)),
            Self::Xz => out.push(mirror_xz(p)),
            Self::Zx => out.push(mirror_zx(p, s)),
            Self::Quad => {
                if team == Self::Z {
                    out.extend([mirror_z(p, s), mirror_x(p, s)]);
                } else {
                    out.extend([mirror_x(p, s), mirror_z(p, s)]);
                }
                out.push(rotate(p, size, 1, 2));
            }
            Self::Diag => {
                if team == Self::Zx {
                    out.extend([mirror_zx(p, s), mirror_xz(p)]);
                } else {
                    out.extend([mirror_xz(p), mirror_zx(p, s)]);
                }
                out.push(rotate(p, size, 1, 2));
            }
            point => {
                let n = point.point_order().unwrap_or(1);
                for k in 1..n {
                    out.push(rotate(p, size, k, n));
                }
            }
        }
        out
    }

    /// Angular counterparts of a direction `angle` (radians), normalized
    /// to `[0, 2π)`, excluding `angle` itself. Composite groups order
    /// their images like [`raw_points`](Symmetry::raw_points).
    pub fn angle_images(self, angle: f32, team: Symmetry) -> Angles {
        let a = f64::from(angle);
        let raw: SmallVec<[f64; 16]> = match self {
            Self::None => SmallVec::new(),
            Self::X => smallvec::smallvec![PI - a],
            Self::Z => smallvec::smallvec![-a],
            Self::Xz => smallvec::smallvec![FRAC_PI_2 - a],
            Self::Zx => smallvec::smallvec![-FRAC_PI_2 - a],
            Self::Quad => {
                if team == Self::Z {
                    smallvec::smallvec![-a, PI - a, a + PI]
                } else {
                    smallvec::smallvec![PI - a, -a, a + PI]
                }
            }
            Self::Diag => {
                if team == Self::Zx {
                    smallvec::smallvec![-FRAC_PI_2 - a, FRAC_PI_2 - a, a + PI]
                } else {
                    smallvec::smallvec![FRAC_PI_2 - a, -FRAC_PI_2 - a, a + PI]
                }
            }
            point => {
                let n = point.point_order().unwrap_or(1);
                (1..n).map(|k| a + TAU * f64::from(k) / f64::from(n)).collect()
            }
        };
        raw.into_iter().map(|v| v.rem_euclid(TAU) as f32).collect()
    }
}

impl fmt::Display for Symmetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

fn mirror_x(p: Point, s: i32) -> Point {
    Point::new(s - 1 - p.x, p.y)
}

fn mirror_z(p: Point, s: i32) -> Point {
    Point::new(p.x, s - 1 - p.y)
}

fn mirror_xz(p: Point) -> Point {
    Point::new(p.y, p.x)
}

fn mirror_zx(p: Point, s: i32) -> Point {
    Point::new(s - 1 - p.y, s - 1 - p.x)
}

/// Rotate `p` about the grid centre by `k` `n`-th turns.
///
/// Multiples of a quarter turn use exact integer arithmetic; everything
/// else rotates in floating point and rounds to the nearest cell.
pub(crate) fn rotate(p: Point, size: usize, k: u32, n: u32) -> Point {
    let s = size as i32;
    let k = k % n;
    if (4 * k) % n == 0 {
        return match 4 * k / n {
            0 => p,
            1 => Point::new(s - 1 - p.y, p.x),
            2 => Point::new(s - 1 - p.x, s - 1 - p.y),
            _ => Point::new(p.y, s - 1 - p.x),
        };
    }
    let c = (size as f64 - 1.0) / 2.0;
    let dx = f64::from(p.x) - c;
    let dy = f64::from(p.y) - c;
    let theta = TAU * f64::from(k) / f64::from(n);
    let (sin, cos) = theta.sin_cos();
    Point::new(
        (c + dx * cos - dy * sin).round() as i32,
        (c + dx * sin + dy * cos).round() as i32,
    )
}

/// Angle of `p` about the grid centre, in `[0, 2π)`.
pub(crate) fn polar_angle(p: Point, size: usize) -> f64 {
    let c = (size as f64 - 1.0) / 2.0;
    (f64::from(p.y) - c)
        .atan2(f64::from(p.x) - c)
        .rem_euclid(TAU)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_groups() {
        let perfect: Vec<_> = Symmetry::ALL
            .into_iter()
            .filter(|s| s.is_perfect())
            .collect();
        assert_eq!(
            perfect,
            vec![
                Symmetry::None,
                Symmetry::Point2,
                Symmetry::Point4,
                Symmetry::X,
                Symmetry::Z,
                Symmetry::Xz,
                Symmetry::Zx,
                Symmetry::Quad,
                Symmetry::Diag,
            ]
        );
    }

    #[test]
    fn num_points_matches_raw_points() {
        for sym in Symmetry::ALL {
            let pts = sym.raw_points(Point::new(1, 2), 16, Symmetry::None);
            assert_eq!(pts.len() + 1, sym.num_points(), "{sym}");
        }
    }

    #[test]
    fn from_point_order_round_trips() {
        for n in 2..=16 {
            let sym = Symmetry::from_point_order(n).unwrap();
            assert_eq!(sym.point_order(), Some(n));
        }
        assert_eq!(Symmetry::from_point_order(17), None);
    }

    #[test]
    fn quarter_turn_is_exact() {
        let p = Point::new(1, 0);
        let pts = Symmetry::Point4.raw_points(p, 8, Symmetry::None);
        assert_eq!(
            pts.as_slice(),
            &[Point::new(7, 1), Point::new(6, 7), Point::new(0, 6)]
        );
    }

    #[test]
    fn eighth_turn_reuses_exact_quarters() {
        let p = Point::new(2, 5);
        let eighth = Symmetry::Point8.raw_points(p, 10, Symmetry::None);
        let quarter = Symmetry::Point4.raw_points(p, 10, Symmetry::None);
        assert_eq!(eighth[1], quarter[0]);
        assert_eq!(eighth[3], quarter[1]);
        assert_eq!(eighth[5], quarter[2]);
    }

    #[test]
    fn composite_orders_team_axis_first() {
        let p = Point::new(1, 2);
        let by_x = Symmetry::Quad.raw_points(p, 8, Symmetry::X);
        let by_z = Symmetry::Quad.raw_points(p, 8, Symmetry::Z);
        assert_eq!(by_x[0], Point::new(6, 2));
        assert_eq!(by_z[0], Point::new(1, 5));
        assert_eq!(by_x[2], by_z[2]);

        let by_xz = Symmetry::Diag.raw_points(p, 8, Symmetry::Xz);
        let by_zx = Symmetry::Diag.raw_points(p, 8, Symmetry::Zx);
        assert_eq!(by_xz[0], Point::new(2, 1));
        assert_eq!(by_zx[0], Point::new(5, 6));
    }

    #[test]
    fn mirrors_are_involutions() {
        for sym in [Symmetry::X, Symmetry::Z, Symmetry::Xz, Symmetry::Zx, Symmetry::Point2] {
            for x in 0..7 {
                for y in 0..7 {
                    let p = Point::new(x, y);
                    let q = sym.raw_points(p, 7, Symmetry::None)[0];
                    assert_eq!(sym.raw_points(q, 7, Symmetry::None)[0], p, "{sym}");
                }
            }
        }
    }

    #[test]
    fn angle_images_of_point_groups_are_even_steps() {
        let images = Symmetry::Point4.angle_images(0.0, Symmetry::None);
        let expected = [FRAC_PI_2, PI, 3.0 * FRAC_PI_2];
        for (got, want) in images.iter().zip(expected) {
            assert!((f64::from(*got) - want).abs() < 1e-5);
        }
    }

    #[test]
    fn angle_images_of_mirrors() {
        let a = 0.3f32;
        let x = Symmetry::X.angle_images(a, Symmetry::None)[0];
        assert!((f64::from(x) - (PI - 0.3)).abs() < 1e-5);
        let z = Symmetry::Z.angle_images(a, Symmetry::None)[0];
        assert!((f64::from(z) - (TAU - 0.3)).abs() < 1e-5);
        let xz = Symmetry::Xz.angle_images(a, Symmetry::None)[0];
        assert!((f64::from(xz) - (FRAC_PI_2 - 0.3)).abs() < 1e-5);
    }

    #[test]
    fn polar_angle_of_center_is_zero() {
        assert_eq!(polar_angle(Point::new(2, 2), 5), 0.0);
        let right_up = polar_angle(Point::new(2, 4), 5);
        assert!((right_up - FRAC_PI_2).abs() < 1e-12);
    }
}
