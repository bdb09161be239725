//! Jittered paths between two points.
//!
//! A path first picks random waypoints around the straight line from
//! start to end, then either walks each leg in bounded, angle-jittered
//! steps ([`Paths::path`]) or traces a random-order Bezier curve per leg
//! ([`Paths::path_bezier`]).
//!
//! A cell is only marked when it lies in the spawn domain and every raw
//! spawn counterpart lies inside the grid; the whole orbit is then
//! marked. Segments outside the domain are clipped rather than drawn and
//! mirrored, and paths near an edge never produce one-sided features.
//!
//! Parameter bundles are built with [`PathParams::builder`] and
//! [`BezierParams::builder`].

use std::f32::consts::TAU;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use strata_core::{GridError, Point};
use strata_grid::Grid;
use strata_symmetry::{FundamentalDomain, SymmetryRole};

/// Largest supported Bezier order.
pub const MAX_BEZIER_ORDER: usize = 8;

/// Parameters of a stepped path.
#[derive(Clone, Debug, PartialEq)]
pub struct PathParams {
    max_step_size: f32,
    max_angle_error: f32,
    midpoints: usize,
    midpoint_min_distance: f32,
    midpoint_max_distance: f32,
    max_steps: Option<usize>,
}

/// Builder for [`PathParams`].
#[derive(Clone, Debug)]
pub struct PathParamsBuilder {
    max_step_size: f32,
    max_angle_error: f32,
    midpoints: usize,
    midpoint_min_distance: f32,
    midpoint_max_distance: f32,
    max_steps: Option<usize>,
}

impl PathParams {
    /// Create a builder with unit steps, no jitter and no waypoints.
    pub fn builder() -> PathParamsBuilder {
        PathParamsBuilder {
            max_step_size: 1.0,
            max_angle_error: 0.0,
            midpoints: 0,
            midpoint_min_distance: 0.0,
            midpoint_max_distance: 0.0,
            max_steps: None,
        }
    }

    /// Longest single step.
    pub fn max_step_size(&self) -> f32 {
        self.max_step_size
    }

    /// Number of intermediate waypoints.
    pub fn midpoints(&self) -> usize {
        self.midpoints
    }
}

impl PathParamsBuilder {
    /// Longest single step, at least 1 (default: 1).
    pub fn max_step_size(mut self, size: f32) -> Self {
        self.max_step_size = size;
        self
    }

    /// Largest per-step deviation from the heading, in radians
    /// (default: 0).
    pub fn max_angle_error(mut self, radians: f32) -> Self {
        self.max_angle_error = radians;
        self
    }

    /// Number of intermediate waypoints (default: 0).
    pub fn midpoints(mut self, count: usize) -> Self {
        self.midpoints = count;
        self
    }

    /// Range of waypoint offsets from the straight line (default: 0).
    pub fn midpoint_distance(mut self, min: f32, max: f32) -> Self {
        self.midpoint_min_distance = min;
        self.midpoint_max_distance = max;
        self
    }

    /// Cap on steps per leg (default: grid cell count).
    pub fn max_steps(mut self, steps: usize) -> Self {
        self.max_steps = Some(steps);
        self
    }

    /// Build the parameters, validating all values.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the step size is below 1, the angle error is
    /// negative, or the waypoint distances are not an ordered pair of
    /// non-negative numbers. Non-finite values are always rejected.
    pub fn build(self) -> Result<PathParams, String> {
        if !self.max_step_size.is_finite() || self.max_step_size < 1.0 {
            return Err(format!(
                "max_step_size must be finite and >= 1, got {}",
                self.max_step_size
            ));
        }
        if !self.max_angle_error.is_finite() || self.max_angle_error < 0.0 {
            return Err(format!(
                "max_angle_error must be finite and >= 0, got {}",
                self.max_angle_error
            ));
        }
        check_distances(self.midpoint_min_distance, self.midpoint_max_distance)?;
        Ok(PathParams {
            max_step_size: self.max_step_size,
            max_angle_error: self.max_angle_error,
            midpoints: self.midpoints,
            midpoint_min_distance: self.midpoint_min_distance,
            midpoint_max_distance: self.midpoint_max_distance,
            max_steps: self.max_steps,
        })
    }
}

/// Parameters of a Bezier path.
#[derive(Clone, Debug, PartialEq)]
pub struct BezierParams {
    min_order: usize,
    max_order: usize,
    midpoints: usize,
    midpoint_min_distance: f32,
    midpoint_max_distance: f32,
}

/// Builder for [`BezierParams`].
#[derive(Clone, Debug)]
pub struct BezierParamsBuilder {
    min_order: usize,
    max_order: usize,
    midpoints: usize,
    midpoint_min_distance: f32,
    midpoint_max_distance: f32,
}

impl BezierParams {
    /// Create a builder for cubic legs without waypoints.
    pub fn builder() -> BezierParamsBuilder {
        BezierParamsBuilder {
            min_order: 3,
            max_order: 3,
            midpoints: 0,
            midpoint_min_distance: 0.0,
            midpoint_max_distance: 0.0,
        }
    }
}

impl BezierParamsBuilder {
    /// Range of curve orders drawn per leg (default: 3..=3).
    pub fn order(mut self, min: usize, max: usize) -> Self {
        self.min_order = min;
        self.max_order = max;
        self
    }

    /// Number of intermediate waypoints (default: 0).
    pub fn midpoints(mut self, count: usize) -> Self {
        self.midpoints = count;
        self
    }

    /// Range of waypoint offsets from the straight line (default: 0).
    pub fn midpoint_distance(mut self, min: f32, max: f32) -> Self {
        self.midpoint_min_distance = min;
        self.midpoint_max_distance = max;
        self
    }

    /// Build the parameters.
    ///
    /// # Errors
    ///
    /// Returns `Err` unless `1 <= min <= max <=` [`MAX_BEZIER_ORDER`] and
    /// the waypoint distances are valid.
    pub fn build(self) -> Result<BezierParams, String> {
        if self.min_order == 0 || self.min_order > self.max_order || self.max_order > MAX_BEZIER_ORDER {
            return Err(format!(
                "order range {}..={} must lie within 1..={MAX_BEZIER_ORDER}",
                self.min_order, self.max_order
            ));
        }
        check_distances(self.midpoint_min_distance, self.midpoint_max_distance)?;
        Ok(BezierParams {
            min_order: self.min_order,
            max_order: self.max_order,
            midpoints: self.midpoints,
            midpoint_min_distance: self.midpoint_min_distance,
            midpoint_max_distance: self.midpoint_max_distance,
        })
    }
}

fn check_distances(min: f32, max: f32) -> Result<(), String> {
    if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
        return Err(format!(
            "midpoint distances must satisfy 0 <= min <= max, got {min}..{max}"
        ));
    }
    Ok(())
}

/// Continuous position in cell units.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Pos {
    x: f32,
    y: f32,
}

impl Pos {
    fn of(p: Point) -> Self {
        Self {
            x: p.x as f32,
            y: p.y as f32,
        }
    }

    fn lerp(self, other: Pos, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    fn distance(self, other: Pos) -> f32 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    fn heading(self, other: Pos) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    fn step(self, angle: f32, length: f32) -> Self {
        Self {
            x: self.x + angle.cos() * length,
            y: self.y + angle.sin() * length,
        }
    }

    fn clamp(self, size: usize) -> Self {
        let hi = (size - 1) as f32;
        Self {
            x: self.x.clamp(0.0, hi),
            y: self.y.clamp(0.0, hi),
        }
    }

    fn cell(self) -> Point {
        Point::new(self.x.round() as i32, self.y.round() as i32)
    }
}

/// Path generators on boolean masks.
pub trait Paths {
    /// Stepped, jittered path from `start` to `end`.
    fn path(&mut self, start: Point, end: Point, params: &PathParams) -> Result<(), GridError>;

    /// Bezier path from `start` to `end`.
    fn path_bezier(&mut self, start: Point, end: Point, params: &BezierParams) -> Result<(), GridError>;

    /// [`path`](Paths::path) from `start` to `end`, repeated towards the
    /// first `role` counterpart of `end` when the group has more than one
    /// point.
    fn connect(
        &mut self,
        start: Point,
        end: Point,
        params: &PathParams,
        role: SymmetryRole,
    ) -> Result<(), GridError>;
}

fn checked(grid: &Grid<bool>, p: Point) -> Result<Point, GridError> {
    if grid.in_bounds(p) {
        Ok(p)
    } else {
        Err(GridError::CoordOutOfBounds {
            point: p,
            size: grid.size(),
        })
    }
}

/// Mark `p` and its orbit if `p` is in `domain` and the whole orbit
/// fits in the grid.
fn mark(grid: &mut Grid<bool>, domain: &FundamentalDomain, p: Point) {
    if !grid.in_bounds(p) || !domain.contains(p) {
        return;
    }
    let size = grid.size();
    let fits = grid
        .symmetry()
        .points_unbounded(SymmetryRole::Spawn, p, size)
        .iter()
        .all(|q| q.in_bounds(size));
    if fits {
        grid.write_orbit(p, true);
    }
}

/// Mark every cell on the segment `a..=b`, sampled twice per cell.
fn trace(grid: &mut Grid<bool>, domain: &FundamentalDomain, a: Pos, b: Pos) {
    let samples = (a.distance(b) * 2.0).ceil().max(1.0) as usize;
    for k in 0..=samples {
        mark(grid, domain, a.lerp(b, k as f32 / samples as f32).cell());
    }
}

/// `start`, `count` jittered waypoints, `end`.
fn waypoints(
    rng: &mut ChaCha8Rng,
    size: usize,
    start: Point,
    end: Point,
    count: usize,
    min_distance: f32,
    max_distance: f32,
) -> Vec<Pos> {
    let (a, b) = (Pos::of(start), Pos::of(end));
    let mut out = Vec::with_capacity(count + 2);
    out.push(a);
    for i in 1..=count {
        let base = a.lerp(b, i as f32 / (count + 1) as f32);
        let angle = rng.gen_range(0.0..TAU);
        let magnitude = rng.gen_range(min_distance..=max_distance);
        out.push(base.step(angle, magnitude).clamp(size));
    }
    out.push(b);
    out
}

fn walk_leg(
    grid: &mut Grid<bool>,
    domain: &FundamentalDomain,
    from: Pos,
    to: Pos,
    params: &PathParams,
) -> Result<(), GridError> {
    let cap = params.max_steps.unwrap_or(grid.cell_count());
    let mut pos = from;
    let mut steps = 0;
    loop {
        if pos.distance(to) <= params.max_step_size {
            trace(grid, domain, pos, to);
            return Ok(());
        }
        if steps >= cap {
            tracing::debug!(grid = %grid.name(), steps, "path leg hit step cap");
            return Ok(());
        }
        let rng = grid.rng_mut()?;
        let jitter = if params.max_angle_error > 0.0 {
            rng.gen_range(-params.max_angle_error..=params.max_angle_error)
        } else {
            0.0
        };
        let length = rng.gen_range(1.0..=params.max_step_size);
        let next = pos.step(pos.heading(to) + jitter, length);
        trace(grid, domain, pos, next);
        pos = next;
        steps += 1;
    }
}

/// Point on the Bezier curve with `control` points at parameter `t`.
fn de_casteljau(control: &[Pos], t: f32) -> Pos {
    let mut pts = control.to_vec();
    for level in (1..pts.len()).rev() {
        for i in 0..level {
            pts[i] = pts[i].lerp(pts[i + 1], t);
        }
    }
    pts[0]
}

fn bezier_leg(
    grid: &mut Grid<bool>,
    domain: &FundamentalDomain,
    from: Pos,
    to: Pos,
    params: &BezierParams,
) -> Result<(), GridError> {
    let size = grid.size();
    let rng = grid.rng_mut()?;
    let order = rng.gen_range(params.min_order..=params.max_order);
    let spread = from.distance(to) / order as f32;
    let mut control = Vec::with_capacity(order + 1);
    control.push(from);
    for j in 1..order {
        let base = from.lerp(to, j as f32 / order as f32);
        let angle = rng.gen_range(0.0..TAU);
        let magnitude = rng.gen_range(0.0..=spread);
        control.push(base.step(angle, magnitude).clamp(size));
    }
    control.push(to);

    let mut last = from.cell();
    mark(grid, domain, last);
    for k in 1..=size {
        let p = de_casteljau(&control, k as f32 / size as f32).cell();
        if p != last {
            mark(grid, domain, p);
            last = p;
        }
    }
    mark(grid, domain, to.cell());
    Ok(())
}

impl Paths for Grid<bool> {
    fn path(&mut self, start: Point, end: Point, params: &PathParams) -> Result<(), GridError> {
        let (start, end) = (checked(self, start)?, checked(self, end)?);
        let size = self.size();
        let points = waypoints(
            self.rng_mut()?,
            size,
            start,
            end,
            params.midpoints,
            params.midpoint_min_distance,
            params.midpoint_max_distance,
        );
        let domain = self.spawn_domain();
        for leg in points.windows(2) {
            walk_leg(self, &domain, leg[0], leg[1], params)?;
        }
        self.settle_symmetry();
        Ok(())
    }

    fn path_bezier(&mut self, start: Point, end: Point, params: &BezierParams) -> Result<(), GridError> {
        let (start, end) = (checked(self, start)?, checked(self, end)?);
        let size = self.size();
        let points = waypoints(
            self.rng_mut()?,
            size,
            start,
            end,
            params.midpoints,
            params.midpoint_min_distance,
            params.midpoint_max_distance,
        );
        let domain = self.spawn_domain();
        for leg in points.windows(2) {
            bezier_leg(self, &domain, leg[0], leg[1], params)?;
        }
        self.settle_symmetry();
        Ok(())
    }

    fn connect(
        &mut self,
        start: Point,
        end: Point,
        params: &PathParams,
        role: SymmetryRole,
    ) -> Result<(), GridError> {
        self.path(start, end, params)?;
        let size = self.size();
        if self.symmetry().get(role).num_points() > 1 {
            let mirrored = self.symmetry().points_unbounded(role, end, size);
            if let Some(&target) = mirrored.first() {
                let target = Pos::of(target).clamp(size).cell();
                self.path(start, target, params)?;
            }
        }
        Ok(())
    }
}
