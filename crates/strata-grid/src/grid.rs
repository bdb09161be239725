//! The grid container and its builder.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use strata_core::{Cell, CellBuffer, GridError, Point};
use strata_symmetry::{FundamentalDomain, SymmetryRole, SymmetrySettings};

/// Rejection attempts before [`Grid::random_point`] enumerates the domain.
const RANDOM_POINT_TRIES: usize = 64;

/// A square grid of `size × size` cells of type `T`.
///
/// Cell `(x, y)` lives at flat index `y * size + x`. The symmetry
/// settings and seed are fixed at construction; a grid built without a
/// seed rejects every randomized operation with
/// [`GridError::MissingSeed`].
#[derive(Clone)]
pub struct Grid<T: Cell> {
    size: usize,
    cells: T::Buffer,
    symmetry: SymmetrySettings,
    seed: Option<u64>,
    rng: Option<ChaCha8Rng>,
    name: String,
}

/// Builder for [`Grid`]. Created by [`Grid::builder`].
#[derive(Clone, Debug)]
pub struct GridBuilder<T: Cell> {
    size: usize,
    seed: Option<u64>,
    symmetry: SymmetrySettings,
    name: Option<String>,
    fill: T,
}

impl<T: Cell> GridBuilder<T> {
    /// Seed the grid's random stream.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the symmetry settings (default: none).
    pub fn symmetry(mut self, symmetry: SymmetrySettings) -> Self {
        self.symmetry = symmetry;
        self
    }

    /// Set the debug name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Initial value of every cell (default: zero).
    pub fn fill(mut self, value: T) -> Self {
        self.fill = value;
        self
    }

    /// Build the grid.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::EmptyGrid`] if `size` is 0.
    pub fn build(self) -> Result<Grid<T>, GridError> {
        if self.size == 0 {
            return Err(GridError::EmptyGrid);
        }
        Ok(Grid {
            size: self.size,
            cells: T::Buffer::filled(self.size * self.size, self.fill),
            symmetry: self.symmetry,
            seed: self.seed,
            rng: self.seed.map(ChaCha8Rng::seed_from_u64),
            name: self.name.unwrap_or_else(|| format!("{}-grid", T::KIND)),
        })
    }
}

impl<T: Cell> Grid<T> {
    /// Start building a grid of side `size`.
    pub fn builder(size: usize) -> GridBuilder<T> {
        GridBuilder {
            size,
            seed: None,
            symmetry: SymmetrySettings::none(),
            name: None,
            fill: T::zero(),
        }
    }

    /// A grid of this size, symmetry and seed holding `fill` everywhere.
    ///
    /// The new grid starts a fresh random stream from the same seed.
    pub fn derive<U: Cell>(&self, fill: U) -> Grid<U> {
        Grid {
            size: self.size,
            cells: U::Buffer::filled(self.size * self.size, fill),
            symmetry: self.symmetry,
            seed: self.seed,
            rng: self.seed.map(ChaCha8Rng::seed_from_u64),
            name: self.name.clone(),
        }
    }

    /// Apply `f` to every cell, producing a derived grid.
    pub fn map<U: Cell>(&self, f: impl Fn(T) -> U) -> Grid<U> {
        let mut out = self.derive(U::zero());
        for i in 0..self.cell_count() {
            out.cells.set(i, f(self.cells.get(i)));
        }
        out
    }

    /// Side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of cells, `size²`.
    pub fn cell_count(&self) -> usize {
        self.size * self.size
    }

    /// Symmetry settings.
    pub fn symmetry(&self) -> &SymmetrySettings {
        &self.symmetry
    }

    /// Construction seed, if any.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Debug name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the grid.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Backing storage.
    pub fn buffer(&self) -> &T::Buffer {
        &self.cells
    }

    pub(crate) fn buffer_mut(&mut self) -> &mut T::Buffer {
        &mut self.cells
    }

    pub(crate) fn replace_storage(&mut self, size: usize, cells: T::Buffer) {
        self.size = size;
        self.cells = cells;
    }

    /// Whether `p` is on the grid.
    pub fn in_bounds(&self, p: Point) -> bool {
        p.in_bounds(self.size)
    }

    /// Value at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of bounds. Use
    /// [`try_get`](Grid::try_get) for a checked read.
    pub fn get(&self, x: i32, y: i32) -> T {
        self.at(Point::new(x, y))
    }

    /// Checked read.
    pub fn try_get(&self, p: Point) -> Result<T, GridError> {
        p.index(self.size)
            .map(|i| self.cells.get(i))
            .ok_or(GridError::CoordOutOfBounds {
                point: p,
                size: self.size,
            })
    }

    /// Value at `p`. Panics when out of bounds.
    pub fn at(&self, p: Point) -> T {
        match p.index(self.size) {
            Some(i) => self.cells.get(i),
            None => panic!("{p} out of bounds for grid of size {}", self.size),
        }
    }

    /// Value at flat index `i`.
    pub fn cell(&self, i: usize) -> T {
        self.cells.get(i)
    }

    /// Write flat index `i` only, ignoring symmetry.
    pub fn set_cell(&mut self, i: usize, value: T) {
        self.cells.set(i, value);
    }

    /// Write `(x, y)` and every in-bounds spawn counterpart.
    ///
    /// # Errors
    ///
    /// [`GridError::CoordOutOfBounds`] if `(x, y)` is off the grid.
    pub fn set(&mut self, x: i32, y: i32, value: T) -> Result<(), GridError> {
        let p = self.checked(Point::new(x, y))?;
        self.write_orbit(p, value);
        Ok(())
    }

    /// Write `(x, y)` alone, leaving its counterparts untouched.
    pub fn set_unmirrored(&mut self, x: i32, y: i32, value: T) -> Result<(), GridError> {
        let p = self.checked(Point::new(x, y))?;
        if let Some(i) = p.index(self.size) {
            self.cells.set(i, value);
        }
        Ok(())
    }

    /// Write `p` (when in bounds) and its in-bounds spawn counterparts.
    pub fn write_orbit(&mut self, p: Point, value: T) {
        if let Some(i) = p.index(self.size) {
            self.cells.set(i, value);
        }
        for q in self.symmetry.points(SymmetryRole::Spawn, p, self.size) {
            if let Some(i) = q.index(self.size) {
                self.cells.set(i, value);
            }
        }
    }

    /// Overwrite every cell.
    pub fn fill(&mut self, value: T) {
        self.cells.fill(value);
    }

    /// Fundamental domain of the `role` group at the current size.
    pub fn domain(&self, role: SymmetryRole) -> FundamentalDomain {
        self.symmetry.domain(role, self.size)
    }

    /// Fundamental domain of the spawn group.
    pub fn spawn_domain(&self) -> FundamentalDomain {
        self.domain(SymmetryRole::Spawn)
    }

    /// Pull pass: every cell takes the value of its representative in
    /// the `role` domain.
    ///
    /// Domain cells are their own representatives, so reading while
    /// writing is safe.
    pub fn apply_symmetry(&mut self, role: SymmetryRole) {
        let domain = self.domain(role);
        for i in 0..self.cell_count() {
            let p = Point::from_index(i, self.size);
            let rep = domain.representative(p);
            if rep != p {
                if let Some(j) = rep.index(self.size) {
                    let v = self.cells.get(j);
                    self.cells.set(i, v);
                }
            }
        }
        tracing::trace!(grid = %self.name, %role, "symmetry applied");
    }

    /// Re-apply spawn symmetry when the spawn group is imperfect.
    ///
    /// Operations that decide only on domain representatives call this
    /// after writing, because rounded rotations can miss or double-visit
    /// cells.
    pub fn settle_symmetry(&mut self) {
        if !self.symmetry.spawn().is_perfect() {
            self.apply_symmetry(SymmetryRole::Spawn);
        }
    }

    /// The grid's random stream.
    ///
    /// # Errors
    ///
    /// [`GridError::MissingSeed`] for grids built without a seed.
    pub fn rng_mut(&mut self) -> Result<&mut ChaCha8Rng, GridError> {
        let name = &self.name;
        self.rng.as_mut().ok_or_else(|| GridError::MissingSeed {
            grid: name.clone(),
        })
    }

    /// A random cell of the `role` domain.
    ///
    /// Tries rejection sampling inside the domain's bounding box first
    /// and falls back to picking from the enumerated domain.
    pub fn random_point(&mut self, role: SymmetryRole) -> Result<Point, GridError> {
        let domain = self.domain(role);
        let rng = self.rng_mut()?;
        sample_domain(&domain, rng, RANDOM_POINT_TRIES)
    }

    fn checked(&self, p: Point) -> Result<Point, GridError> {
        if p.in_bounds(self.size) {
            Ok(p)
        } else {
            Err(GridError::CoordOutOfBounds {
                point: p,
                size: self.size,
            })
        }
    }

    /// Check that `other` can be combined with this grid.
    pub fn check_compatible<U: Cell>(&self, other: &Grid<U>) -> Result<(), GridError> {
        if self.size != other.size {
            return Err(GridError::SizeMismatch {
                expected: self.size,
                actual: other.size,
            });
        }
        if self.symmetry != other.symmetry {
            return Err(GridError::SymmetryMismatch {
                expected: self.symmetry.to_string(),
                actual: other.symmetry.to_string(),
            });
        }
        Ok(())
    }

    /// Whether every cell equals each of its in-bounds spawn counterparts.
    pub fn is_symmetric(&self) -> bool {
        (0..self.cell_count()).all(|i| {
            let p = Point::from_index(i, self.size);
            let v = self.cells.get(i);
            self.symmetry
                .points(SymmetryRole::Spawn, p, self.size)
                .into_iter()
                .all(|q| self.at(q) == v)
        })
    }
}

impl<T: Cell> PartialEq for Grid<T> {
    /// Equal size, symmetry and cells. Names and random state are ignored.
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.symmetry == other.symmetry && self.cells == other.cells
    }
}

impl<T: Cell> fmt::Debug for Grid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("name", &self.name)
            .field("kind", &T::KIND)
            .field("size", &self.size)
            .field("symmetry", &self.symmetry)
            .field("seed", &self.seed)
            .finish()
    }
}

/// Uniform cell of `domain`: up to `tries` rejection samples in its
/// bounding box, then a pick from the enumerated cells.
fn sample_domain(
    domain: &FundamentalDomain,
    rng: &mut ChaCha8Rng,
    tries: usize,
) -> Result<Point, GridError> {
    let xs = domain.x_range();
    let ys = domain.y_bounds();
    if !xs.is_empty() && !ys.is_empty() {
        for _ in 0..tries {
            let p = Point::new(rng.gen_range(xs.clone()), rng.gen_range(ys.clone()));
            if domain.contains(p) {
                return Ok(p);
            }
        }
    }
    let len = domain.len();
    if len == 0 {
        return Err(GridError::invalid("random_point", "empty domain"));
    }
    let pick = rng.gen_range(0..len);
    tracing::debug!(cells = len, "random point fell back to enumeration");
    let picked = domain
        .iter()
        .nth(pick)
        .ok_or_else(|| GridError::invalid("random_point", "empty domain"));
    picked
}
