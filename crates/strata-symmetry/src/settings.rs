//! Per-role symmetry configuration carried by every grid.

use std::fmt;

use strata_core::{Point, Points};

use crate::domain::FundamentalDomain;
use crate::error::SymmetryError;
use crate::symmetry::{Angles, Symmetry};

/// Semantic role a symmetry group plays on a map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SymmetryRole {
    /// Symmetry between player spawns. Grid mutators preserve this one.
    Spawn,
    /// Symmetry between teams. Also selects the leading axis of a
    /// composite group.
    Team,
    /// Symmetry of the terrain as a whole.
    Terrain,
}

impl fmt::Display for SymmetryRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spawn => write!(f, "spawn"),
            Self::Team => write!(f, "team"),
            Self::Terrain => write!(f, "terrain"),
        }
    }
}

/// One [`Symmetry`] per [`SymmetryRole`]. Immutable once built.
///
/// Grids that interact in binary operations must carry equal settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SymmetrySettings {
    spawn: Symmetry,
    team: Symmetry,
    terrain: Symmetry,
}

impl SymmetrySettings {
    /// Validate and build settings.
    ///
    /// The terrain orbit size must be a multiple of the spawn orbit size,
    /// and a composite spawn group needs a team group that is `None` or
    /// one of its axes.
    pub fn new(
        spawn: Symmetry,
        team: Symmetry,
        terrain: Symmetry,
    ) -> Result<Self, SymmetryError> {
        if terrain.num_points() % spawn.num_points() != 0 {
            return Err(SymmetryError::IncompatibleSpawn { spawn, terrain });
        }
        if let Some((a, b)) = spawn.components() {
            if team != Symmetry::None && team != a && team != b {
                return Err(SymmetryError::IncompatibleTeam { spawn, team });
            }
        }
        Ok(Self {
            spawn,
            team,
            terrain,
        })
    }

    /// The same group in every role. A composite group gets its first
    /// axis as the team group.
    pub fn uniform(symmetry: Symmetry) -> Self {
        let team = symmetry.components().map_or(symmetry, |(a, _)| a);
        Self {
            spawn: symmetry,
            team,
            terrain: symmetry,
        }
    }

    /// No symmetry at all.
    pub fn none() -> Self {
        Self::uniform(Symmetry::None)
    }

    /// The group assigned to `role`.
    pub fn get(&self, role: SymmetryRole) -> Symmetry {
        match role {
            SymmetryRole::Spawn => self.spawn,
            SymmetryRole::Team => self.team,
            SymmetryRole::Terrain => self.terrain,
        }
    }

    /// Spawn group.
    pub fn spawn(&self) -> Symmetry {
        self.spawn
    }

    /// Team group.
    pub fn team(&self) -> Symmetry {
        self.team
    }

    /// Terrain group.
    pub fn terrain(&self) -> Symmetry {
        self.terrain
    }

    /// In-bounds counterparts of `p` under the `role` group, excluding
    /// `p` itself. Fixed points on a mirror axis come back as `p`.
    pub fn points(&self, role: SymmetryRole, p: Point, size: usize) -> Points {
        let mut pts = self.points_unbounded(role, p, size);
        pts.retain(|q| q.in_bounds(size));
        pts
    }

    /// Raw counterparts of `p`, possibly outside the grid.
    pub fn points_unbounded(&self, role: SymmetryRole, p: Point, size: usize) -> Points {
        self.get(role).raw_points(p, size, self.team)
    }

    /// Angular counterparts of a direction for stamping directional
    /// features, in `[0, 2π)`.
    pub fn rotation_counterparts(&self, role: SymmetryRole, angle: f32) -> Angles {
        self.get(role).angle_images(angle, self.team)
    }

    /// Fundamental domain of the `role` group.
    pub fn domain(&self, role: SymmetryRole, size: usize) -> FundamentalDomain {
        FundamentalDomain::new(self.get(role), size)
    }
}

impl Default for SymmetrySettings {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for SymmetrySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "spawn={} team={} terrain={}",
            self.spawn, self.team, self.terrain
        )
    }
}
