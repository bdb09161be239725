//! Errors raised when validating symmetry settings.

use std::error::Error;
use std::fmt;

use crate::symmetry::Symmetry;

/// Invalid combination of groups in a [`SymmetrySettings`](crate::SymmetrySettings).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymmetryError {
    /// A composite spawn group was paired with a team group that is not
    /// one of its axes.
    IncompatibleTeam {
        /// The composite spawn group.
        spawn: Symmetry,
        /// The rejected team group.
        team: Symmetry,
    },
    /// The terrain orbit size is not a multiple of the spawn orbit size.
    IncompatibleSpawn {
        /// The rejected spawn group.
        spawn: Symmetry,
        /// The terrain group.
        terrain: Symmetry,
    },
}

impl fmt::Display for SymmetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IncompatibleTeam { spawn, team } => {
                write!(f, "team symmetry {team} is not an axis of spawn symmetry {spawn}")
            }
            Self::IncompatibleSpawn { spawn, terrain } => write!(
                f,
                "terrain symmetry {terrain} ({} points) is not a multiple of spawn symmetry {spawn} ({} points)",
                terrain.num_points(),
                spawn.num_points()
            ),
        }
    }
}

impl Error for SymmetryError {}
