//! Random walks on boolean masks.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use smallvec::SmallVec;
use strata_core::GridError;
use strata_grid::Grid;
use strata_symmetry::SymmetryRole;

use crate::grid_helpers::STEPS_4;

/// Weight of each non-reversing step in a progressive walk; reversing
/// weighs 1.
const FORWARD_WEIGHT: u32 = 4;

/// Walkers that mark the cells they visit.
pub trait Walks {
    /// Start `walkers` walkers at random spawn-domain cells and move each
    /// `steps` times in a uniformly random axis direction, marking every
    /// visited cell and its counterparts true.
    fn random_walk(&mut self, walkers: usize, steps: usize) -> Result<(), GridError>;

    /// Like [`random_walk`](Walks::random_walk), but biased forward: each
    /// step that does not undo the previous one is four times as likely
    /// as the reversing step.
    fn progressive_walk(&mut self, walkers: usize, steps: usize) -> Result<(), GridError>;
}

fn walk(grid: &mut Grid<bool>, walkers: usize, steps: usize, progressive: bool) -> Result<(), GridError> {
    let size = grid.size();
    for _ in 0..walkers {
        let mut p = grid.random_point(SymmetryRole::Spawn)?;
        let mut last: Option<(i32, i32)> = None;
        grid.write_orbit(p, true);
        for _ in 0..steps {
            let choices: SmallVec<[(i32, i32); 4]> = STEPS_4
                .iter()
                .copied()
                .filter(|&(dx, dy)| p.offset(dx, dy).in_bounds(size))
                .collect();
            let reverse = if progressive { last.map(|(dx, dy)| (-dx, -dy)) } else { None };
            let Some(step) = pick_step(grid.rng_mut()?, &choices, reverse) else {
                break;
            };
            p = p.offset(step.0, step.1);
            last = Some(step);
            grid.write_orbit(p, true);
        }
    }
    grid.settle_symmetry();
    Ok(())
}

/// Weighted pick among `choices`; `reverse`, when present, gets weight 1
/// and every other step [`FORWARD_WEIGHT`].
fn pick_step(
    rng: &mut ChaCha8Rng,
    choices: &[(i32, i32)],
    reverse: Option<(i32, i32)>,
) -> Option<(i32, i32)> {
    let weight = |s: &(i32, i32)| if Some(*s) == reverse { 1 } else { FORWARD_WEIGHT };
    let total: u32 = choices.iter().map(weight).sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.gen_range(0..total);
    for s in choices {
        let w = weight(s);
        if roll < w {
            return Some(*s);
        }
        roll -= w;
    }
    None
}

impl Walks for Grid<bool> {
    fn random_walk(&mut self, walkers: usize, steps: usize) -> Result<(), GridError> {
        walk(self, walkers, steps, false)
    }

    fn progressive_walk(&mut self, walkers: usize, steps: usize) -> Result<(), GridError> {
        walk(self, walkers, steps, true)
    }
}
