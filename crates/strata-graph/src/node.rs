//! Execution nodes and the inputs they receive.

use std::any::{type_name, Any};
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;
use strata_core::{Cell, Generation, GridId, NodeId};
use strata_grid::Grid;

use crate::error::GraphError;
use crate::handle::GridRef;

/// Immutable snapshot of one grid generation, type-erased.
pub(crate) type State = Arc<dyn Any + Send + Sync>;

/// Type-erased node body: consumes the predecessor state, produces the
/// next one.
pub(crate) type Job = Box<dyn FnOnce(State, Inputs) -> Result<State, GraphError> + Send>;

/// One generation of one grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct StateKey {
    pub grid: GridId,
    pub generation: Generation,
}

impl StateKey {
    pub fn new(grid: GridId, generation: Generation) -> Self {
        Self { grid, generation }
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.grid, self.generation)
    }
}

/// A pending mutation of one grid.
///
/// `inputs[0]` is always the target's previous generation; the rest are
/// the declared dependencies at submission time.
pub(crate) struct Node {
    pub id: NodeId,
    pub label: String,
    pub grid_name: String,
    pub output: StateKey,
    pub inputs: SmallVec<[StateKey; 4]>,
    pub job: Job,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("output", &self.output)
            .field("inputs", &self.inputs)
            .finish_non_exhaustive()
    }
}

/// Read-only dependency snapshots handed to a node closure.
pub struct Inputs {
    states: SmallVec<[Dependency; 4]>,
}

/// One resolved dependency.
pub(crate) struct Dependency {
    pub grid: GridId,
    pub cell: &'static str,
    pub state: State,
}

impl Inputs {
    pub(crate) fn new(states: SmallVec<[Dependency; 4]>) -> Self {
        Self { states }
    }

    /// The declared dependency `grid`, as it was when the node was
    /// submitted.
    ///
    /// # Errors
    ///
    /// [`GraphError::UndeclaredDependency`] when `grid` was not declared,
    /// [`GraphError::TypeMismatch`] when it holds another cell type.
    pub fn get<U: Cell>(&self, grid: impl Into<GridRef>) -> Result<&Grid<U>, GraphError> {
        let id = grid.into().grid;
        let dep = self
            .states
            .iter()
            .find(|d| d.grid == id)
            .ok_or(GraphError::UndeclaredDependency { grid: id })?;
        dep.state
            .downcast_ref::<Grid<U>>()
            .ok_or(GraphError::TypeMismatch {
                grid: id,
                expected: dep.cell,
                actual: type_name::<U>(),
            })
    }

    /// Number of declared dependencies.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether the node declared no dependencies.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

impl fmt::Debug for Inputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.states.iter().map(|d| d.grid))
            .finish()
    }
}

/// Wrap a typed closure into a [`Job`].
pub(crate) fn job<T, F>(grid: GridId, cell: &'static str, f: F) -> Job
where
    T: Cell,
    F: FnOnce(&mut Grid<T>, &Inputs) -> Result<(), GraphError> + Send + 'static,
{
    Box::new(move |state: State, inputs: Inputs| {
        let arc = state
            .downcast::<Grid<T>>()
            .map_err(|_| GraphError::TypeMismatch {
                grid,
                expected: cell,
                actual: type_name::<T>(),
            })?;
        // Copies only when another pending reader still shares the state.
        let mut target = Arc::unwrap_or_clone(arc);
        f(&mut target, &inputs)?;
        Ok(Arc::new(target) as State)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::PipelineId;

    use crate::handle::GridHandle;

    fn grid(v: f32) -> State {
        Arc::new(Grid::<f32>::builder(2).fill(v).build().unwrap())
    }

    #[test]
    fn inputs_resolve_declared_grids_only() {
        let pipeline = PipelineId::next();
        let a = GridHandle::<f32>::new(pipeline, GridId(1));
        let b = GridHandle::<f32>::new(pipeline, GridId(2));
        let inputs = Inputs::new(SmallVec::from_iter([Dependency {
            grid: GridId(1),
            cell: type_name::<f32>(),
            state: grid(2.0),
        }]));
        assert_eq!(inputs.get::<f32>(a).unwrap().get(0, 0), 2.0);
        assert_eq!(
            inputs.get::<f32>(b).unwrap_err(),
            GraphError::UndeclaredDependency { grid: GridId(2) }
        );
        assert!(matches!(
            inputs.get::<i32>(a),
            Err(GraphError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn unique_state_is_mutated_in_place() {
        let state = grid(1.0);
        let job = job::<f32, _>(GridId(0), "f32", |g, _| {
            g.add_value(1.0)?;
            Ok(())
        });
        let out = job(state, Inputs::new(SmallVec::new())).unwrap();
        let g = out.downcast_ref::<Grid<f32>>().unwrap();
        assert_eq!(g.get(1, 1), 2.0);
    }

    #[test]
    fn shared_state_is_copied() {
        let state = grid(1.0);
        let keep = Arc::clone(&state);
        let job = job::<f32, _>(GridId(0), "f32", |g, _| {
            g.fill(9.0);
            Ok(())
        });
        job(state, Inputs::new(SmallVec::new())).unwrap();
        assert_eq!(keep.downcast_ref::<Grid<f32>>().unwrap().get(0, 0), 1.0);
    }
}
