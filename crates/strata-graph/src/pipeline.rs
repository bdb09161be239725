//! The deferred execution front end.
//!
//! A [`Pipeline`] owns the grids of one generation run. Grids enter it
//! with [`insert`](Pipeline::insert) and are addressed by typed
//! [`GridHandle`]s afterwards. Every mutation becomes a node that runs
//! when some result is needed:
//!
//! - [`await_grid`](Pipeline::await_grid) runs exactly the ancestors of
//!   one grid's latest state and returns an independent copy.
//! - [`finalize`](Pipeline::finalize) does the same and takes the grid
//!   out of the pipeline.
//! - [`run`](Pipeline::run) drains everything that is pending.
//! - [`finish`](Pipeline::finish) and [`reset`](Pipeline::reset) end the
//!   run and report failures no await observed.
//!
//! Within one grid nodes run in submission order. Across grids the only
//! ordering is the one given by declared dependencies.

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use smallvec::SmallVec;
use strata_core::{Cell, GridError, GridId, NodeId, PipelineId};
use strata_grid::{BinaryOp, Grid};
use strata_symmetry::SymmetrySettings;

use crate::config::PipelineConfig;
use crate::error::GraphError;
use crate::handle::{GridHandle, GridRef};
use crate::metrics::RunMetrics;
use crate::node::{job, Inputs, Node, StateKey};
use crate::scheduler::{execute, CellNames, Graph};

/// Metadata of a grid owned by the pipeline, tracked at submission time.
#[derive(Clone, Debug)]
struct Slot {
    name: String,
    cell: &'static str,
    type_id: TypeId,
    size: usize,
    symmetry: SymmetrySettings,
}

/// Deferred execution graph of one generation run.
pub struct Pipeline {
    id: PipelineId,
    config: PipelineConfig,
    slots: IndexMap<GridId, Slot>,
    cells: CellNames,
    graph: Graph,
    next_grid: u32,
    next_node: u64,
    metrics: RunMetrics,
}

impl Pipeline {
    /// Create an empty pipeline.
    ///
    /// # Errors
    ///
    /// [`GraphError::Config`] if `config` fails validation.
    pub fn new(config: PipelineConfig) -> Result<Self, GraphError> {
        config.validate()?;
        Ok(Self {
            id: PipelineId::next(),
            config,
            slots: IndexMap::new(),
            cells: CellNames::new(),
            graph: Graph::default(),
            next_grid: 0,
            next_node: 0,
            metrics: RunMetrics::default(),
        })
    }

    /// This pipeline's id. Changes on [`reset`](Pipeline::reset).
    pub fn id(&self) -> PipelineId {
        self.id
    }

    /// The configuration the pipeline was built with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Number of grids currently owned.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the pipeline owns no grids.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of nodes not yet executed.
    pub fn pending(&self) -> usize {
        self.graph.pending_len()
    }

    /// Counters accumulated since creation or the last reset.
    pub fn metrics(&self) -> &RunMetrics {
        &self.metrics
    }

    /// Move `grid` into the pipeline.
    pub fn insert<T: Cell>(&mut self, grid: Grid<T>) -> GridHandle<T> {
        let id = GridId(self.next_grid);
        self.next_grid += 1;
        self.slots.insert(
            id,
            Slot {
                name: grid.name().to_string(),
                cell: type_name::<T>(),
                type_id: TypeId::of::<T>(),
                size: grid.size(),
                symmetry: *grid.symmetry(),
            },
        );
        self.cells.insert(id, type_name::<T>());
        tracing::debug!(grid = %id, name = %grid.name(), size = grid.size(), "grid inserted");
        self.graph
            .insert_state(StateKey::new(id, Default::default()), Arc::new(grid));
        GridHandle::new(self.id, id)
    }

    fn slot_of(&self, r: GridRef) -> Result<&Slot, GraphError> {
        if r.pipeline != self.id {
            return Err(GraphError::UnknownGrid { grid: r.grid });
        }
        self.slots
            .get(&r.grid)
            .ok_or(GraphError::UnknownGrid { grid: r.grid })
    }

    fn slot<T: Cell>(&self, h: &GridHandle<T>) -> Result<&Slot, GraphError> {
        let slot = self.slot_of(h.to_ref())?;
        if slot.type_id != TypeId::of::<T>() {
            return Err(GraphError::TypeMismatch {
                grid: h.grid,
                expected: slot.cell,
                actual: type_name::<T>(),
            });
        }
        Ok(slot)
    }

    /// Side length the grid will have once its pending nodes ran.
    pub fn size<T: Cell>(&self, h: &GridHandle<T>) -> Result<usize, GraphError> {
        Ok(self.slot(h)?.size)
    }

    /// Symmetry settings of the grid.
    pub fn symmetry<T: Cell>(&self, h: &GridHandle<T>) -> Result<SymmetrySettings, GraphError> {
        Ok(self.slot(h)?.symmetry)
    }

    /// Name of the grid.
    pub fn name<T: Cell>(&self, h: &GridHandle<T>) -> Result<&str, GraphError> {
        Ok(&self.slot(h)?.name)
    }

    /// Defer `f` as the next mutation of `target`.
    ///
    /// The node reads the target's previous generation and the current
    /// generation of every grid in `deps`, available through
    /// [`Inputs::get`]. The closure must keep the grid size; use
    /// [`resize`](Pipeline::resize) to change it.
    ///
    /// # Errors
    ///
    /// [`GraphError::UnknownGrid`] for handles from another pipeline or
    /// for finalized grids, [`GraphError::TypeMismatch`] when the handle's
    /// cell type does not match.
    pub fn submit<T, F>(
        &mut self,
        target: &GridHandle<T>,
        deps: &[GridRef],
        label: impl Into<String>,
        f: F,
    ) -> Result<NodeId, GraphError>
    where
        T: Cell,
        F: FnOnce(&mut Grid<T>, &Inputs) -> Result<(), GraphError> + Send + 'static,
    {
        let size = self.slot(target)?.size;
        self.push_node(target, deps, label.into(), move |g: &mut Grid<T>, inputs: &Inputs| {
            f(g, inputs)?;
            if g.size() != size {
                return Err(GridError::invalid(
                    "submit",
                    format!("node resized the grid from {size} to {}", g.size()),
                )
                .into());
            }
            Ok(())
        })
    }

    fn push_node<T, F>(
        &mut self,
        target: &GridHandle<T>,
        deps: &[GridRef],
        label: String,
        f: F,
    ) -> Result<NodeId, GraphError>
    where
        T: Cell,
        F: FnOnce(&mut Grid<T>, &Inputs) -> Result<(), GraphError> + Send + 'static,
    {
        let slot = self.slot(target)?;
        let grid_name = slot.name.clone();
        let cell = slot.cell;
        for dep in deps {
            self.slot_of(*dep)?;
        }
        let previous = self
            .graph
            .latest(target.grid)
            .ok_or(GraphError::UnknownGrid { grid: target.grid })?;
        let mut inputs: SmallVec<[StateKey; 4]> = SmallVec::new();
        inputs.push(previous);
        for dep in deps {
            let key = self
                .graph
                .latest(dep.grid)
                .ok_or(GraphError::UnknownGrid { grid: dep.grid })?;
            inputs.push(key);
        }
        let id = NodeId(self.next_node);
        self.next_node += 1;
        let output = StateKey::new(target.grid, previous.generation.next());
        tracing::debug!(node = %id, grid = %grid_name, %label, deps = deps.len(), "node submitted");
        self.graph.add_node(Node {
            id,
            label,
            grid_name,
            output,
            inputs,
            job: job(target.grid, cell, f),
        });
        Ok(id)
    }

    /// Defer `target op= operand`.
    ///
    /// # Errors
    ///
    /// Size or symmetry mismatches are raised here, before anything is
    /// submitted.
    pub fn combine<T: Cell>(
        &mut self,
        target: &GridHandle<T>,
        operand: &GridHandle<T>,
        op: BinaryOp,
    ) -> Result<NodeId, GraphError> {
        let a = self.slot(target)?;
        let b = self.slot(operand)?;
        if a.size != b.size {
            return Err(GridError::SizeMismatch {
                expected: a.size,
                actual: b.size,
            }
            .into());
        }
        if a.symmetry != b.symmetry {
            return Err(GridError::SymmetryMismatch {
                expected: a.symmetry.to_string(),
                actual: b.symmetry.to_string(),
            }
            .into());
        }
        let operand = *operand;
        self.submit(target, &[operand.to_ref()], op.to_string(), move |g, inputs| {
            g.combine(inputs.get::<T>(operand)?, None, op)?;
            Ok(())
        })
    }

    /// Defer an index-remap resize of `target`.
    ///
    /// # Errors
    ///
    /// [`GridError::EmptyGrid`] for a zero size, raised here.
    pub fn resize<T: Cell>(
        &mut self,
        target: &GridHandle<T>,
        new_size: usize,
    ) -> Result<NodeId, GraphError> {
        if new_size == 0 {
            return Err(GridError::EmptyGrid.into());
        }
        self.slot(target)?;
        let id = self.push_node(target, &[], format!("resize {new_size}"), move |g, _| {
            g.resize(new_size)?;
            Ok(())
        })?;
        if let Some(slot) = self.slots.get_mut(&target.grid) {
            slot.size = new_size;
        }
        Ok(id)
    }

    /// Run every pending node.
    ///
    /// Node failures do not fail the run; they surface at the next await
    /// of an affected grid or from [`finish`](Pipeline::finish).
    pub fn run(&mut self) -> Result<(), GraphError> {
        let wanted = self.graph.all_pending();
        execute(
            &mut self.graph,
            wanted,
            &self.cells,
            &self.config,
            &mut self.metrics,
        )
    }

    /// Run the ancestors of the grid's latest state and return its key.
    fn materialize<T: Cell>(&mut self, h: &GridHandle<T>) -> Result<StateKey, GraphError> {
        self.slot(h)?;
        let key = self
            .graph
            .latest(h.grid)
            .ok_or(GraphError::UnknownGrid { grid: h.grid })?;
        let wanted = self.graph.ancestors(&[key]);
        execute(
            &mut self.graph,
            wanted,
            &self.cells,
            &self.config,
            &mut self.metrics,
        )?;
        Ok(key)
    }

    /// Turn a failed state into the error an await reports.
    fn failed<T: Cell>(&mut self, h: &GridHandle<T>, key: StateKey) -> Result<(), GraphError> {
        let failure = match self.graph.fetch(key) {
            Some(Err(f)) => f.clone(),
            Some(Ok(_)) => return Ok(()),
            None => return Err(GraphError::UnknownGrid { grid: h.grid }),
        };
        self.graph.observe(failure.node);
        if failure.grid == h.grid {
            Err(GraphError::NodeFailed(failure))
        } else {
            let grid = self.slot(h).map(|s| s.name.clone()).unwrap_or_default();
            Err(GraphError::UpstreamFailed {
                grid,
                origin: failure,
            })
        }
    }

    /// Compute the grid and return an independent copy of it. The grid
    /// stays in the pipeline.
    ///
    /// # Errors
    ///
    /// [`GraphError::NodeFailed`] or [`GraphError::UpstreamFailed`] when
    /// a node the grid depends on failed.
    pub fn await_grid<T: Cell>(&mut self, h: &GridHandle<T>) -> Result<Grid<T>, GraphError> {
        let key = self.materialize(h)?;
        self.failed(h, key)?;
        match self.graph.fetch(key) {
            Some(Ok(state)) => downcast::<T>(h.grid, &**state).cloned(),
            _ => Err(GraphError::UnknownGrid { grid: h.grid }),
        }
    }

    /// Compute the grid and take it out of the pipeline. The handle is
    /// dead afterwards.
    ///
    /// # Errors
    ///
    /// As [`await_grid`](Pipeline::await_grid), plus
    /// [`GraphError::GridInUse`] while pending nodes of other grids still
    /// read it.
    pub fn finalize<T: Cell>(&mut self, h: GridHandle<T>) -> Result<Grid<T>, GraphError> {
        let key = self.materialize(&h)?;
        self.failed(&h, key)?;
        let readers = self.graph.readers_of(key);
        if readers > 0 {
            let grid = self.slot(&h)?.name.clone();
            return Err(GraphError::GridInUse { grid, readers });
        }
        let state = self
            .graph
            .take_grid(h.grid)
            .ok_or(GraphError::UnknownGrid { grid: h.grid })?;
        self.slots.shift_remove(&h.grid);
        self.cells.remove(&h.grid);
        let arc = state
            .downcast::<Grid<T>>()
            .map_err(|_| GraphError::UnknownGrid { grid: h.grid })?;
        tracing::debug!(grid = %h.grid, "grid finalized");
        Ok(Arc::unwrap_or_clone(arc))
    }

    /// Run everything still pending and end the run.
    ///
    /// # Errors
    ///
    /// [`GraphError::UnobservedFailures`] listing every node failure no
    /// await reported.
    pub fn finish(mut self) -> Result<RunMetrics, GraphError> {
        self.run()?;
        let unobserved = self.graph.unobserved();
        tracing::debug!(
            executed = self.metrics.executed,
            failed = self.metrics.failed,
            skipped = self.metrics.skipped,
            unobserved = unobserved.len(),
            "pipeline finished"
        );
        if unobserved.is_empty() {
            Ok(self.metrics)
        } else {
            Err(GraphError::UnobservedFailures(unobserved))
        }
    }

    /// Discard every grid and pending node and start a new run. Handles
    /// issued before the reset are dead afterwards.
    ///
    /// # Errors
    ///
    /// [`GraphError::UnobservedFailures`] listing node failures no await
    /// reported. The pipeline is reset either way.
    pub fn reset(&mut self) -> Result<(), GraphError> {
        let unobserved = self.graph.unobserved();
        let discarded = self.graph.pending_len();
        if discarded > 0 {
            tracing::warn!(discarded, "reset discarded pending nodes");
        }
        self.id = PipelineId::next();
        self.slots.clear();
        self.cells.clear();
        self.graph = Graph::default();
        self.next_grid = 0;
        self.next_node = 0;
        self.metrics = RunMetrics::default();
        if unobserved.is_empty() {
            Ok(())
        } else {
            Err(GraphError::UnobservedFailures(unobserved))
        }
    }
}

fn downcast<T: Cell>(grid: GridId, state: &(dyn Any + Send + Sync)) -> Result<&Grid<T>, GraphError> {
    state
        .downcast_ref::<Grid<T>>()
        .ok_or(GraphError::TypeMismatch {
            grid,
            expected: "another cell type",
            actual: type_name::<T>(),
        })
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("id", &self.id)
            .field("grids", &self.slots.len())
            .field("pending", &self.graph.pending_len())
            .field("metrics", &self.metrics)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline() -> Pipeline {
        Pipeline::new(PipelineConfig::with_workers(2)).unwrap()
    }

    fn grid(size: usize, v: i32) -> Grid<i32> {
        Grid::<i32>::builder(size).fill(v).name("g").build().unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(matches!(
            Pipeline::new(PipelineConfig::with_workers(0)),
            Err(GraphError::Config(_))
        ));
    }

    #[test]
    fn submissions_are_deferred_until_awaited() {
        let mut p = pipeline();
        let h = p.insert(grid(3, 1));
        p.submit(&h, &[], "add", |g, _| Ok(g.add_value(2)?)).unwrap();
        assert_eq!(p.pending(), 1);
        assert_eq!(p.metrics().executed, 0);
        let out = p.await_grid(&h).unwrap();
        assert_eq!(out.get(2, 2), 3);
        assert_eq!(p.pending(), 0);
    }

    #[test]
    fn resize_tracks_size_and_rejects_zero() {
        let mut p = pipeline();
        let h = p.insert(grid(4, 1));
        p.resize(&h, 8).unwrap();
        assert_eq!(p.size(&h).unwrap(), 8);
        assert!(matches!(
            p.resize(&h, 0),
            Err(GraphError::Grid(GridError::EmptyGrid))
        ));
        assert_eq!(p.await_grid(&h).unwrap().size(), 8);
    }

    #[test]
    fn closures_may_not_resize() {
        let mut p = pipeline();
        let h = p.insert(grid(4, 1));
        p.submit(&h, &[], "sneaky", |g, _| Ok(g.resize(2)?)).unwrap();
        assert!(matches!(p.await_grid(&h), Err(GraphError::NodeFailed(_))));
    }

    #[test]
    fn combine_checks_compatibility_synchronously() {
        let mut p = pipeline();
        let a = p.insert(grid(4, 1));
        let b = p.insert(grid(5, 1));
        let err = p.combine(&a, &b, BinaryOp::Add).unwrap_err();
        assert!(matches!(err, GraphError::Grid(GridError::SizeMismatch { .. })));
        assert_eq!(p.pending(), 0);
    }

    #[test]
    fn combine_with_itself_doubles() {
        let mut p = pipeline();
        let a = p.insert(grid(3, 4));
        p.combine(&a, &a, BinaryOp::Add).unwrap();
        assert_eq!(p.await_grid(&a).unwrap().get(1, 1), 8);
    }

    #[test]
    fn foreign_and_finalized_handles_are_unknown() {
        let mut p = pipeline();
        let mut q = pipeline();
        let h = p.insert(grid(2, 0));
        assert!(matches!(q.await_grid(&h), Err(GraphError::UnknownGrid { .. })));
        let g = p.finalize(h).unwrap();
        assert_eq!(g.size(), 2);
        assert!(p.is_empty());
        assert!(matches!(p.await_grid(&h), Err(GraphError::UnknownGrid { .. })));
    }

    #[test]
    fn reset_invalidates_handles() {
        let mut p = pipeline();
        let h = p.insert(grid(2, 0));
        p.reset().unwrap();
        assert!(matches!(p.size(&h), Err(GraphError::UnknownGrid { .. })));
    }
}
