//! Graph bookkeeping and the worker pool that drains it.
//!
//! The coordinator (the thread calling into the pipeline) owns every
//! piece of scheduler state. Workers only see a [`Task`]: the states a
//! node needs plus its closure. They answer with a [`Done`] message.
//!
//! State lifetime follows reader counts: a snapshot stays in the map
//! while a pending node still reads it or while it is the latest
//! generation of its grid. When the last reader of a superseded
//! snapshot is dispatched, the snapshot moves into that task, so a
//! node mutating its predecessor only copies when another reader
//! still holds it.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Receiver, Sender};
use indexmap::IndexMap;
use smallvec::SmallVec;
use strata_core::{Generation, GridId, NodeId};

use crate::config::PipelineConfig;
use crate::error::{GraphError, NodeFailure};
use crate::metrics::RunMetrics;
use crate::node::{Dependency, Inputs, Job, Node, State, StateKey};

/// Work handed to a worker.
struct Task {
    node: NodeId,
    output: StateKey,
    state: State,
    inputs: Inputs,
    job: Job,
}

/// A worker's answer.
struct Done {
    node: NodeId,
    output: StateKey,
    result: Result<State, String>,
    busy: Duration,
}

/// Cell type name of each grid, for dependency type errors.
pub(crate) type CellNames = HashMap<GridId, &'static str>;

/// Pending nodes, materialized snapshots and failure records.
#[derive(Default)]
pub(crate) struct Graph {
    pending: IndexMap<NodeId, Node>,
    producers: HashMap<StateKey, NodeId>,
    states: HashMap<StateKey, State>,
    readers: HashMap<StateKey, usize>,
    latest: HashMap<GridId, Generation>,
    /// Failed or poisoned states, with the failure that caused them.
    failures: HashMap<StateKey, NodeFailure>,
    /// Every node failure, in the order it happened.
    recorded: IndexMap<NodeId, NodeFailure>,
    observed: HashSet<NodeId>,
}

impl Graph {
    /// Register a grid's initial state.
    pub fn insert_state(&mut self, key: StateKey, state: State) {
        self.states.insert(key, state);
        self.latest.insert(key.grid, key.generation);
    }

    /// Latest generation of `grid`, materialized or not.
    pub fn latest(&self, grid: GridId) -> Option<StateKey> {
        self.latest.get(&grid).map(|g| StateKey::new(grid, *g))
    }

    pub fn add_node(&mut self, node: Node) {
        for key in &node.inputs {
            *self.readers.entry(*key).or_insert(0) += 1;
        }
        self.producers.insert(node.output, node.id);
        self.latest.insert(node.output.grid, node.output.generation);
        self.pending.insert(node.id, node);
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Pending nodes still reading `key`.
    pub fn readers_of(&self, key: StateKey) -> usize {
        self.readers.get(&key).copied().unwrap_or(0)
    }

    /// Pending nodes needed to materialize `keys`, in submission order.
    pub fn ancestors(&self, keys: &[StateKey]) -> Vec<NodeId> {
        let mut wanted = HashSet::new();
        let mut stack: Vec<StateKey> = keys.to_vec();
        while let Some(key) = stack.pop() {
            let Some(&id) = self.producers.get(&key) else {
                continue;
            };
            if !wanted.insert(id) {
                continue;
            }
            if let Some(node) = self.pending.get(&id) {
                stack.extend(node.inputs.iter().copied());
            }
        }
        self.pending
            .keys()
            .filter(|id| wanted.contains(*id))
            .copied()
            .collect()
    }

    /// Every pending node, in submission order.
    pub fn all_pending(&self) -> Vec<NodeId> {
        self.pending.keys().copied().collect()
    }

    /// The materialized state at `key`, or the failure that replaced it.
    pub fn fetch(&self, key: StateKey) -> Option<Result<&State, &NodeFailure>> {
        if let Some(failure) = self.failures.get(&key) {
            return Some(Err(failure));
        }
        self.states.get(&key).map(Ok)
    }

    /// Mark a failure as seen by a caller.
    pub fn observe(&mut self, node: NodeId) {
        self.observed.insert(node);
    }

    /// Failures no caller has seen.
    pub fn unobserved(&self) -> Vec<NodeFailure> {
        self.recorded
            .iter()
            .filter(|(id, _)| !self.observed.contains(*id))
            .map(|(_, f)| f.clone())
            .collect()
    }

    /// Remove a grid's latest state. The caller guarantees no pending
    /// node reads or writes it.
    pub fn take_grid(&mut self, grid: GridId) -> Option<State> {
        let key = self.latest(grid)?;
        self.latest.remove(&grid);
        self.readers.remove(&key);
        self.producers.remove(&key);
        self.states.remove(&key)
    }

    fn superseded(&self, key: StateKey) -> bool {
        self.latest
            .get(&key.grid)
            .is_none_or(|latest| *latest > key.generation)
    }

    fn available(&self, key: &StateKey) -> bool {
        self.states.contains_key(key) || self.failures.contains_key(key)
    }

    /// Give up one read of `key`. Returns the state, moved out of the
    /// map when this was its last reader and it is superseded.
    fn checkout(&mut self, key: StateKey) -> Option<State> {
        let remaining = match self.readers.get_mut(&key) {
            Some(n) => {
                *n = n.saturating_sub(1);
                *n
            }
            None => 0,
        };
        if remaining == 0 {
            self.readers.remove(&key);
            if self.superseded(key) {
                self.producers.remove(&key);
                return self.states.remove(&key);
            }
        }
        self.states.get(&key).cloned()
    }

    fn poisoned_by(&self, node: &Node) -> Option<NodeFailure> {
        node.inputs
            .iter()
            .find_map(|key| self.failures.get(key).cloned())
    }

    fn skip(&mut self, node: Node, origin: NodeFailure) {
        tracing::debug!(node = %node.id, label = %node.label, origin = %origin.node, "node skipped");
        for key in &node.inputs {
            self.checkout(*key);
        }
        self.producers.remove(&node.output);
        self.failures.insert(node.output, origin);
    }

    fn prepare(&mut self, node: Node, cells: &CellNames) -> Result<Task, GraphError> {
        let mut inputs = node.inputs.iter().copied();
        let predecessor = inputs.next().ok_or(GraphError::UnknownGrid {
            grid: node.output.grid,
        })?;
        let state = self
            .checkout(predecessor)
            .ok_or(GraphError::UnknownGrid {
                grid: predecessor.grid,
            })?;
        let mut deps: SmallVec<[Dependency; 4]> = SmallVec::new();
        for key in inputs {
            let dep = self
                .checkout(key)
                .ok_or(GraphError::UnknownGrid { grid: key.grid })?;
            deps.push(Dependency {
                grid: key.grid,
                cell: cells.get(&key.grid).copied().unwrap_or("unknown"),
                state: dep,
            });
        }
        tracing::trace!(node = %node.id, label = %node.label, output = %node.output, "node dispatched");
        self.producers.remove(&node.output);
        Ok(Task {
            node: node.id,
            output: node.output,
            state,
            inputs: Inputs::new(deps),
            job: node.job,
        })
    }

    fn complete(&mut self, done: Done, grid_name: String, label: String, metrics: &mut RunMetrics) {
        metrics.busy += done.busy;
        match done.result {
            Ok(state) => {
                metrics.executed += 1;
                if self.superseded(done.output) && self.readers_of(done.output) == 0 {
                    return;
                }
                self.states.insert(done.output, state);
            }
            Err(reason) => {
                metrics.failed += 1;
                let failure = NodeFailure {
                    node: done.node,
                    grid: done.output.grid,
                    grid_name,
                    label,
                    reason,
                };
                tracing::warn!(
                    node = %failure.node,
                    grid = %failure.grid_name,
                    label = %failure.label,
                    reason = %failure.reason,
                    "node failed"
                );
                self.failures.insert(done.output, failure.clone());
                self.recorded.insert(done.node, failure);
            }
        }
    }
}

/// Execute `wanted` (pending node ids in submission order) on a scoped
/// worker pool and fold the results back into `graph`.
pub(crate) fn execute(
    graph: &mut Graph,
    wanted: Vec<NodeId>,
    cells: &CellNames,
    config: &PipelineConfig,
    metrics: &mut RunMetrics,
) -> Result<(), GraphError> {
    let mut waiting: IndexMap<NodeId, Node> = wanted
        .into_iter()
        .filter_map(|id| graph.pending.shift_remove(&id).map(|n| (id, n)))
        .collect();
    if waiting.is_empty() {
        return Ok(());
    }
    let started = Instant::now();
    let total = waiting.len();
    let workers = config.resolved_worker_count().min(total);
    let before = metrics.clone();

    let result = std::thread::scope(|scope| -> Result<(), GraphError> {
        let (task_tx, task_rx) = unbounded::<Task>();
        let (done_tx, done_rx) = unbounded::<Done>();
        for index in 0..workers {
            let rx = task_rx.clone();
            let tx = done_tx.clone();
            std::thread::Builder::new()
                .name(format!("{}-{index}", config.thread_name))
                .spawn_scoped(scope, move || worker_loop(rx, tx))
                .map_err(|e| GraphError::ThreadSpawnFailed {
                    reason: e.to_string(),
                })?;
        }
        drop(task_rx);
        drop(done_tx);

        // Names and labels of in-flight nodes, for failure records.
        let mut in_flight: HashMap<NodeId, (String, String)> = HashMap::new();
        while !waiting.is_empty() || !in_flight.is_empty() {
            let mut progressed = false;
            let ready: Vec<NodeId> = waiting
                .iter()
                .filter(|(_, n)| n.inputs.iter().all(|k| graph.available(k)))
                .map(|(id, _)| *id)
                .collect();
            for id in ready {
                let Some(node) = waiting.shift_remove(&id) else {
                    continue;
                };
                progressed = true;
                if let Some(origin) = graph.poisoned_by(&node) {
                    metrics.skipped += 1;
                    graph.skip(node, origin);
                    continue;
                }
                let names = (node.grid_name.clone(), node.label.clone());
                let task = graph.prepare(node, cells)?;
                in_flight.insert(id, names);
                task_tx.send(task).map_err(|_| GraphError::WorkerLost)?;
            }
            if in_flight.is_empty() {
                if progressed {
                    continue;
                }
                // Nothing runs and nothing is ready: an input vanished.
                let missing = waiting
                    .values()
                    .flat_map(|n| n.inputs.iter())
                    .find(|k| !graph.available(k))
                    .map(|k| k.grid);
                return Err(GraphError::UnknownGrid {
                    grid: missing.unwrap_or(GridId(u32::MAX)),
                });
            }
            let done = done_rx.recv().map_err(|_| GraphError::WorkerLost)?;
            let (grid_name, label) = in_flight.remove(&done.node).unwrap_or_default();
            graph.complete(done, grid_name, label, metrics);
        }
        Ok(())
    });

    // Nodes not dispatched because of an infrastructure error go back.
    for (id, node) in waiting {
        graph.pending.insert(id, node);
    }
    graph.pending.sort_keys();

    metrics.runs += 1;
    metrics.wall += started.elapsed();
    tracing::debug!(
        nodes = total,
        workers,
        executed = metrics.executed - before.executed,
        failed = metrics.failed - before.failed,
        skipped = metrics.skipped - before.skipped,
        elapsed_us = started.elapsed().as_micros() as u64,
        "run complete"
    );
    result
}

/// Main loop of a worker thread. Runs until the task channel closes.
fn worker_loop(tasks: Receiver<Task>, done: Sender<Done>) {
    while let Ok(task) = tasks.recv() {
        let Task {
            node,
            output,
            state,
            inputs,
            job,
        } = task;
        let started = Instant::now();
        let result = match panic::catch_unwind(AssertUnwindSafe(move || job(state, inputs))) {
            Ok(Ok(state)) => Ok(state),
            Ok(Err(e)) => Err(e.to_string()),
            Err(payload) => Err(panic_message(payload.as_ref())),
        };
        let reply = Done {
            node,
            output,
            result,
            busy: started.elapsed(),
        };
        if done.send(reply).is_err() {
            break;
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {s}")
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use strata_core::PipelineId;
    use strata_grid::Grid;

    use crate::handle::GridRef;
    use crate::node::job;

    fn key(grid: u32, generation: u32) -> StateKey {
        StateKey::new(GridId(grid), Generation(generation))
    }

    fn state(v: i32) -> State {
        Arc::new(Grid::<i32>::builder(2).fill(v).build().unwrap())
    }

    fn value(graph: &Graph, k: StateKey) -> i32 {
        match graph.fetch(k) {
            Some(Ok(s)) => s.downcast_ref::<Grid<i32>>().unwrap().get(0, 0),
            other => panic!("no state at {k}: {:?}", other.map(|r| r.is_ok())),
        }
    }

    fn add_node(graph: &mut Graph, id: u64, output: StateKey, inputs: &[StateKey], delta: i32) {
        let deps: Vec<GridId> = inputs[1..].iter().map(|k| k.grid).collect();
        graph.add_node(Node {
            id: NodeId(id),
            label: format!("n{id}"),
            grid_name: format!("g{}", output.grid),
            output,
            inputs: inputs.iter().copied().collect(),
            job: job::<i32, _>(output.grid, "i32", move |g, inputs| {
                let mut extra = 0;
                for d in &deps {
                    extra += inputs.get::<i32>(dep_ref(*d))?.get(0, 0);
                }
                g.add_value(delta + extra)?;
                Ok(())
            }),
        });
    }

    fn dep_ref(grid: GridId) -> GridRef {
        GridRef {
            pipeline: PipelineId::next(),
            grid,
        }
    }

    fn run_all(graph: &mut Graph, workers: usize) -> RunMetrics {
        let mut metrics = RunMetrics::default();
        let wanted = graph.all_pending();
        execute(
            graph,
            wanted,
            &CellNames::new(),
            &PipelineConfig::with_workers(workers),
            &mut metrics,
        )
        .unwrap();
        metrics
    }

    #[test]
    fn chain_runs_in_order_and_drops_old_states() {
        let mut graph = Graph::default();
        graph.insert_state(key(0, 0), state(1));
        add_node(&mut graph, 0, key(0, 1), &[key(0, 0)], 2);
        add_node(&mut graph, 1, key(0, 2), &[key(0, 1)], 3);
        let metrics = run_all(&mut graph, 2);
        assert_eq!(metrics.executed, 2);
        assert_eq!(value(&graph, key(0, 2)), 6);
        assert!(graph.fetch(key(0, 0)).is_none());
        assert!(graph.fetch(key(0, 1)).is_none());
    }

    #[test]
    fn readers_see_the_generation_they_declared() {
        let mut graph = Graph::default();
        graph.insert_state(key(0, 0), state(10));
        graph.insert_state(key(1, 0), state(0));
        // Grid 1 reads grid 0 before grid 0 is bumped.
        add_node(&mut graph, 0, key(1, 1), &[key(1, 0), key(0, 0)], 0);
        add_node(&mut graph, 1, key(0, 1), &[key(0, 0)], 5);
        run_all(&mut graph, 4);
        assert_eq!(value(&graph, key(1, 1)), 10);
        assert_eq!(value(&graph, key(0, 1)), 15);
    }

    #[test]
    fn ancestors_exclude_unrelated_nodes() {
        let mut graph = Graph::default();
        graph.insert_state(key(0, 0), state(0));
        graph.insert_state(key(1, 0), state(0));
        add_node(&mut graph, 0, key(0, 1), &[key(0, 0)], 1);
        add_node(&mut graph, 1, key(1, 1), &[key(1, 0)], 1);
        add_node(&mut graph, 2, key(1, 2), &[key(1, 1), key(0, 1)], 1);
        assert_eq!(graph.ancestors(&[key(0, 1)]), vec![NodeId(0)]);
        assert_eq!(
            graph.ancestors(&[key(1, 2)]),
            vec![NodeId(0), NodeId(1), NodeId(2)]
        );
    }

    #[test]
    fn failures_poison_descendants_only() {
        let mut graph = Graph::default();
        graph.insert_state(key(0, 0), state(0));
        graph.insert_state(key(1, 0), state(0));
        graph.insert_state(key(2, 0), state(0));
        graph.add_node(Node {
            id: NodeId(0),
            label: "boom".into(),
            grid_name: "g0".into(),
            output: key(0, 1),
            inputs: [key(0, 0)].into_iter().collect(),
            job: job::<i32, _>(GridId(0), "i32", |_, _| panic!("boom")),
        });
        add_node(&mut graph, 1, key(1, 1), &[key(1, 0), key(0, 1)], 1);
        add_node(&mut graph, 2, key(2, 1), &[key(2, 0)], 1);
        let metrics = run_all(&mut graph, 2);
        assert_eq!((metrics.executed, metrics.failed, metrics.skipped), (1, 1, 1));
        assert_eq!(value(&graph, key(2, 1)), 1);
        match graph.fetch(key(1, 1)) {
            Some(Err(f)) => {
                assert_eq!(f.node, NodeId(0));
                assert_eq!(f.reason, "panicked: boom");
            }
            _ => panic!("grid 1 should be poisoned"),
        }
        assert_eq!(graph.unobserved().len(), 1);
        graph.observe(NodeId(0));
        assert!(graph.unobserved().is_empty());
    }
}
