//! Integration test: ordering, isolation and failure semantics of the
//! deferred pipeline.

use std::thread;
use std::time::Duration;

use strata_core::GridError;
use strata_graph::{GraphError, GridHandle, Pipeline, PipelineConfig};
use strata_grid::{BinaryOp, Grid};
use strata_ops::prelude::*;
use strata_symmetry::Symmetry;
use strata_test_utils::{seeded_grid, Timeline};

fn pipeline(workers: usize) -> Pipeline {
    Pipeline::new(PipelineConfig::with_workers(workers)).unwrap()
}

fn named(name: &str, size: usize, v: i32) -> Grid<i32> {
    Grid::<i32>::builder(size).fill(v).name(name).build().unwrap()
}

// ── Ordering ─────────────────────────────────────────────────────────

#[test]
fn same_grid_nodes_run_in_submission_order() {
    let timeline = Timeline::new();
    let mut p = pipeline(4);
    let a = p.insert(named("a", 4, 0));
    let c = p.insert(named("c", 4, 0));

    let t = timeline.clone();
    p.submit(&a, &[], "first", move |g, _| {
        t.record("first", || thread::sleep(Duration::from_millis(20)));
        g.fill(1);
        Ok(())
    })
    .unwrap();
    let t = timeline.clone();
    p.submit(&a, &[], "second", move |g, _| {
        t.record("second", || ());
        Ok(g.multiply_value(5)?)
    })
    .unwrap();
    let t = timeline.clone();
    p.submit(&c, &[], "other", move |_, _| {
        t.record("other", || ());
        Ok(())
    })
    .unwrap();

    p.run().unwrap();
    assert!(timeline.ordered("first", "second"));
    assert!(timeline.span("other").is_some());
    assert_eq!(p.await_grid(&a).unwrap().get(3, 3), 5);
}

#[test]
fn cross_grid_reads_wait_for_the_writer() {
    let timeline = Timeline::new();
    let mut p = pipeline(4);
    let a = p.insert(named("a", 4, 0));
    let b = p.insert(named("b", 4, 0));
    let c = p.insert(named("c", 4, 0));

    let t = timeline.clone();
    p.submit(&a, &[], "A", move |g, _| {
        t.record("A", || thread::sleep(Duration::from_millis(30)));
        g.fill(7);
        Ok(())
    })
    .unwrap();
    let t = timeline.clone();
    p.submit(&b, &[a.to_ref()], "B", move |g, inputs| {
        let src = inputs.get::<i32>(a)?;
        t.record("B", || g.add(src))?;
        Ok(())
    })
    .unwrap();
    let t = timeline.clone();
    p.submit(&c, &[], "C", move |g, _| {
        t.record("C", || g.fill(1));
        Ok(())
    })
    .unwrap();

    p.run().unwrap();
    assert!(timeline.ordered("A", "B"));
    assert!(timeline.span("C").is_some());
    let mut labels = timeline.labels();
    assert_eq!(labels.len(), 3);
    labels.sort();
    assert_eq!(labels, ["A", "B", "C"]);
    assert_eq!(p.await_grid(&b).unwrap().get(2, 1), 7);
    assert_eq!(p.await_grid(&c).unwrap().get(0, 0), 1);
}

#[test]
fn readers_see_the_generation_current_at_submission() {
    let mut p = pipeline(2);
    let a = p.insert(named("a", 3, 1));
    let b = p.insert(named("b", 3, 0));
    p.submit(&b, &[a.to_ref()], "copy a", move |g, inputs| {
        Ok(g.add(inputs.get::<i32>(a)?)?)
    })
    .unwrap();
    p.submit(&a, &[], "bump", |g, _| Ok(g.add_value(10)?))
        .unwrap();

    assert_eq!(p.await_grid(&a).unwrap().get(0, 0), 11);
    assert_eq!(p.await_grid(&b).unwrap().get(0, 0), 1);
}

#[test]
fn await_runs_only_ancestors() {
    let mut p = pipeline(2);
    let a = p.insert(named("a", 3, 0));
    let b = p.insert(named("b", 3, 0));
    p.submit(&a, &[], "a", |g, _| Ok(g.add_value(1)?)).unwrap();
    p.submit(&b, &[], "b", |g, _| Ok(g.add_value(1)?)).unwrap();

    p.await_grid(&a).unwrap();
    assert_eq!(p.metrics().executed, 1);
    assert_eq!(p.pending(), 1);

    let metrics = p.finish().unwrap();
    assert_eq!(metrics.executed, 2);
}

#[test]
fn awaited_copies_are_independent() {
    let mut p = pipeline(1);
    let a = p.insert(named("a", 2, 3));
    let mut copy = p.await_grid(&a).unwrap();
    copy.fill(-1);
    assert_eq!(p.await_grid(&a).unwrap().get(1, 0), 3);
}

// ── Validation ───────────────────────────────────────────────────────

#[test]
fn incompatible_combine_fails_without_submitting() {
    let mut p = pipeline(1);
    let plain = p.insert(named("plain", 8, 0));
    let mirrored = p.insert(seeded_grid::<i32>(8, Symmetry::X, 1));
    let err = p.combine(&plain, &mirrored, BinaryOp::Add).unwrap_err();
    assert!(matches!(
        err,
        GraphError::Grid(GridError::SymmetryMismatch { .. })
    ));
    assert_eq!(p.pending(), 0);
}

#[test]
fn handles_from_elsewhere_are_rejected() {
    let mut p = pipeline(1);
    let mut q = pipeline(1);
    let a: GridHandle<i32> = p.insert(named("a", 2, 0));
    let err = q
        .submit(&a, &[], "foreign", |_, _| Ok(()))
        .unwrap_err();
    assert!(matches!(err, GraphError::UnknownGrid { .. }));

    let b = q.insert(named("b", 2, 0));
    let err = p
        .submit(&a, &[b.to_ref()], "foreign dep", |_, _| Ok(()))
        .unwrap_err();
    assert!(matches!(err, GraphError::UnknownGrid { .. }));
}

#[test]
fn finalize_waits_for_pending_readers() {
    let mut p = pipeline(2);
    let a = p.insert(named("a", 3, 2));
    let b = p.insert(named("b", 3, 0));
    p.submit(&b, &[a.to_ref()], "read a", move |g, inputs| {
        Ok(g.add(inputs.get::<i32>(a)?)?)
    })
    .unwrap();

    let err = p.finalize(a).unwrap_err();
    assert!(matches!(err, GraphError::GridInUse { readers: 1, .. }));

    p.run().unwrap();
    let out = p.finalize(a).unwrap();
    assert_eq!(out.get(0, 0), 2);
    assert_eq!(p.finalize(b).unwrap().get(2, 2), 2);
    assert!(p.is_empty());
    assert!(matches!(
        p.await_grid(&a),
        Err(GraphError::UnknownGrid { .. })
    ));
}

// ── Failures ─────────────────────────────────────────────────────────

#[test]
fn failures_propagate_to_dependents() {
    let mut p = pipeline(2);
    let a = p.insert(named("a", 3, 0));
    let b = p.insert(named("b", 3, 0));
    let c = p.insert(named("c", 3, 0));
    p.submit(&a, &[], "explode", |_, _| {
        Err(GridError::invalid("explode", "boom").into())
    })
    .unwrap();
    p.submit(&b, &[a.to_ref()], "read a", |_, _| Ok(())).unwrap();
    p.submit(&c, &[], "fine", |g, _| Ok(g.add_value(1)?)).unwrap();

    match p.await_grid(&b).unwrap_err() {
        GraphError::UpstreamFailed { grid, origin } => {
            assert_eq!(grid, "b");
            assert_eq!(origin.grid, a.id());
            assert_eq!(origin.label, "explode");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(matches!(p.await_grid(&a), Err(GraphError::NodeFailed(_))));
    assert_eq!(p.await_grid(&c).unwrap().get(0, 0), 1);

    let metrics = p.finish().unwrap();
    assert_eq!(metrics.failed, 1);
    assert_eq!(metrics.skipped, 1);
    assert_eq!(metrics.executed, 1);
}

#[test]
fn unobserved_failures_are_reported_by_finish() {
    let mut p = pipeline(2);
    let a = p.insert(named("a", 3, 0));
    p.submit(&a, &[], "explode", |_, _| {
        Err(GridError::invalid("explode", "boom").into())
    })
    .unwrap();
    match p.finish().unwrap_err() {
        GraphError::UnobservedFailures(failures) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].label, "explode");
            assert_eq!(failures[0].grid_name, "a");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn panics_become_node_failures() {
    let mut p = pipeline(2);
    let a = p.insert(named("a", 3, 0));
    p.submit(&a, &[], "panic", |_, _| panic!("kaboom")).unwrap();
    match p.await_grid(&a).unwrap_err() {
        GraphError::NodeFailed(failure) => assert!(failure.reason.contains("kaboom")),
        other => panic!("unexpected error: {other}"),
    }
    p.finish().unwrap();
}

#[test]
fn reset_reports_failures_and_invalidates_handles() {
    let mut p = pipeline(2);
    let a = p.insert(named("a", 3, 0));
    p.submit(&a, &[], "explode", |_, _| {
        Err(GridError::invalid("explode", "boom").into())
    })
    .unwrap();
    p.run().unwrap();
    p.submit(&a, &[], "never", |_, _| Ok(())).unwrap();

    assert!(matches!(
        p.reset(),
        Err(GraphError::UnobservedFailures(ref v)) if v.len() == 1
    ));
    assert_eq!(p.pending(), 0);
    assert!(p.is_empty());
    assert!(matches!(p.await_grid(&a), Err(GraphError::UnknownGrid { .. })));
    p.reset().unwrap();
}

// ── Determinism ──────────────────────────────────────────────────────

fn generate(workers: usize) -> Grid<f32> {
    let mut p = pipeline(workers);
    let mask = p.insert(seeded_grid::<bool>(32, Symmetry::Point4, 7));
    let heights = p.insert(seeded_grid::<f32>(32, Symmetry::Point4, 9));
    let noise = p.insert(seeded_grid::<bool>(32, Symmetry::Point4, 11));

    p.submit(&mask, &[], "walk", |g, _| Ok(g.random_walk(4, 200)?))
        .unwrap();
    p.submit(&noise, &[], "noise walk", |g, _| Ok(g.random_walk(2, 300)?))
        .unwrap();
    p.submit(&mask, &[], "inflate", |g, _| {
        g.inflate(1.5);
        Ok(())
    })
    .unwrap();
    p.submit(&heights, &[mask.to_ref(), noise.to_ref()], "raise", move |g, inputs| {
        g.add(&inputs.get::<bool>(mask)?.to_float(0.0, 1.0))?;
        g.add(&inputs.get::<bool>(noise)?.to_float(0.0, 0.5))?;
        Ok(())
    })
    .unwrap();
    p.submit(&heights, &[], "blur", |g, _| {
        g.blur(2);
        Ok(())
    })
    .unwrap();

    let out = p.finalize(heights).unwrap();
    p.finish().unwrap();
    out
}

#[test]
fn results_do_not_depend_on_worker_count() {
    let single = generate(1);
    let pooled = generate(4);
    assert_eq!(single.digest(), pooled.digest());
    assert!(pooled.is_symmetric());
}
