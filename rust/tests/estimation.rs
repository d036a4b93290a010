// Copyright (C) 2025 The Software Heritage developers
// See the AUTHORS file at the top-level directory of this distribution
// License: GNU General Public License version 3, or any later version
// See top-level LICENSE file for more information

use anyhow::Result;

use kcore::errors::{DecompositionError, ErrorKind};
use kcore::estimation::{EstimationOptions, IterativeEstimation, Phase};
use kcore::graph_builder::{BuiltGraph, GraphBuilder};

fn complete_graph(num_nodes: usize) -> BuiltGraph {
    let mut builder = GraphBuilder::new(num_nodes);
    for a in 0..num_nodes {
        for b in (a + 1)..num_nodes {
            builder.edge(a, b);
        }
    }
    builder.done()
}

fn path_graph(num_nodes: usize) -> BuiltGraph {
    let mut builder = GraphBuilder::new(num_nodes);
    for a in 1..num_nodes {
        builder.edge(a - 1, a);
    }
    builder.done()
}

/// ```
/// 0 - 1
///  \ /
///   2 - 3 - 4
/// ```
fn triangle_with_tail() -> BuiltGraph {
    let mut builder = GraphBuilder::new(5);
    builder.edge(0, 1).edge(0, 2).edge(1, 2).edge(2, 3).edge(3, 4);
    builder.done()
}

#[test]
fn test_empty_graph() -> Result<()> {
    let graph = GraphBuilder::new(0).done();
    let state = IterativeEstimation::default().initialize(&graph)?;
    assert!(state.is_converged());
    assert_eq!(state.iterations(), 0);
    assert_eq!(state.result(), Some(&[][..]));
    assert_eq!(
        IterativeEstimation::default().decompose(&graph)?,
        Vec::<usize>::new()
    );
    Ok(())
}

#[test]
fn test_isolated_node() -> Result<()> {
    let graph = GraphBuilder::new(1).done();
    let mut state = IterativeEstimation::default().initialize(&graph)?;
    assert_eq!(state.phase(), Phase::Init);
    state.step();
    assert!(state.is_converged());
    assert_eq!(state.iterations(), 1);
    assert_eq!(state.result(), Some(&[0][..]));
    Ok(())
}

#[test]
fn test_complete_graphs() -> Result<()> {
    for num_nodes in 1..8 {
        let graph = complete_graph(num_nodes);
        assert_eq!(
            IterativeEstimation::default().decompose(&graph)?,
            vec![num_nodes - 1; num_nodes],
            "K_{num_nodes}"
        );
    }
    Ok(())
}

#[test]
fn test_paths() -> Result<()> {
    for num_nodes in 2..12 {
        let graph = path_graph(num_nodes);
        assert_eq!(
            IterativeEstimation::default().decompose(&graph)?,
            vec![1; num_nodes],
            "path of {num_nodes} nodes"
        );
    }
    Ok(())
}

#[test]
fn test_triangle_with_tail() -> Result<()> {
    let graph = triangle_with_tail();
    assert_eq!(
        IterativeEstimation::default().decompose(&graph)?,
        vec![2, 2, 2, 1, 1]
    );
    Ok(())
}

#[test]
fn test_cycle() -> Result<()> {
    let mut builder = GraphBuilder::new(7);
    for i in 0..7 {
        builder.edge(i, (i + 1) % 7);
    }
    let graph = builder.done();

    assert_eq!(IterativeEstimation::default().decompose(&graph)?, vec![2; 7]);
    Ok(())
}

#[test]
fn test_first_iteration_publishes_degrees() -> Result<()> {
    let graph = triangle_with_tail();
    let mut state = IterativeEstimation::default().initialize(&graph)?;
    assert_eq!(state.scheduler().len(), 5, "all nodes start active");

    let stats = state.step();
    assert_eq!(stats.iteration, 0);
    assert_eq!(stats.evaluated, 5);
    assert_eq!(stats.updated, 5);
    assert_eq!(state.phase(), Phase::Running);
    assert_eq!(state.estimates(), &[2, 2, 3, 2, 1]);
    Ok(())
}

#[test]
fn test_estimates_never_increase() -> Result<()> {
    for graph in [triangle_with_tail(), path_graph(9), complete_graph(5)] {
        let mut state = IterativeEstimation::default().initialize(&graph)?;
        state.step();
        let mut previous = state.estimates().to_vec();
        while !state.is_converged() {
            state.step();
            for (node, (&before, &after)) in previous.iter().zip(state.estimates()).enumerate() {
                assert!(
                    after <= before,
                    "estimate of {node} increased from {before} to {after}"
                );
            }
            previous = state.estimates().to_vec();
        }
    }
    Ok(())
}

#[test]
fn test_counters() -> Result<()> {
    let graph = path_graph(3);
    let mut state = IterativeEstimation::default().initialize(&graph)?;
    assert_eq!(state.last_stats(), None);

    state.step();

    // The middle node drops to 1, both ends published 1 so they are rescheduled
    let stats = state.step();
    assert_eq!(stats.iteration, 1);
    assert_eq!(stats.evaluated, 3);
    assert_eq!(stats.updated, 1);
    assert_eq!(stats.rescheduled, 2);
    assert_eq!(state.scheduler().snapshot(), vec![0, 2]);
    assert_eq!(state.last_stats(), Some(stats));
    assert!(!state.is_converged());

    let stats = state.step();
    assert_eq!(stats.evaluated, 2);
    assert_eq!(stats.updated, 0);
    assert_eq!(stats.rescheduled, 0);
    assert!(state.is_converged());
    assert_eq!(state.iterations(), 3);
    Ok(())
}

#[test]
fn test_converged_state_is_stable() -> Result<()> {
    let graph = triangle_with_tail();
    let mut state = IterativeEstimation::default().initialize(&graph)?;
    while !state.is_converged() {
        state.step();
    }
    assert!(state.scheduler().is_empty());

    let iterations = state.iterations();
    let result = state.estimates().to_vec();
    let stats = state.step();
    assert_eq!(stats.evaluated, 0);
    assert_eq!(stats.updated, 0);
    assert_eq!(stats.rescheduled, 0);
    assert_eq!(state.estimates(), &result[..]);
    assert_eq!(state.iterations(), iterations);
    assert_eq!(state.into_result(), Some(result));
    Ok(())
}

#[test]
fn test_no_result_before_convergence() -> Result<()> {
    let graph = triangle_with_tail();
    let mut state = IterativeEstimation::default().initialize(&graph)?;
    assert_eq!(state.result(), None);
    state.step();
    assert_eq!(state.result(), None);
    assert_eq!(state.clone().into_result(), None);
    Ok(())
}

#[test]
fn test_iteration_bound() -> Result<()> {
    for graph in [
        triangle_with_tail(),
        path_graph(2),
        path_graph(3),
        path_graph(20),
        complete_graph(1),
        complete_graph(6),
    ] {
        let mut state = IterativeEstimation::default().initialize(&graph)?;
        while !state.is_converged() {
            state.step();
        }
        assert!(
            state.iterations() <= state.num_nodes(),
            "{} iterations for {} nodes",
            state.iterations(),
            state.num_nodes()
        );
        assert!(state.scheduler().is_empty());
    }
    Ok(())
}

#[test]
fn test_max_iterations() -> Result<()> {
    let graph = path_graph(20);
    let estimation = IterativeEstimation::new(EstimationOptions {
        max_iterations: Some(2),
        ..Default::default()
    });
    let mut state = estimation.initialize(&graph)?;
    assert_eq!(state.max_iterations(), 2);
    while !state.is_finished() {
        state.step();
    }
    assert_eq!(state.iterations(), 2);
    assert_eq!(state.phase(), Phase::Stopped);
    assert!(!state.is_converged());
    assert!(!state.scheduler().is_empty());

    // Estimates are only upper bounds, so there is no result
    assert_eq!(state.result(), None);
    assert!(state.estimates().iter().all(|&estimate| estimate >= 1));
    assert_eq!(
        state
            .estimates()
            .iter()
            .filter(|&&estimate| estimate == 2)
            .count(),
        16
    );

    // Stopped states do not resume
    let estimates = state.estimates().to_vec();
    assert_eq!(state.step().updated, 0);
    assert_eq!(state.iterations(), 2);
    assert_eq!(state.estimates(), &estimates[..]);
    assert_eq!(state.into_result(), None);
    Ok(())
}

#[test]
fn test_max_iterations_decompose_fails() {
    let graph = path_graph(5);
    let estimation = IterativeEstimation::new(EstimationOptions {
        max_iterations: Some(1),
        ..Default::default()
    });

    let err = estimation.decompose(&graph).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IterationLimit);
    assert_eq!(
        err,
        DecompositionError::IterationLimit {
            iterations: 1,
            scheduled: 5,
        }
    );
}

#[test]
fn test_max_iterations_reached_on_convergence() -> Result<()> {
    // Degrees are already the core numbers, so the second iteration updates nothing
    let graph = complete_graph(4);
    let estimation = IterativeEstimation::new(EstimationOptions {
        max_iterations: Some(2),
        ..Default::default()
    });
    let mut state = estimation.initialize(&graph)?;
    while !state.is_finished() {
        state.step();
    }
    assert_eq!(state.iterations(), 2);
    assert_eq!(state.phase(), Phase::Converged);
    assert_eq!(state.result(), Some(&[3, 3, 3, 3][..]));
    assert_eq!(estimation.decompose(&graph)?, vec![3, 3, 3, 3]);
    Ok(())
}

#[test]
fn test_max_iterations_larger_than_graph() -> Result<()> {
    let graph = path_graph(4);
    let estimation = IterativeEstimation::new(EstimationOptions {
        max_iterations: Some(1000),
        ..Default::default()
    });
    assert_eq!(estimation.initialize(&graph)?.max_iterations(), 4);
    Ok(())
}

#[test]
fn test_memory_limit() {
    let graph = complete_graph(10);
    let estimation = IterativeEstimation::new(EstimationOptions {
        memory_limit: Some(1024),
        ..Default::default()
    });
    let err = estimation.initialize(&graph).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResourceExhaustion);
}
