// Copyright (C) 2025  The Software Heritage developers
// See the AUTHORS file at the top-level directory of this distribution
// License: GNU General Public License version 3, or any later version
// See top-level LICENSE file for more information

//! Checks both decompositions against each other and against a quadratic reference
//! implementation, on random graphs

use anyhow::Result;
use rand::prelude::*;

use kcore::graph_builder::{BuiltGraph, GraphBuilder};
use kcore::{ExactPeeling, IterativeEstimation};

/// Erdős–Rényi graph, with edges listed in random order
fn gnp(num_nodes: usize, p: f64, seed: u64) -> BuiltGraph {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut edges = Vec::new();
    for a in 0..num_nodes {
        for b in (a + 1)..num_nodes {
            if rng.gen_bool(p) {
                edges.push((a, b));
            }
        }
    }
    edges.shuffle(&mut rng);

    let mut builder = GraphBuilder::new(num_nodes);
    for (a, b) in edges {
        builder.edge(a, b);
    }
    builder.done()
}

/// Repeatedly removes a node of minimum degree
fn naive_core_numbers(graph: &BuiltGraph) -> Vec<usize> {
    use kcore::graph::GraphView;

    let num_nodes = graph.num_nodes();
    let mut removed = vec![false; num_nodes];
    let mut degrees: Vec<usize> = (0..num_nodes).map(|node| graph.degree(node)).collect();
    let mut core_numbers = vec![0; num_nodes];
    let mut k = 0;
    for _ in 0..num_nodes {
        let node = (0..num_nodes)
            .filter(|&node| !removed[node])
            .min_by_key(|&node| degrees[node])
            .unwrap();
        k = k.max(degrees[node]);
        core_numbers[node] = k;
        removed[node] = true;
        for neighbor in graph.neighbors(node) {
            if !removed[neighbor] {
                degrees[neighbor] -= 1;
            }
        }
    }
    core_numbers
}

#[test]
fn test_random_graphs() -> Result<()> {
    for seed in 0..20 {
        for (num_nodes, p) in [(10, 0.3), (50, 0.1), (80, 0.05), (60, 0.4)] {
            let graph = gnp(num_nodes, p, seed);
            let expected = naive_core_numbers(&graph);

            let exact = ExactPeeling::default().decompose(&graph)?;
            assert_eq!(exact, expected, "exact peeling, seed={seed}, n={num_nodes}, p={p}");

            let mut state = IterativeEstimation::default().initialize(&graph)?;
            while !state.is_converged() {
                state.step();
            }
            assert!(
                state.iterations() <= num_nodes,
                "{} iterations for {num_nodes} nodes",
                state.iterations()
            );
            assert!(state.scheduler().is_empty());
            assert_eq!(
                state.result(),
                Some(expected.as_slice()),
                "iterative estimation, seed={seed}, n={num_nodes}, p={p}"
            );
        }
    }
    Ok(())
}

#[test]
fn test_cliques_with_tails() -> Result<()> {
    // Cliques of increasing sizes, each linked to the next one by a path
    let mut builder = GraphBuilder::new(0);
    let mut previous_tail = None;
    for size in 2..8 {
        let clique: Vec<_> = (0..size).map(|_| builder.node()).collect();
        for (i, &a) in clique.iter().enumerate() {
            for &b in &clique[i + 1..] {
                builder.edge(a, b);
            }
        }
        if let Some(tail) = previous_tail {
            let middle = builder.node();
            builder.edge(tail, middle).edge(middle, clique[0]);
        }
        previous_tail = Some(clique[size - 1]);
    }
    let graph = builder.done();

    let expected = naive_core_numbers(&graph);
    assert_eq!(expected.iter().max(), Some(&6));
    assert_eq!(ExactPeeling::default().decompose(&graph)?, expected);
    assert_eq!(IterativeEstimation::default().decompose(&graph)?, expected);
    Ok(())
}
