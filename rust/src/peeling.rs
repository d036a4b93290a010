// Copyright (C) 2025  The Software Heritage developers
// See the AUTHORS file at the top-level directory of this distribution
// License: GNU General Public License version 3, or any later version
// See top-level LICENSE file for more information

//! Exact k-core decomposition by bucket-sorted peeling
//!
//! This is the `O(n + m)` algorithm of Batagelj and Zaversnik: nodes are kept sorted by
//! their current degree in a single array split into one bucket per degree, and removed
//! in that order. Removing a node decrements the degree of its neighbors of higher
//! degree, which moves each of them to the beginning of its bucket then shrinks it.

use dsi_progress_logger::{progress_logger, ProgressLog};

use crate::errors::{DecompositionError, MemoryBudget};
use crate::graph::*;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PeelingOptions {
    /// Maximum number of bytes used by the bucket structures, or `None` for no limit
    pub memory_limit: Option<usize>,
}

/// Result of [`ExactPeeling::decompose_ordered`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Peeling {
    /// Core number of each node
    pub core_numbers: Vec<usize>,
    /// Nodes in the order they were removed, which is a degeneracy ordering
    pub degeneracy_order: Vec<NodeId>,
}

/// Computes core numbers in a single sequential pass
///
/// # Example
///
/// ```
/// use kcore::graph_builder::GraphBuilder;
/// use kcore::peeling::ExactPeeling;
///
/// // triangle 0-1-2 with a pendant path 2-3-4
/// let mut builder = GraphBuilder::new(5);
/// builder.edge(0, 1).edge(0, 2).edge(1, 2).edge(2, 3).edge(3, 4);
/// let graph = builder.done();
///
/// let core_numbers = ExactPeeling::default().decompose(&graph).unwrap();
/// assert_eq!(core_numbers, vec![2, 2, 2, 1, 1]);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ExactPeeling {
    pub options: PeelingOptions,
}

impl ExactPeeling {
    pub fn new(options: PeelingOptions) -> Self {
        ExactPeeling { options }
    }

    /// Returns the core number of every node of the graph
    pub fn decompose<G: GraphView>(&self, graph: &G) -> Result<Vec<usize>, DecompositionError> {
        self.decompose_ordered(graph)
            .map(|peeling| peeling.core_numbers)
    }

    /// Returns the core number of every node of the graph, and the order in which they
    /// were peeled
    pub fn decompose_ordered<G: GraphView>(
        &self,
        graph: &G,
    ) -> Result<Peeling, DecompositionError> {
        let summary = crate::graph::validate_within(graph, self.options.memory_limit)?;
        let num_nodes = summary.num_nodes;
        let max_degree = summary.max_degree;

        let budget = MemoryBudget {
            structure: "bucket structure",
            limit_bytes: self.options.memory_limit,
        };
        // vert, pos, deg and bin
        budget.check(
            num_nodes
                .saturating_mul(3)
                .saturating_add(max_degree)
                .saturating_add(1),
        )?;
        let mut vert = budget.vec(num_nodes, 0usize)?;
        let mut pos = budget.vec(num_nodes, 0usize)?;
        let mut deg = budget.vec(num_nodes, 0usize)?;
        let mut bin = budget.vec(max_degree + 1, 0usize)?;

        // Count nodes of each degree
        for node in 0..num_nodes {
            deg[node] = graph.degree(node);
            bin[deg[node]] += 1;
        }

        // bin[d] becomes the index of the first node of degree d in vert
        let mut start = 0;
        for bucket in bin.iter_mut() {
            let num = *bucket;
            *bucket = start;
            start += num;
        }

        for node in 0..num_nodes {
            let d = deg[node];
            pos[node] = bin[d];
            vert[pos[node]] = node;
            bin[d] += 1;
        }
        // Placing nodes moved each bin[d] to the start of bucket d+1; shift them back
        for d in (1..=max_degree).rev() {
            bin[d] = bin[d - 1];
        }
        bin[0] = 0;

        let mut pl = progress_logger!(
            item_name = "node",
            local_speed = true,
            expected_updates = Some(num_nodes),
        );
        pl.start("Peeling nodes by increasing degree");

        for i in 0..num_nodes {
            let node = vert[i];
            let node_deg = deg[node];
            for neighbor in graph.neighbors(node) {
                let neighbor_deg = deg[neighbor];
                if neighbor_deg > node_deg {
                    // Swap the neighbor with the first node of its bucket, then move the
                    // bucket's start past it, so it now belongs to bucket neighbor_deg - 1
                    let neighbor_pos = pos[neighbor];
                    let first_pos = bin[neighbor_deg];
                    let first = vert[first_pos];
                    if neighbor != first {
                        pos[neighbor] = first_pos;
                        vert[neighbor_pos] = first;
                        pos[first] = neighbor_pos;
                        vert[first_pos] = neighbor;
                    }
                    bin[neighbor_deg] += 1;
                    deg[neighbor] = neighbor_deg - 1;
                }
            }
            pl.light_update();
        }
        pl.done();

        debug_assert!(
            (0..num_nodes).all(|i| pos[vert[i]] == i),
            "pos is not the inverse of vert"
        );

        Ok(Peeling {
            core_numbers: deg,
            degeneracy_order: vert,
        })
    }
}
