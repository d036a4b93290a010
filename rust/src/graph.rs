// Copyright (C) 2025  The Software Heritage developers
// See the AUTHORS file at the top-level directory of this distribution
// License: GNU General Public License version 3, or any later version
// See top-level LICENSE file for more information

//! Read-only access to the graph being decomposed

use std::ops::Deref;

use crate::errors::{DecompositionError, MemoryBudget};

/// Alias for [`usize`], which may become a newtype in a future version.
pub type NodeId = usize;

/// Read-only capability over an undirected simple graph with nodes in `0..num_nodes()`.
///
/// Every edge `{a, b}` must be listed both in `a`'s and in `b`'s neighbors, and
/// [`degree`](Self::degree) must return the length of [`neighbors`](Self::neighbors).
/// The graph must not change while a decomposition is running.
pub trait GraphView {
    type Neighbors<'succ>: IntoIterator<Item = NodeId>
    where
        Self: 'succ;

    /// Return the number of nodes in the graph.
    fn num_nodes(&self) -> usize;

    /// Return the number of neighbors of a node.
    fn degree(&self, node_id: NodeId) -> usize;

    /// Return an [`IntoIterator`] over the neighbors of a node.
    fn neighbors(&self, node_id: NodeId) -> Self::Neighbors<'_>;
}

impl<T: Deref> GraphView for T
where
    <T as Deref>::Target: GraphView,
{
    type Neighbors<'succ>
        = <<T as Deref>::Target as GraphView>::Neighbors<'succ>
    where
        Self: 'succ;

    #[inline(always)]
    fn num_nodes(&self) -> usize {
        self.deref().num_nodes()
    }
    #[inline(always)]
    fn degree(&self, node_id: NodeId) -> usize {
        self.deref().degree(node_id)
    }
    #[inline(always)]
    fn neighbors(&self, node_id: NodeId) -> Self::Neighbors<'_> {
        self.deref().neighbors(node_id)
    }
}

/// Sizes gathered while validating a graph
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GraphSummary {
    pub num_nodes: usize,
    /// Sum of all degrees, ie. twice the number of edges
    pub num_arcs: usize,
    pub max_degree: usize,
}

impl GraphSummary {
    pub fn num_edges(&self) -> usize {
        self.num_arcs / 2
    }
}

/// Checks that `graph` is a valid undirected simple graph, in a single pass over its
/// adjacency lists.
///
/// Stops at the first node with malformed adjacency. Symmetry is only checked through
/// in-degrees, so a graph where every node has matching in- and out-degrees is accepted.
///
/// # Example
///
/// ```
/// use kcore::errors::ErrorKind;
/// use kcore::graph::validate;
/// use kcore::graph_builder::BuiltGraph;
///
/// let graph = BuiltGraph::from_adjacency(vec![vec![1], vec![0, 1]]);
/// let err = validate(&graph).unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::PreconditionViolation);
/// ```
pub fn validate<G: GraphView>(graph: &G) -> Result<GraphSummary, DecompositionError> {
    validate_within(graph, None)
}

pub(crate) fn validate_within<G: GraphView>(
    graph: &G,
    memory_limit: Option<usize>,
) -> Result<GraphSummary, DecompositionError> {
    let num_nodes = graph.num_nodes();
    let budget = MemoryBudget {
        structure: "graph validation",
        limit_bytes: memory_limit,
    };
    budget.check(2 * num_nodes)?;

    // last_seen[u] == v + 1 iff u was already yielded as a neighbor of v
    let mut last_seen = budget.vec(num_nodes, 0usize)?;
    let mut indegrees = budget.vec(num_nodes, 0usize)?;

    let mut summary = GraphSummary {
        num_nodes,
        ..Default::default()
    };
    for node in 0..num_nodes {
        let degree = graph.degree(node);
        let mut num_neighbors = 0;
        for neighbor in graph.neighbors(node) {
            if neighbor >= num_nodes {
                return Err(DecompositionError::NeighborOutOfRange {
                    node,
                    neighbor,
                    num_nodes,
                });
            }
            if neighbor == node {
                return Err(DecompositionError::SelfLoop { node });
            }
            if last_seen[neighbor] == node + 1 {
                return Err(DecompositionError::DuplicateEdge { node, neighbor });
            }
            last_seen[neighbor] = node + 1;
            indegrees[neighbor] += 1;
            num_neighbors += 1;
        }
        if num_neighbors != degree {
            return Err(DecompositionError::DegreeMismatch {
                node,
                degree,
                num_neighbors,
            });
        }
        summary.num_arcs += degree;
        summary.max_degree = summary.max_degree.max(degree);
    }

    for (node, &indegree) in indegrees.iter().enumerate() {
        let degree = graph.degree(node);
        if indegree != degree {
            return Err(DecompositionError::Asymmetric {
                node,
                degree,
                indegree,
            });
        }
    }

    log::debug!(
        "Validated graph: {} nodes, {} edges, max degree {}",
        summary.num_nodes,
        summary.num_edges(),
        summary.max_degree
    );

    Ok(summary)
}
