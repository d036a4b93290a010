/*
 * Copyright (C) 2024-2025  The Software Heritage developers
 * See the AUTHORS file at the top-level directory of this distribution
 * License: GNU General Public License version 3, or any later version
 * See top-level LICENSE file for more information
 */

//! Utility to dynamically build a small graph in memory

use std::iter::Copied;
use std::slice::Iter;

use crate::graph::*;

/// Dynamically builds a small graph in memory
///
/// # Examples
///
/// ```
/// use kcore::graph::GraphView;
/// use kcore::graph_builder::GraphBuilder;
///
/// // 0 - 1
/// //  \ /
/// //   2 - 3
/// let mut builder = GraphBuilder::new(4);
/// builder.edge(0, 1).edge(1, 2).edge(2, 0).edge(2, 3);
/// let graph = builder.done();
///
/// assert_eq!(graph.num_nodes(), 4);
/// assert_eq!(graph.degree(2), 3);
/// assert_eq!(graph.neighbors(3).collect::<Vec<_>>(), vec![2]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct GraphBuilder {
    num_nodes: usize,
    arcs: Vec<(NodeId, NodeId)>,
}

impl GraphBuilder {
    pub fn new(num_nodes: usize) -> Self {
        GraphBuilder {
            num_nodes,
            arcs: Vec::new(),
        }
    }

    /// Adds a node to the graph, and returns its id
    pub fn node(&mut self) -> NodeId {
        self.num_nodes += 1;
        self.num_nodes - 1
    }

    /// Adds an undirected edge, ie. an arc in each direction.
    ///
    /// Nodes that do not exist yet are created.
    pub fn edge(&mut self, a: NodeId, b: NodeId) -> &mut Self {
        self.arc(a, b).arc(b, a)
    }

    /// Adds a single arc from `src` to `dst`.
    ///
    /// This is only useful to build graphs that do not satisfy [`GraphView`]'s contract.
    pub fn arc(&mut self, src: NodeId, dst: NodeId) -> &mut Self {
        self.num_nodes = self.num_nodes.max(src + 1).max(dst + 1);
        self.arcs.push((src, dst));
        self
    }

    /// Returns the graph, with neighbors listed in insertion order
    pub fn done(&self) -> BuiltGraph {
        let mut offsets = vec![0; self.num_nodes + 1];
        for &(src, _) in &self.arcs {
            offsets[src + 1] += 1;
        }
        for node in 0..self.num_nodes {
            offsets[node + 1] += offsets[node];
        }
        let mut cursors = offsets.clone();
        let mut targets = vec![0; self.arcs.len()];
        for &(src, dst) in &self.arcs {
            targets[cursors[src]] = dst;
            cursors[src] += 1;
        }
        BuiltGraph { offsets, targets }
    }
}

/// Graph stored as adjacency arrays (CSR), as built by [`GraphBuilder`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuiltGraph {
    offsets: Vec<usize>,
    targets: Vec<NodeId>,
}

impl BuiltGraph {
    /// Builds a graph from adjacency lists, without checking them.
    pub fn from_adjacency(adjacency: Vec<Vec<NodeId>>) -> Self {
        let mut offsets = Vec::with_capacity(adjacency.len() + 1);
        offsets.push(0);
        let mut targets = Vec::new();
        for neighbors in adjacency {
            targets.extend(neighbors);
            offsets.push(targets.len());
        }
        BuiltGraph { offsets, targets }
    }

    /// Return the number of arcs in the graph (twice the number of edges of a valid graph)
    pub fn num_arcs(&self) -> usize {
        self.targets.len()
    }
}

impl GraphView for BuiltGraph {
    type Neighbors<'succ>
        = Copied<Iter<'succ, NodeId>>
    where
        Self: 'succ;

    #[inline(always)]
    fn num_nodes(&self) -> usize {
        self.offsets.len() - 1
    }
    #[inline(always)]
    fn degree(&self, node_id: NodeId) -> usize {
        self.offsets[node_id + 1] - self.offsets[node_id]
    }
    #[inline(always)]
    fn neighbors(&self, node_id: NodeId) -> Self::Neighbors<'_> {
        self.targets[self.offsets[node_id]..self.offsets[node_id + 1]]
            .iter()
            .copied()
    }
}
