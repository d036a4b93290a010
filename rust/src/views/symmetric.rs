// Copyright (C) 2025  The Software Heritage developers
// See the AUTHORS file at the top-level directory of this distribution
// License: GNU General Public License version 3, or any later version
// See top-level LICENSE file for more information

use itertools::structs::{Dedup, Merge};
use itertools::Itertools;

use crate::graph::*;

/// A view over a directed graph and its transpose that makes all arcs bidirectional.
///
/// Both graphs must list neighbors in increasing order (as BVGraphs do). Nodes linked
/// by arcs in both directions are only listed once, so the result is a simple graph as
/// long as the directed graph has no self-loop.
///
/// [`degree`](GraphView::degree) is computed by merging both lists, so it costs as much
/// as a call to [`neighbors`](GraphView::neighbors).
pub struct Symmetric<F: GraphView, B: GraphView> {
    forward: F,
    backward: B,
}

impl<F: GraphView, B: GraphView> Symmetric<F, B> {
    /// # Panics
    ///
    /// If both graphs do not have the same number of nodes
    pub fn new(forward: F, backward: B) -> Self {
        assert_eq!(
            forward.num_nodes(),
            backward.num_nodes(),
            "forward and backward graphs have different number of nodes"
        );
        Symmetric { forward, backward }
    }

    pub fn forward(&self) -> &F {
        &self.forward
    }

    pub fn backward(&self) -> &B {
        &self.backward
    }
}

impl<F: GraphView, B: GraphView> GraphView for Symmetric<F, B> {
    type Neighbors<'succ>
        = Dedup<
        Merge<
            <<F as GraphView>::Neighbors<'succ> as IntoIterator>::IntoIter,
            <<B as GraphView>::Neighbors<'succ> as IntoIterator>::IntoIter,
        >,
    >
    where
        Self: 'succ;

    fn num_nodes(&self) -> usize {
        self.forward.num_nodes()
    }
    fn degree(&self, node_id: NodeId) -> usize {
        self.neighbors(node_id).count()
    }
    fn neighbors(&self, node_id: NodeId) -> Self::Neighbors<'_> {
        self.forward
            .neighbors(node_id)
            .into_iter()
            .merge(self.backward.neighbors(node_id))
            .dedup()
    }
}
