// Copyright (C) 2025  The Software Heritage developers
// See the AUTHORS file at the top-level directory of this distribution
// License: GNU General Public License version 3, or any later version
// See top-level LICENSE file for more information

use webgraph::prelude::*;

use crate::graph::*;

/// Wraps a webgraph [`RandomAccessGraph`] in order to implement [`GraphView`]
///
/// The wrapped graph must already be symmetric, ie. contain an arc `B -> A` for each
/// of its `A -> B` arcs; use [`Symmetric`](super::Symmetric) on a graph and its
/// transpose otherwise.
///
/// # Example
///
/// ```
/// use webgraph::graphs::vec_graph::VecGraph;
///
/// use kcore::graph::GraphView;
/// use kcore::views::WebgraphView;
///
/// // 0 - 1 - 2
/// let graph = WebgraphView(VecGraph::from_arcs(vec![(0, 1), (1, 0), (1, 2), (2, 1)]));
///
/// assert_eq!(graph.num_nodes(), 3);
/// assert_eq!(graph.degree(1), 2);
/// assert_eq!(graph.neighbors(1).into_iter().collect::<Vec<_>>(), vec![0, 2]);
/// ```
pub struct WebgraphView<G: RandomAccessGraph>(pub G);

impl<G: RandomAccessGraph> WebgraphView<G> {
    /// Return the number of arcs in the underlying graph.
    pub fn num_arcs(&self) -> u64 {
        RandomAccessLabeling::num_arcs(&self.0)
    }
}

impl<G: RandomAccessGraph> GraphView for WebgraphView<G> {
    type Neighbors<'succ>
        = <G as RandomAccessLabeling>::Labels<'succ>
    where
        Self: 'succ;

    #[inline(always)]
    fn num_nodes(&self) -> usize {
        SequentialLabeling::num_nodes(&self.0)
    }

    #[inline(always)]
    fn degree(&self, node_id: NodeId) -> usize {
        RandomAccessLabeling::outdegree(&self.0, node_id)
    }

    #[inline(always)]
    fn neighbors(&self, node_id: NodeId) -> Self::Neighbors<'_> {
        RandomAccessGraph::successors(&self.0, node_id)
    }
}
