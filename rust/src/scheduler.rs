// Copyright (C) 2025  The Software Heritage developers
// See the AUTHORS file at the top-level directory of this distribution
// License: GNU General Public License version 3, or any later version
// See top-level LICENSE file for more information

//! Set of nodes to evaluate at the next iteration of a vertex-centric algorithm

use bitvec::prelude::*;
use rdst::RadixSort;

use crate::graph::NodeId;

/// Tracks which nodes are active.
///
/// Insertion and membership tests are `O(1)`; clearing is proportional to the number
/// of active nodes, not to the size of the graph.
///
/// # Example
///
/// ```
/// use kcore::scheduler::Scheduler;
///
/// let mut scheduler = Scheduler::new(10);
/// assert!(scheduler.add_active(7));
/// assert!(scheduler.add_active(2));
/// assert!(!scheduler.add_active(7));
/// assert_eq!(scheduler.snapshot(), vec![2, 7]);
///
/// scheduler.clear_active();
/// assert!(scheduler.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct Scheduler {
    active: BitVec,
    /// Same nodes as `active`, in insertion order
    queue: Vec<NodeId>,
}

impl Scheduler {
    /// Returns a scheduler with no active node, for a graph of `num_nodes` nodes
    pub fn new(num_nodes: usize) -> Self {
        Scheduler {
            active: bitvec![0; num_nodes],
            queue: Vec::new(),
        }
    }

    /// Returns a scheduler where every node of the graph is active
    pub fn all_active(num_nodes: usize) -> Self {
        Scheduler {
            active: bitvec![1; num_nodes],
            queue: (0..num_nodes).collect(),
        }
    }

    /// Number of nodes this scheduler can track
    pub fn num_nodes(&self) -> usize {
        self.active.len()
    }

    /// Marks a node as active. Returns `false` if it already was.
    ///
    /// # Panics
    ///
    /// If `node` is not a node of the graph
    #[inline(always)]
    pub fn add_active(&mut self, node: NodeId) -> bool {
        if self.active[node] {
            false
        } else {
            self.active.set(node, true);
            self.queue.push(node);
            true
        }
    }

    #[inline(always)]
    pub fn is_active(&self, node: NodeId) -> bool {
        self.active[node]
    }

    /// Deactivates all nodes
    pub fn clear_active(&mut self) {
        for node in self.queue.drain(..) {
            self.active.set(node, false);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of active nodes
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns the list of active nodes, in increasing order
    pub fn snapshot(&self) -> Vec<NodeId> {
        let mut nodes = self.queue.clone();
        nodes.radix_sort_unstable();
        nodes
    }
}
