/*
 * Copyright (C) 2024-2025  The Software Heritage developers
 * See the AUTHORS file at the top-level directory of this distribution
 * License: GNU General Public License version 3, or any later version
 * See top-level LICENSE file for more information
 */

//! Computes statistics on the graph and on its decomposition

use rayon::prelude::*;

use crate::graph::*;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DegreeStats {
    pub min: u64,
    pub max: u64,
    pub avg: f64,
    /// Sum of all degrees, ie. twice the number of edges
    pub total: u64,
}

pub fn degrees<G: GraphView + Sync>(graph: &G) -> DegreeStats {
    let identity = (u64::MAX, u64::MIN, 0u64);
    let (min, max, total) = (0..graph.num_nodes())
        .into_par_iter()
        // Compute stats in parallel
        .fold(
            || identity,
            |(min, max, total), node: usize| {
                let degree = u64::try_from(graph.degree(node)).expect("degree overflowed u64");
                (
                    std::cmp::min(min, degree),
                    std::cmp::max(max, degree),
                    total.saturating_add(degree),
                )
            },
        )
        // Merge each thread's work
        .reduce(
            || identity,
            |(min1, max1, total1), (min2, max2, total2)| {
                (
                    std::cmp::min(min1, min2),
                    std::cmp::max(max1, max2),
                    total1.saturating_add(total2),
                )
            },
        );
    if graph.num_nodes() == 0 {
        return DegreeStats {
            min: 0,
            max: 0,
            avg: 0.,
            total: 0,
        };
    }
    DegreeStats {
        min,
        max,
        avg: (total as f64) / (graph.num_nodes() as f64),
        total,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoreStats {
    /// Number of nodes with a non-zero core number, ie. non-isolated nodes
    pub num_nodes_in_cores: usize,
    /// Largest core number, ie. the degeneracy of the graph
    pub max_core: usize,
    /// Average core number of non-isolated nodes
    pub avg_core: f64,
}

/// Summarizes the result of a decomposition
///
/// ```
/// use kcore::stats::cores;
///
/// let stats = cores(&[2, 2, 2, 1, 1, 0]);
/// assert_eq!(stats.num_nodes_in_cores, 5);
/// assert_eq!(stats.max_core, 2);
/// assert_eq!(stats.avg_core, 1.6);
/// ```
pub fn cores(core_numbers: &[usize]) -> CoreStats {
    let (count, max, total) = core_numbers
        .par_iter()
        .filter(|&&core| core > 0)
        .fold(
            || (0usize, 0usize, 0u64),
            |(count, max, total), &core| (count + 1, max.max(core), total + core as u64),
        )
        .reduce(
            || (0, 0, 0),
            |(count1, max1, total1), (count2, max2, total2)| {
                (count1 + count2, max1.max(max2), total1 + total2)
            },
        );
    CoreStats {
        num_nodes_in_cores: count,
        max_core: max,
        avg_core: if count == 0 {
            0.
        } else {
            (total as f64) / (count as f64)
        },
    }
}

/// Returns how many nodes have each core number, indexed by core number
pub fn core_histogram(core_numbers: &[usize]) -> Vec<usize> {
    let Some(&max_core) = core_numbers.iter().max() else {
        return Vec::new();
    };
    let mut histogram = vec![0; max_core + 1];
    for &core in core_numbers {
        histogram[core] += 1;
    }
    histogram
}

/// Returns the nodes of the `k`-core, ie. the nodes whose core number is at least `k`,
/// in increasing order
pub fn k_core(core_numbers: &[usize], k: usize) -> impl Iterator<Item = NodeId> + '_ {
    core_numbers
        .iter()
        .enumerate()
        .filter(move |&(_, &core)| core >= k)
        .map(|(node, _)| node)
}
