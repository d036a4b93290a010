// Copyright (C) 2025  The Software Heritage developers
// See the AUTHORS file at the top-level directory of this distribution
// License: GNU General Public License version 3, or any later version
// See top-level LICENSE file for more information

//! Vertex-centric k-core decomposition by iterated local estimation
//!
//! Every node starts with its degree as an estimate of its core number, publishes it to
//! its neighbors, then repeatedly lowers it to the largest `k` such that at least `k` of
//! its neighbors published an estimate `>= k` (an h-index of its neighbors' estimates).
//! Estimates are upper bounds of core numbers that never increase; once no estimate
//! changes, they are exactly the core numbers.
//!
//! Nodes only read their own estimate and the values published on their incident edges,
//! so iterations can be run on partitioned graphs. Within an iteration, nodes only see
//! values published during previous iterations, which allows evaluating them in parallel.

use dsi_progress_logger::{progress_logger, ProgressLog};
use rayon::prelude::*;

use crate::errors::{DecompositionError, MemoryBudget};
use crate::graph::*;
use crate::scheduler::Scheduler;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EstimationOptions {
    /// Maximum number of bytes used by the estimates and mailboxes, or `None` for no limit
    pub memory_limit: Option<usize>,
    /// Stop after this many iterations even if estimates did not converge.
    ///
    /// Values larger than the number of nodes are ignored, as the decomposition always
    /// converges before that. A run that reaches this limit before converging ends in
    /// [`Phase::Stopped`], and its estimates are only upper bounds of core numbers.
    pub max_iterations: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No iteration ran yet
    Init,
    Running,
    /// Estimates are final; further calls to [`EstimationState::step`] are no-ops
    Converged,
    /// [`EstimationOptions::max_iterations`] was reached before convergence. Estimates
    /// are upper bounds and there is no result; further calls to
    /// [`EstimationState::step`] are no-ops
    Stopped,
}

/// Counters of a single iteration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IterationStats {
    pub iteration: usize,
    /// Number of nodes that were active during the iteration
    pub evaluated: usize,
    /// Number of nodes whose estimate changed
    pub updated: usize,
    /// Number of nodes scheduled for the next iteration
    pub rescheduled: usize,
}

/// Computes core numbers by running [`EstimationState::step`] until convergence
///
/// # Example
///
/// ```
/// use kcore::estimation::IterativeEstimation;
/// use kcore::graph_builder::GraphBuilder;
///
/// // triangle 0-1-2 with a pendant path 2-3-4
/// let mut builder = GraphBuilder::new(5);
/// builder.edge(0, 1).edge(0, 2).edge(1, 2).edge(2, 3).edge(3, 4);
/// let graph = builder.done();
///
/// let mut state = IterativeEstimation::default().initialize(&graph).unwrap();
/// while !state.is_converged() {
///     let stats = state.step();
///     println!("{} updates", stats.updated);
/// }
/// assert_eq!(state.result(), Some(&[2, 2, 2, 1, 1][..]));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct IterativeEstimation {
    pub options: EstimationOptions,
}

impl IterativeEstimation {
    pub fn new(options: EstimationOptions) -> Self {
        IterativeEstimation { options }
    }

    /// Validates the graph and allocates the state of a decomposition, with all nodes
    /// active.
    ///
    /// The returned state does not borrow the graph: it keeps its own copy of the
    /// adjacency, as mailboxes.
    pub fn initialize<G: GraphView>(
        &self,
        graph: &G,
    ) -> Result<EstimationState, DecompositionError> {
        let summary = crate::graph::validate_within(graph, self.options.memory_limit)?;
        let num_nodes = summary.num_nodes;
        let num_arcs = summary.num_arcs;

        let budget = MemoryBudget {
            structure: "estimation state",
            limit_bytes: self.options.memory_limit,
        };
        // estimates, inbox offsets, cursors and the scheduler queue; then inbox values,
        // inbox senders and outbox slots
        budget.check(
            num_nodes
                .saturating_mul(4)
                .saturating_add(1)
                .saturating_add(num_arcs.saturating_mul(3)),
        )?;

        let mut inbox_offsets = budget.vec(num_nodes + 1, 0usize)?;
        for node in 0..num_nodes {
            inbox_offsets[node + 1] = inbox_offsets[node] + graph.degree(node);
        }

        let mut inbox_senders = budget.vec(num_arcs, 0usize)?;
        let mut outbox = budget.vec(num_arcs, 0usize)?;
        let mut cursors = budget.vec(num_nodes, 0usize)?;
        cursors.copy_from_slice(&inbox_offsets[..num_nodes]);
        for sender in 0..num_nodes {
            let first_edge = inbox_offsets[sender];
            for (i, receiver) in graph.neighbors(sender).into_iter().enumerate() {
                let slot = cursors[receiver];
                cursors[receiver] += 1;
                inbox_senders[slot] = sender;
                outbox[first_edge + i] = slot;
            }
        }
        drop(cursors);

        let (max_iterations, capped) = match self.options.max_iterations {
            Some(max_iterations) if max_iterations < num_nodes => (max_iterations, true),
            _ => (num_nodes, false),
        };

        Ok(EstimationState {
            estimates: budget.vec(num_nodes, 0usize)?,
            inbox_offsets,
            inbox_values: budget.vec(num_arcs, 0usize)?,
            inbox_senders,
            outbox,
            scheduler: Scheduler::all_active(num_nodes),
            phase: if num_nodes == 0 {
                Phase::Converged
            } else {
                Phase::Init
            },
            iterations: 0,
            max_iterations,
            capped,
            last_stats: None,
        })
    }

    /// Returns the core number of every node of the graph
    ///
    /// Fails with [`DecompositionError::IterationLimit`] if
    /// [`EstimationOptions::max_iterations`] is reached before convergence.
    pub fn decompose<G: GraphView>(&self, graph: &G) -> Result<Vec<usize>, DecompositionError> {
        let mut state = self.initialize(graph)?;

        let mut pl = progress_logger!(
            item_name = "iteration",
            expected_updates = Some(state.max_iterations()),
        );
        pl.start("Estimating core numbers");
        while !state.is_finished() {
            let stats = state.step();
            log::info!(
                "Iteration {}: {} nodes evaluated, {} updates, {} nodes scheduled for the next iteration",
                stats.iteration,
                stats.evaluated,
                stats.updated,
                stats.rescheduled,
            );
            pl.update();
        }
        pl.done();

        let iterations = state.iterations();
        let scheduled = state.scheduler().len();
        state
            .into_result()
            .ok_or(DecompositionError::IterationLimit {
                iterations,
                scheduled,
            })
    }
}

/// State of a decomposition by [`IterativeEstimation`], owned by the caller driving it.
#[derive(Clone, Debug)]
pub struct EstimationState {
    /// Current upper bound of each node's core number
    estimates: Vec<usize>,
    /// Node `v` receives the values published by its neighbors in
    /// `inbox_values[inbox_offsets[v]..inbox_offsets[v + 1]]`
    inbox_offsets: Vec<usize>,
    inbox_values: Vec<usize>,
    /// Node which publishes in each inbox slot
    inbox_senders: Vec<NodeId>,
    /// `outbox[inbox_offsets[v] + i]` is the slot where `v` publishes to its `i`-th neighbor
    outbox: Vec<usize>,
    scheduler: Scheduler,
    phase: Phase,
    iterations: usize,
    max_iterations: usize,
    /// Whether `max_iterations` was lowered by the caller, so reaching it means stopping
    /// before convergence
    capped: bool,
    last_stats: Option<IterationStats>,
}

impl EstimationState {
    pub fn num_nodes(&self) -> usize {
        self.estimates.len()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_converged(&self) -> bool {
        self.phase == Phase::Converged
    }

    /// Whether further calls to [`Self::step`] are no-ops, either because estimates
    /// converged or because the iteration limit was reached
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Converged | Phase::Stopped)
    }

    /// Number of iterations run so far
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Number of iterations after which the state is considered converged, even if
    /// estimates still change
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Counters of the last iteration that ran, if any
    pub fn last_stats(&self) -> Option<IterationStats> {
        self.last_stats
    }

    /// Current estimates; they are all zero before the first iteration, and upper bounds
    /// of core numbers afterwards
    pub fn estimates(&self) -> &[usize] {
        &self.estimates
    }

    /// Nodes to evaluate at the next iteration
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Returns the core numbers, or `None` if the decomposition did not converge (yet)
    pub fn result(&self) -> Option<&[usize]> {
        self.is_converged().then_some(self.estimates.as_slice())
    }

    /// Same as [`Self::result`], but returns an owned array
    pub fn into_result(self) -> Option<Vec<usize>> {
        self.is_converged().then_some(self.estimates)
    }

    #[inline(always)]
    fn degree(&self, node: NodeId) -> usize {
        self.inbox_offsets[node + 1] - self.inbox_offsets[node]
    }

    #[inline(always)]
    fn inbox(&self, node: NodeId) -> std::ops::Range<usize> {
        self.inbox_offsets[node]..self.inbox_offsets[node + 1]
    }

    /// Publishes the current estimate of `node` on all its incident edges
    fn broadcast(&mut self, node: NodeId) {
        let estimate = self.estimates[node];
        for edge in self.inbox(node) {
            self.inbox_values[self.outbox[edge]] = estimate;
        }
    }

    /// Returns the largest `k <= estimate(node)` such that at least `k` neighbors published
    /// an estimate `>= k`, or the degree of the node if there is none.
    fn local_estimate(&self, node: NodeId) -> usize {
        let estimate = self.estimates[node];
        let mut counts = vec![0usize; estimate + 1];
        for slot in self.inbox(node) {
            counts[self.inbox_values[slot].min(estimate)] += 1;
        }

        let mut cumulative_count = 0;
        for k in (1..=estimate).rev() {
            cumulative_count += counts[k];
            if cumulative_count >= k {
                return k;
            }
        }
        // Only reached for isolated nodes (or nodes whose neighbors all published 0,
        // which never happens); the degree is still an upper bound.
        self.degree(node)
    }

    /// Runs one iteration over the active nodes, then schedules the next one
    pub fn step(&mut self) -> IterationStats {
        let stats = match self.phase {
            Phase::Converged | Phase::Stopped => {
                log::debug!("Decomposition already finished, skipping iteration");
                return IterationStats {
                    iteration: self.iterations,
                    ..Default::default()
                };
            }
            Phase::Init => self.initial_step(),
            Phase::Running => self.estimation_step(),
        };
        self.iterations += 1;
        self.last_stats = Some(stats);

        // With no node scheduled, the next iteration would evaluate no node, so it could
        // not update any estimate either
        if stats.updated == 0 || self.scheduler.is_empty() {
            log::debug!(
                "Converged after {} iterations ({} updates, {} nodes scheduled)",
                self.iterations,
                stats.updated,
                self.scheduler.len(),
            );
            self.phase = Phase::Converged;
        } else if self.iterations >= self.max_iterations && self.capped {
            log::warn!(
                "Reached the limit of {} iterations with {} nodes still scheduled, stopping before convergence",
                self.iterations,
                self.scheduler.len(),
            );
            self.phase = Phase::Stopped;
        } else if self.iterations >= self.max_iterations {
            log::warn!(
                "Reached {} iterations with {} nodes still scheduled, assuming convergence",
                self.iterations,
                self.scheduler.len(),
            );
            self.phase = Phase::Converged;
        } else {
            self.phase = Phase::Running;
        }

        stats
    }

    /// Sets every active node's estimate to its degree and publishes it
    fn initial_step(&mut self) -> IterationStats {
        let active = self.scheduler.snapshot();
        self.scheduler.clear_active();

        let mut rescheduled = 0;
        for &node in &active {
            self.estimates[node] = self.degree(node);
            self.broadcast(node);
            // isolated nodes are already final
            if self.degree(node) > 0 && self.scheduler.add_active(node) {
                rescheduled += 1;
            }
        }

        IterationStats {
            iteration: self.iterations,
            evaluated: active.len(),
            updated: active.len(),
            rescheduled,
        }
    }

    fn estimation_step(&mut self) -> IterationStats {
        let active = self.scheduler.snapshot();
        self.scheduler.clear_active();

        // Reads only values published during previous iterations
        let updates: Vec<(NodeId, usize)> = {
            let this = &*self;
            active
                .par_iter()
                .filter_map(|&node| {
                    let candidate = this.local_estimate(node);
                    (candidate < this.estimates[node]).then_some((node, candidate))
                })
                .collect()
        };

        // Neighbors which published at least the new estimate may now be lowered too.
        // This must read inboxes before any of this iteration's broadcasts.
        let mut rescheduled = 0;
        for &(node, candidate) in &updates {
            for slot in self.inbox(node) {
                if self.inbox_values[slot] >= candidate
                    && self.scheduler.add_active(self.inbox_senders[slot])
                {
                    rescheduled += 1;
                }
            }
        }

        // A new estimate k >= 1 is supported by k neighbors which published at least k
        debug_assert!(
            updates.is_empty() || !self.scheduler.is_empty(),
            "{} nodes updated but none rescheduled",
            updates.len()
        );

        for &(node, candidate) in &updates {
            self.estimates[node] = candidate;
            self.broadcast(node);
        }

        IterationStats {
            iteration: self.iterations,
            evaluated: active.len(),
            updated: updates.len(),
            rescheduled,
        }
    }
}
