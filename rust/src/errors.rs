// Copyright (C) 2025  The Software Heritage developers
// See the AUTHORS file at the top-level directory of this distribution
// License: GNU General Public License version 3, or any later version
// See top-level LICENSE file for more information

//! Errors returned by the decomposers
//!
//! A failed call never returns a partial result: all errors but
//! [`DecompositionError::IterationLimit`] are raised before any core number is computed,
//! and that one is raised instead of returning estimates which may not be final.

use std::collections::TryReserveError;

use thiserror::Error;

use crate::graph::NodeId;

/// Coarse classification of a [`DecompositionError`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The graph does not respect the [`GraphView`](crate::graph::GraphView) contract
    InvalidGraph,
    /// The graph is well-formed but not simple
    PreconditionViolation,
    /// The in-memory structures do not fit; the caller should use a partitioned variant
    ResourceExhaustion,
    /// The caller's iteration limit was reached before estimates converged
    IterationLimit,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecompositionError {
    #[error("Node {node} has neighbor {neighbor}, but the graph only has {num_nodes} nodes")]
    NeighborOutOfRange {
        node: NodeId,
        neighbor: NodeId,
        num_nodes: usize,
    },
    #[error("Node {node} has degree {degree} but {num_neighbors} neighbors")]
    DegreeMismatch {
        node: NodeId,
        degree: usize,
        num_neighbors: usize,
    },
    #[error("Node {node} has {degree} neighbors but appears in {indegree} adjacency lists")]
    Asymmetric {
        node: NodeId,
        degree: usize,
        indegree: usize,
    },
    #[error("Node {node} has a self-loop")]
    SelfLoop { node: NodeId },
    #[error("Node {node} lists neighbor {neighbor} more than once")]
    DuplicateEdge { node: NodeId, neighbor: NodeId },
    #[error("{structure} needs {requested_bytes} bytes{}", limit_suffix(.limit_bytes))]
    ResourceExhaustion {
        structure: &'static str,
        requested_bytes: usize,
        limit_bytes: Option<usize>,
    },
    #[error("Stopped after {iterations} iterations with {scheduled} nodes still scheduled, before estimates converged")]
    IterationLimit { iterations: usize, scheduled: usize },
}

fn limit_suffix(limit_bytes: &Option<usize>) -> String {
    match limit_bytes {
        Some(limit) => format!(", which exceeds the limit of {limit} bytes"),
        None => ", which could not be allocated".to_owned(),
    }
}

impl DecompositionError {
    pub fn kind(&self) -> ErrorKind {
        use DecompositionError::*;

        match self {
            NeighborOutOfRange { .. } | DegreeMismatch { .. } | Asymmetric { .. } => {
                ErrorKind::InvalidGraph
            }
            SelfLoop { .. } | DuplicateEdge { .. } => ErrorKind::PreconditionViolation,
            ResourceExhaustion { .. } => ErrorKind::ResourceExhaustion,
            IterationLimit { .. } => ErrorKind::IterationLimit,
        }
    }
}

/// Footprint of a set of word-sized arrays, and the allocations backing them
#[derive(Debug, Clone, Copy)]
pub(crate) struct MemoryBudget {
    pub structure: &'static str,
    pub limit_bytes: Option<usize>,
}

impl MemoryBudget {
    /// Fails if `words` machine words do not fit in the configured limit
    pub fn check(&self, words: usize) -> Result<(), DecompositionError> {
        let requested_bytes = words.saturating_mul(std::mem::size_of::<usize>());
        match self.limit_bytes {
            Some(limit) if requested_bytes > limit => Err(self.exhausted(requested_bytes)),
            _ => Ok(()),
        }
    }

    /// Allocates a vector of `len` copies of `value`, reporting allocation failures
    /// instead of aborting
    pub fn vec<T: Clone>(&self, len: usize, value: T) -> Result<Vec<T>, DecompositionError> {
        let mut v = Vec::new();
        v.try_reserve_exact(len)
            .map_err(|e: TryReserveError| {
                log::error!("Could not allocate {} for {} items: {e}", self.structure, len);
                self.exhausted(len.saturating_mul(std::mem::size_of::<T>()))
            })?;
        v.resize(len, value);
        Ok(v)
    }

    fn exhausted(&self, requested_bytes: usize) -> DecompositionError {
        DecompositionError::ResourceExhaustion {
            structure: self.structure,
            requested_bytes,
            limit_bytes: self.limit_bytes,
        }
    }
}
