// Copyright (C) 2025  The Software Heritage developers
// See the AUTHORS file at the top-level directory of this distribution
// License: GNU General Public License version 3, or any later version
// See top-level LICENSE file for more information

#![doc = include_str!("../README.md")]

pub mod errors;
pub use errors::{DecompositionError, ErrorKind};

pub mod graph;
pub mod graph_builder;
pub mod views;

pub mod estimation;
pub use estimation::IterativeEstimation;
pub mod peeling;
pub use peeling::ExactPeeling;
pub mod scheduler;

pub mod stats;

pub use webgraph;
