// Copyright (C) 2023  The Software Heritage developers
// See the AUTHORS file at the top-level directory of this distribution
// License: GNU General Public License version 3, or any later version
// See top-level LICENSE file for more information

//! Wrappers exposing other graph representations as a [`GraphView`](crate::graph::GraphView)

mod symmetric;
pub use symmetric::Symmetric;
mod webgraph;
pub use webgraph::WebgraphView;
