// Copyright (C) 2025  The Software Heritage developers
// See the AUTHORS file at the top-level directory of this distribution
// License: GNU General Public License version 3, or any later version
// See top-level LICENSE file for more information

//! Computes the core number of every node of a BVGraph, and writes them as one
//! `node:core` line per node.
//!
//! The graph must be undirected, ie. contain both `a -> b` and `b -> a` for every edge,
//! unless `--symmetrize` is given; in which case the transposed graph is loaded from
//! `<graph_path>-transposed` and merged with the graph.

use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dsi_bitstream::prelude::BE;
use dsi_progress_logger::{progress_logger, ProgressLog};
use webgraph::prelude::*;

use kcore::estimation::EstimationOptions;
use kcore::graph::GraphView;
use kcore::peeling::PeelingOptions;
use kcore::stats;
use kcore::views::{Symmetric, WebgraphView};
use kcore::{ExactPeeling, IterativeEstimation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Algorithm {
    /// Sequential bucket-sorted peeling
    Exact,
    /// Parallel h-index iterations
    Iterative,
}

/// Computes the k-core decomposition of an undirected graph
#[derive(Parser, Debug)]
#[command()]
struct Args {
    /// Basename of the BVGraph
    graph_path: PathBuf,
    #[arg(short, long, value_enum, default_value_t = Algorithm::Exact)]
    algorithm: Algorithm,
    #[arg(long)]
    /// Treat the graph as directed, and decompose the union of it and its transpose
    symmetrize: bool,
    #[arg(short, long)]
    /// Where to write core numbers. Defaults to `<graph_path>.cores`
    output: Option<PathBuf>,
    #[arg(long)]
    /// Maximum number of bytes to allocate for the decomposition's own structures
    memory_limit: Option<usize>,
    #[arg(long)]
    /// Fail if the iterative algorithm did not converge after this many iterations
    max_iterations: Option<usize>,
    #[arg(short, long)]
    /// Number of threads used by the iterative algorithm. Defaults to the number of CPUs
    threads: Option<usize>,
}

fn suffix_path<P: AsRef<Path>, S: AsRef<OsStr>>(path: P, suffix: S) -> PathBuf {
    let mut path = path.as_ref().as_os_str().to_owned();
    path.push(suffix);
    path.into()
}

fn load_graph(path: &Path) -> Result<WebgraphView<impl RandomAccessGraph>> {
    log::info!("Loading {}", path.display());
    let graph = BvGraph::with_basename(path)
        .endianness::<BE>()
        .flags(MemoryFlags::TRANSPARENT_HUGE_PAGES | MemoryFlags::RANDOM_ACCESS)
        .load()
        .with_context(|| format!("Could not load graph from {}", path.display()))?;
    Ok(WebgraphView(graph))
}

fn decompose<G: GraphView + Sync>(graph: &G, args: &Args) -> Result<Vec<usize>> {
    let degree_stats = stats::degrees(graph);
    log::info!(
        "|V| = {}, |E| = {}, dmax = {}, davg = {:.2}",
        graph.num_nodes(),
        degree_stats.total / 2,
        degree_stats.max,
        degree_stats.avg,
    );

    let start = Instant::now();
    let core_numbers = match args.algorithm {
        Algorithm::Exact => ExactPeeling::new(PeelingOptions {
            memory_limit: args.memory_limit,
        })
        .decompose(graph)?,
        Algorithm::Iterative => IterativeEstimation::new(EstimationOptions {
            memory_limit: args.memory_limit,
            max_iterations: args.max_iterations,
        })
        .decompose(graph)
        .context("Iterative estimation failed")?,
    };
    log::info!(
        "Decomposed with {:?} algorithm in {:.3}s",
        args.algorithm,
        start.elapsed().as_secs_f64()
    );
    Ok(core_numbers)
}

fn write_core_numbers(path: &Path, core_numbers: &[usize]) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Could not create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let mut pl = progress_logger!(
        item_name = "node",
        local_speed = true,
        expected_updates = Some(core_numbers.len()),
    );
    pl.start("Writing core numbers");
    for (node, core) in core_numbers.iter().enumerate() {
        writeln!(writer, "{}:{}", node, core)
            .with_context(|| format!("Could not write to {}", path.display()))?;
        pl.light_update();
    }
    pl.done();

    writer
        .flush()
        .with_context(|| format!("Could not flush {}", path.display()))
}

pub fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Some(num_threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .context("Could not initialize thread pool")?;
    }

    let graph = load_graph(&args.graph_path)?;
    let core_numbers = if args.symmetrize {
        let transposed = load_graph(&suffix_path(&args.graph_path, "-transposed"))?;
        anyhow::ensure!(
            graph.num_nodes() == transposed.num_nodes(),
            "Graph has {} nodes but its transpose has {}",
            graph.num_nodes(),
            transposed.num_nodes()
        );
        decompose(&Symmetric::new(graph, transposed), &args)?
    } else {
        decompose(&graph, &args)?
    };

    let core_stats = stats::cores(&core_numbers);
    log::info!(
        "kmax = {}, kavg = {:.2} over {} non-isolated nodes",
        core_stats.max_core,
        core_stats.avg_core,
        core_stats.num_nodes_in_cores,
    );
    for (k, count) in stats::core_histogram(&core_numbers).into_iter().enumerate() {
        log::debug!("{} nodes with core number {}", count, k);
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| suffix_path(&args.graph_path, ".cores"));
    write_core_numbers(&output, &core_numbers)?;
    log::info!("Wrote core numbers to {}", output.display());

    Ok(())
}
