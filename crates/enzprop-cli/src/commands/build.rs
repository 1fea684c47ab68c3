use super::{load_repository, write_edges};
use crate::cli::BuildArgs;
use crate::config::build_config;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use enzprop::core::io::export;
use enzprop::engine::cancel::CancellationToken;
use enzprop::engine::progress::ProgressReporter;
use enzprop::store::memory::MemoryGraphStore;
use enzprop::store::retry::Retrying;
use enzprop::store::{GraphStore, ProteinRepository};
use enzprop::workflows::build_graph;
use std::path::Path;
use tracing::{info, warn};

pub async fn run(args: BuildArgs, cancel: CancellationToken) -> Result<()> {
    let config = build_config(&args.config)?.pipeline;
    let (repository, _) = tokio::task::block_in_place(|| load_repository(&args.input))?;

    let graph = MemoryGraphStore::new();
    if args.output.exists() {
        tokio::task::block_in_place(|| preload_graph(&graph, &repository, &args.output))?;
    }

    let repository = Retrying::new(repository, config.retry.clone());
    let graph = Retrying::new(graph, config.retry.clone());

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Building the similarity graph...");
    info!("Invoking the graph build workflow...");
    let report = tokio::task::block_in_place(|| {
        build_graph::run(&repository, &graph, &config, &reporter, &cancel)
    })?;

    if report.skipped {
        println!(
            "Existing graph in {} kept (reload mode: {}).",
            args.output.display(),
            config.reload_mode
        );
        return Ok(());
    }

    let edges = graph.inner().edges()?;
    let written = tokio::task::block_in_place(|| write_edges(&args.output, &edges))?;

    println!("Graph statistics:");
    println!("  Proteins:        {}", report.proteins_loaded);
    println!(
        "  Nodes:           {} ({} labeled, {} unlabeled)",
        report.nodes_created, report.labeled_nodes, report.unlabeled_nodes
    );
    println!(
        "  Comparisons:     {}/{}",
        report.comparisons, report.total_pairs
    );
    println!("  Edges:           {}", report.edges_created);
    println!("  Average degree:  {:.2}", report.average_degree());
    if report.failed_batches > 0 {
        println!("  Failed batches:  {}", report.failed_batches);
    }
    if report.cancelled {
        warn!("Graph build was cancelled before all pairs were compared.");
        println!("Warning: build cancelled; the edge list is incomplete.");
    }
    println!("✓ {} edge(s) written to: {}", written, args.output.display());
    Ok(())
}

/// Rebuilds an edge list written by an earlier run as the current graph, so
/// that the reload mode has something to act on.
fn preload_graph(
    graph: &MemoryGraphStore,
    repository: &impl ProteinRepository,
    path: &Path,
) -> Result<()> {
    info!("Loading existing graph from {:?}", path);
    let edges = export::read_edges_from_path(path).map_err(|e| CliError::parsing(path, e))?;
    graph.create_nodes(&repository.list_proteins_with_domains(None)?)?;
    if let Err(e) = graph.create_edges(&edges) {
        warn!("Existing edge list references unknown proteins: {}", e);
    }
    info!(
        nodes = graph.count_nodes()?,
        edges = graph.edge_count()?,
        "Existing graph loaded."
    );
    Ok(())
}
