use super::{load_repository, print_samples, write_edges, write_predictions};
use crate::cli::RunArgs;
use crate::config::build_config;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use enzprop::engine::cancel::CancellationToken;
use enzprop::engine::progress::ProgressReporter;
use enzprop::store::memory::{MemoryGraphStore, MemoryPredictionStore};
use enzprop::store::retry::Retrying;
use enzprop::workflows::pipeline;
use tracing::{info, warn};

pub async fn run(args: RunArgs, cancel: CancellationToken) -> Result<()> {
    let config = build_config(&args.config)?.pipeline;
    let (repository, _) = tokio::task::block_in_place(|| load_repository(&args.input))?;

    let repository = Retrying::new(repository, config.retry.clone());
    let graph = Retrying::new(MemoryGraphStore::new(), config.retry.clone());
    let predictions = Retrying::new(MemoryPredictionStore::new(), config.retry.clone());

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Running graph build and label propagation...");
    info!("Invoking the pipeline workflow...");
    let report = tokio::task::block_in_place(|| {
        pipeline::run(
            &repository,
            &graph,
            &predictions,
            &config,
            &reporter,
            &cancel,
        )
    })?;

    if let Some(path) = &args.edges {
        let edges = graph.inner().edges()?;
        let written = tokio::task::block_in_place(|| write_edges(path, &edges))?;
        println!("✓ {} edge(s) written to: {}", written, path.display());
    }

    let graph_report = &report.graph;
    println!("Graph statistics:");
    println!(
        "  Nodes:           {} ({} labeled, {} unlabeled)",
        graph_report.nodes_created, graph_report.labeled_nodes, graph_report.unlabeled_nodes
    );
    println!("  Edges:           {}", graph_report.edges_created);
    println!("  Average degree:  {:.2}", graph_report.average_degree());

    let Some(propagation) = &report.propagation else {
        warn!("Pipeline stopped after a cancelled graph build.");
        println!("Warning: graph build cancelled; no labels were propagated.");
        return Ok(());
    };

    println!("Propagation statistics:");
    println!("  Proteins annotated:  {}", propagation.proteins_annotated);
    println!("  Labels assigned:     {}", propagation.labels_assigned);
    println!(
        "  Labels per protein:  {:.2}",
        propagation.average_labels_per_protein()
    );
    println!("  Mean confidence:     {:.3}", propagation.mean_confidence);

    let stored = predictions.inner().all()?;
    let written = tokio::task::block_in_place(|| write_predictions(&args.output, &stored))?;
    print_samples(&stored);
    println!(
        "✓ {} prediction(s) written to: {}",
        written,
        args.output.display()
    );
    Ok(())
}
