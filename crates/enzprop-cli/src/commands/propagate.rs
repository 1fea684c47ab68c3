use super::{load_repository, print_samples, write_predictions};
use crate::cli::PropagateArgs;
use crate::config::build_config;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use enzprop::core::io::export;
use enzprop::engine::cancel::CancellationToken;
use enzprop::engine::progress::ProgressReporter;
use enzprop::store::memory::{MemoryGraphStore, MemoryPredictionStore};
use enzprop::store::retry::Retrying;
use enzprop::store::{GraphStore, ProteinRepository};
use enzprop::workflows::propagate;
use tracing::{info, warn};

pub async fn run(args: PropagateArgs, cancel: CancellationToken) -> Result<()> {
    let config = build_config(&args.config)?.pipeline;
    let (repository, _) = tokio::task::block_in_place(|| load_repository(&args.input))?;

    info!("Loading edge list from {:?}", &args.edges);
    let edges = tokio::task::block_in_place(|| export::read_edges_from_path(&args.edges))
        .map_err(|e| CliError::parsing(&args.edges, e))?;

    let graph = MemoryGraphStore::new();
    graph.create_nodes(&repository.list_proteins_with_domains(config.protein_limit)?)?;
    if let Err(e) = graph.create_edges(&edges) {
        warn!("Edge list references proteins missing from the table: {}", e);
        println!("Warning: {}", e);
    }

    let graph = Retrying::new(graph, config.retry.clone());
    let predictions = Retrying::new(MemoryPredictionStore::new(), config.retry.clone());

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Propagating labels...");
    info!("Invoking the propagation workflow...");
    let report = tokio::task::block_in_place(|| {
        propagate::run(&graph, &predictions, &config.propagation, &reporter, &cancel)
    })?;

    let stored = predictions.inner().all()?;
    let written = tokio::task::block_in_place(|| write_predictions(&args.output, &stored))?;

    println!("Propagation statistics:");
    println!("  Unlabeled proteins:   {}", report.candidates);
    println!("  With voting neighbors: {}", report.qualified);
    println!("  Proteins annotated:   {}", report.proteins_annotated);
    println!("  Labels assigned:      {}", report.labels_assigned);
    println!(
        "  Labels per protein:   {:.2}",
        report.average_labels_per_protein()
    );
    println!("  Mean confidence:      {:.3}", report.mean_confidence);
    if report.cancelled {
        println!("Warning: propagation cancelled; predictions are partial.");
    }
    print_samples(&stored);
    println!(
        "✓ {} prediction(s) written to: {}",
        written,
        args.output.display()
    );
    Ok(())
}
