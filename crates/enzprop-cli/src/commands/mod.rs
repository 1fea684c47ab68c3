pub mod build;
pub mod load;
pub mod propagate;
pub mod run;
pub mod show;

use crate::error::{CliError, Result};
use enzprop::core::io::export;
use enzprop::core::io::tsv::{self, LoadReport};
use enzprop::core::models::edge::SimilarityEdge;
use enzprop::core::models::prediction::Prediction;
use enzprop::store::memory::MemoryProteinRepository;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

const SAMPLE_PREDICTIONS: usize = 5;

/// Reads the protein table at `path` into an in-memory repository.
pub(crate) fn load_repository(path: &Path) -> Result<(MemoryProteinRepository, LoadReport)> {
    info!("Loading protein table from {:?}", path);
    let outcome = tsv::read_proteins_from_path(path).map_err(|e| CliError::parsing(path, e))?;
    if outcome.report.skipped > 0 {
        println!(
            "Warning: skipped {} malformed row(s) in {}",
            outcome.report.skipped,
            path.display()
        );
    }
    Ok((MemoryProteinRepository::new(outcome.proteins), outcome.report))
}

pub(crate) fn write_edges(path: &Path, edges: &[SimilarityEdge]) -> Result<usize> {
    info!("Writing {} edge(s) to {:?}", edges.len(), path);
    let writer = BufWriter::new(File::create(path)?);
    export::write_edges(writer, edges).map_err(|e| CliError::parsing(path, e))
}

pub(crate) fn write_predictions(path: &Path, predictions: &[Prediction]) -> Result<usize> {
    info!("Writing {} prediction(s) to {:?}", predictions.len(), path);
    let writer = BufWriter::new(File::create(path)?);
    export::write_predictions(writer, predictions).map_err(|e| CliError::parsing(path, e))
}

pub(crate) fn print_prediction(prediction: &Prediction) {
    let labels = prediction
        .labels()
        .iter()
        .map(|l| format!("{} ({:.3})", l.label, l.confidence))
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "  {:<12} {} [mean {:.3}]",
        prediction.protein_id(),
        labels,
        prediction.mean_confidence()
    );
}

pub(crate) fn print_samples(predictions: &[Prediction]) {
    if predictions.is_empty() {
        return;
    }
    println!("Sample predictions:");
    for prediction in predictions.iter().take(SAMPLE_PREDICTIONS) {
        print_prediction(prediction);
    }
}
