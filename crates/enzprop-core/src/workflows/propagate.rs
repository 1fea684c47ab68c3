use crate::core::models::prediction::Prediction;
use crate::engine::batch::Batcher;
use crate::engine::cancel::CancellationToken;
use crate::engine::config::PropagationConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tasks::voting::Propagation;
use crate::store::{GraphStore, PredictionStore};
use crate::workflows::build_graph::absorb;
use tracing::{info, instrument, warn};

/// Statistics of one propagation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropagationReport {
    /// Unlabeled nodes in the graph when the run started.
    pub candidates: usize,
    pub evaluated: usize,
    /// Evaluated nodes with at least one qualifying labeled neighbor.
    pub qualified: usize,
    pub proteins_annotated: usize,
    pub labels_assigned: usize,
    /// Mean over predictions of their mean confidence.
    pub mean_confidence: f64,
    pub predictions_written: usize,
    pub failed_batches: usize,
    pub annotation_failures: usize,
    pub cancelled: bool,
}

impl PropagationReport {
    pub fn average_labels_per_protein(&self) -> f64 {
        if self.proteins_annotated == 0 {
            0.0
        } else {
            self.labels_assigned as f64 / self.proteins_annotated as f64
        }
    }
}

#[instrument(skip_all, name = "propagate_workflow")]
pub fn run<G, P>(
    graph: &G,
    predictions: &P,
    config: &PropagationConfig,
    reporter: &ProgressReporter,
    cancel: &CancellationToken,
) -> Result<PropagationReport, EngineError>
where
    G: GraphStore + ?Sized,
    P: PredictionStore + ?Sized,
{
    config.validate()?;
    reporter.report(Progress::PhaseStart {
        name: "Propagating Labels",
    });

    let propagation = Propagation::new(graph, config)?;
    let mut report = PropagationReport {
        candidates: propagation.candidate_count(),
        ..Default::default()
    };
    info!(
        candidates = report.candidates,
        min_edge_weight = config.min_edge_weight,
        confidence_threshold = config.confidence_threshold,
        max_labels = config.max_labels_per_protein,
        "Starting label propagation."
    );
    reporter.report(Progress::TaskStart {
        total_steps: report.candidates as u64,
    });

    let mut confidence_sum = 0.0;
    let mut batcher = Batcher::new(config.batch_size);
    for block in propagation.blocks() {
        let block = block?;
        report.evaluated += block.evaluated;
        report.qualified += block.qualified;
        for prediction in &block.predictions {
            report.proteins_annotated += 1;
            report.labels_assigned += prediction.labels().len();
            confidence_sum += prediction.mean_confidence();
        }
        for batch in batcher.extend(block.predictions) {
            persist(graph, predictions, &batch, &mut report)?;
        }
        reporter.report(Progress::Voting {
            processed: block.processed as u64,
            total: report.candidates as u64,
            predictions: report.proteins_annotated as u64,
        });
        if block.processed < report.candidates && cancel.is_cancelled() {
            warn!(
                processed = block.processed,
                total = report.candidates,
                "Propagation cancelled; flushing pending predictions."
            );
            report.cancelled = true;
            break;
        }
    }
    if let Some(batch) = batcher.finish() {
        persist(graph, predictions, &batch, &mut report)?;
    }
    if report.proteins_annotated > 0 {
        report.mean_confidence = confidence_sum / report.proteins_annotated as f64;
    }

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    info!(
        evaluated = report.evaluated,
        qualified = report.qualified,
        annotated = report.proteins_annotated,
        labels = report.labels_assigned,
        mean_confidence = report.mean_confidence,
        failed_batches = report.failed_batches,
        "Label propagation finished."
    );
    Ok(report)
}

fn persist<G, P>(
    graph: &G,
    predictions: &P,
    batch: &[Prediction],
    report: &mut PropagationReport,
) -> Result<(), EngineError>
where
    G: GraphStore + ?Sized,
    P: PredictionStore + ?Sized,
{
    report.predictions_written += absorb(
        predictions.upsert_predictions(batch),
        "predictions",
        &mut report.failed_batches,
    )?;
    // Node annotation is informational; its failures never stop the run.
    if let Err(e) = graph.annotate_predictions(batch) {
        warn!(batch = batch.len(), "Failed to annotate graph nodes: {}", e);
        report.annotation_failures += 1;
    }
    Ok(())
}

/// The stored prediction for `protein_id`.
pub fn prediction_for<P: PredictionStore + ?Sized>(
    predictions: &P,
    protein_id: &str,
) -> Result<Prediction, EngineError> {
    predictions
        .prediction(protein_id)?
        .ok_or_else(|| EngineError::ProteinNotFound {
            id: protein_id.to_string(),
        })
}
