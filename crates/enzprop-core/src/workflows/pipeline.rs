use super::build_graph::{self, GraphBuildReport};
use super::propagate::{self, PropagationReport};
use crate::engine::cancel::CancellationToken;
use crate::engine::config::PipelineConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::store::{GraphStore, PredictionStore, ProteinRepository};
use tracing::{info, instrument};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineReport {
    pub graph: GraphBuildReport,
    /// `None` when the graph build was cancelled.
    pub propagation: Option<PropagationReport>,
}

/// Builds the similarity graph and then propagates labels over it.
///
/// A skipped build still propagates over the graph already in the store.
#[instrument(skip_all, name = "pipeline_workflow")]
pub fn run<R, G, P>(
    repository: &R,
    graph: &G,
    predictions: &P,
    config: &PipelineConfig,
    reporter: &ProgressReporter,
    cancel: &CancellationToken,
) -> Result<PipelineReport, EngineError>
where
    R: ProteinRepository + ?Sized,
    G: GraphStore + ?Sized,
    P: PredictionStore + ?Sized,
{
    let graph_report = build_graph::run(repository, graph, config, reporter, cancel)?;
    if graph_report.cancelled {
        info!("Graph build cancelled; skipping propagation.");
        return Ok(PipelineReport {
            graph: graph_report,
            propagation: None,
        });
    }

    let propagation_report =
        propagate::run(graph, predictions, &config.propagation, reporter, cancel)?;
    Ok(PipelineReport {
        graph: graph_report,
        propagation: Some(propagation_report),
    })
}
