use crate::core::models::protein::ProteinRecord;
use crate::engine::batch::Batcher;
use crate::engine::cancel::CancellationToken;
use crate::engine::config::{PipelineConfig, ReloadMode};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tasks::pairwise::PairwiseScan;
use crate::store::{GraphStore, ProteinRepository, StoreError};
use tracing::{info, instrument, warn};

/// Statistics of one graph build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphBuildReport {
    pub proteins_loaded: usize,
    pub nodes_created: usize,
    pub labeled_nodes: usize,
    pub unlabeled_nodes: usize,
    pub total_pairs: u64,
    pub comparisons: u64,
    /// Edges at or above the similarity threshold.
    pub edges_found: usize,
    /// Edges the graph store accepted.
    pub edges_created: usize,
    pub failed_batches: usize,
    /// The existing graph was kept and nothing was built.
    pub skipped: bool,
    pub cancelled: bool,
}

impl GraphBuildReport {
    /// `2E / N` over the nodes and edges written by this build.
    pub fn average_degree(&self) -> f64 {
        if self.nodes_created == 0 {
            0.0
        } else {
            2.0 * self.edges_created as f64 / self.nodes_created as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.skipped && !self.cancelled && self.comparisons == self.total_pairs
    }
}

#[instrument(skip_all, name = "build_graph_workflow")]
pub fn run<R, G>(
    repository: &R,
    graph: &G,
    config: &PipelineConfig,
    reporter: &ProgressReporter,
    cancel: &CancellationToken,
) -> Result<GraphBuildReport, EngineError>
where
    R: ProteinRepository + ?Sized,
    G: GraphStore + ?Sized,
{
    config.validate()?;
    let mut report = GraphBuildReport::default();

    // === Phase 0: Existing graph ===
    if !prepare_store(graph, config.reload_mode, reporter)? {
        report.skipped = true;
        return Ok(report);
    }

    // === Phase 1: Load proteins ===
    let proteins = load_proteins(repository, config.protein_limit, reporter)?;
    report.proteins_loaded = proteins.len();
    report.labeled_nodes = proteins.iter().filter(|p| p.is_labeled()).count();
    report.unlabeled_nodes = proteins.len() - report.labeled_nodes;

    // === Phase 2: Nodes ===
    create_nodes(graph, &proteins, config, reporter, &mut report)?;

    // === Phase 3: Pairwise comparison and edges ===
    create_edges(graph, &proteins, config, reporter, cancel, &mut report)?;

    info!(
        proteins = report.proteins_loaded,
        nodes = report.nodes_created,
        edges = report.edges_created,
        comparisons = report.comparisons,
        failed_batches = report.failed_batches,
        average_degree = report.average_degree(),
        cancelled = report.cancelled,
        "Graph build finished."
    );
    Ok(report)
}

/// Applies the reload mode. Returns `false` when the build should not run.
fn prepare_store<G: GraphStore + ?Sized>(
    graph: &G,
    mode: ReloadMode,
    reporter: &ProgressReporter,
) -> Result<bool, EngineError> {
    let existing = graph.count_nodes()?;
    if existing == 0 {
        return Ok(true);
    }
    match mode {
        ReloadMode::Clear => {
            info!(existing, "Clearing existing graph before rebuilding.");
            graph.clear()?;
            reporter.report(Progress::Message(format!(
                "Cleared {} existing nodes.",
                existing
            )));
            Ok(true)
        }
        ReloadMode::Skip => {
            info!(existing, "Graph already populated; skipping build.");
            reporter.report(Progress::Message(format!(
                "Keeping existing graph with {} nodes.",
                existing
            )));
            Ok(false)
        }
        ReloadMode::Continue => {
            info!(existing, "Adding to existing graph.");
            Ok(true)
        }
    }
}

fn load_proteins<R: ProteinRepository + ?Sized>(
    repository: &R,
    limit: Option<usize>,
    reporter: &ProgressReporter,
) -> Result<Vec<ProteinRecord>, EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Loading Proteins",
    });
    let proteins = repository.list_proteins_with_domains(limit)?;
    if proteins.is_empty() {
        return Err(EngineError::PhaseFailed {
            phase: "load",
            reason: "no proteins with domain annotations".to_string(),
        });
    }
    info!(count = proteins.len(), ?limit, "Loaded proteins with domains.");
    reporter.report(Progress::PhaseFinish);
    Ok(proteins)
}

fn create_nodes<G: GraphStore + ?Sized>(
    graph: &G,
    proteins: &[ProteinRecord],
    config: &PipelineConfig,
    reporter: &ProgressReporter,
    report: &mut GraphBuildReport,
) -> Result<(), EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Creating Nodes",
    });
    for batch in proteins.chunks(config.graph.node_batch_size) {
        report.nodes_created +=
            absorb(graph.create_nodes(batch), "nodes", &mut report.failed_batches)?;
    }
    info!(nodes = report.nodes_created, "Protein nodes written.");
    reporter.report(Progress::PhaseFinish);
    Ok(())
}

fn create_edges<G: GraphStore + ?Sized>(
    graph: &G,
    proteins: &[ProteinRecord],
    config: &PipelineConfig,
    reporter: &ProgressReporter,
    cancel: &CancellationToken,
    report: &mut GraphBuildReport,
) -> Result<(), EngineError> {
    reporter.report(Progress::PhaseStart {
        name: "Comparing Proteins",
    });
    let scan = PairwiseScan::new(proteins, config.graph.similarity_threshold)
        .with_block_size(config.graph.progress_interval);
    report.total_pairs = scan.total_pairs();
    info!(
        proteins = scan.node_count(),
        pairs = report.total_pairs,
        threshold = config.graph.similarity_threshold,
        "Starting pairwise comparison."
    );
    reporter.report(Progress::TaskStart {
        total_steps: report.total_pairs,
    });

    let mut batcher = Batcher::new(config.graph.edge_batch_size);
    for block in scan.blocks() {
        report.comparisons = block.processed;
        report.edges_found += block.edges.len();
        for batch in batcher.extend(block.edges) {
            report.edges_created +=
                absorb(graph.create_edges(&batch), "edges", &mut report.failed_batches)?;
        }
        reporter.report(Progress::Comparisons {
            processed: report.comparisons,
            total: report.total_pairs,
            edges: report.edges_found as u64,
        });
        if report.comparisons < report.total_pairs && cancel.is_cancelled() {
            warn!(
                processed = report.comparisons,
                total = report.total_pairs,
                "Comparison cancelled; flushing pending edges."
            );
            report.cancelled = true;
            break;
        }
    }
    if let Some(batch) = batcher.finish() {
        report.edges_created +=
            absorb(graph.create_edges(&batch), "edges", &mut report.failed_batches)?;
    }

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    Ok(())
}

/// Counts what a bulk write stored. A partial batch is logged and counted as a
/// failed batch; any other store error ends the phase.
pub(crate) fn absorb(
    result: Result<usize, StoreError>,
    what: &'static str,
    failed_batches: &mut usize,
) -> Result<usize, EngineError> {
    match result {
        Ok(written) => Ok(written),
        Err(StoreError::PartialBatch {
            attempted,
            written,
            message,
            ..
        }) => {
            warn!(what, attempted, written, "Partial batch write: {}", message);
            *failed_batches += 1;
            Ok(written)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::edge::{Neighbor, SimilarityEdge};
    use crate::core::models::prediction::Prediction;
    use crate::store::memory::{MemoryGraphStore, MemoryProteinRepository};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn protein(id: &str, domains: &[&str], labels: &[&str]) -> ProteinRecord {
        ProteinRecord::new(id, domains.iter().copied(), labels.iter().copied())
    }

    fn repository() -> MemoryProteinRepository {
        MemoryProteinRepository::new(vec![
            protein("P1", &["IPR001", "IPR002", "IPR003", "IPR004"], &["1.1.1.1"]),
            protein("P2", &["IPR001", "IPR003", "IPR005"], &[]),
            protein("P3", &["IPR009"], &[]),
            protein("P4", &["IPR001", "IPR002"], &["2.7.11.1"]),
            protein("P5", &[], &["3.1.1.1"]),
        ])
    }

    fn config() -> PipelineConfig {
        PipelineConfig::default()
    }

    #[test]
    fn builds_nodes_and_thresholded_edges() {
        let graph = MemoryGraphStore::new();
        let report = run(
            &repository(),
            &graph,
            &config(),
            &ProgressReporter::new(),
            &CancellationToken::new(),
        )
        .unwrap();

        assert_eq!(report.proteins_loaded, 4);
        assert_eq!(report.nodes_created, 4);
        assert_eq!(report.labeled_nodes, 2);
        assert_eq!(report.unlabeled_nodes, 2);
        assert_eq!(report.total_pairs, 6);
        assert_eq!(report.comparisons, 6);
        // P1-P2 0.4, P1-P4 0.5, P2-P4 0.25
        assert_eq!(report.edges_found, 3);
        assert_eq!(report.edges_created, 3);
        assert!(report.is_complete());
        assert!((report.average_degree() - 1.5).abs() < 1e-12);
        assert_eq!(graph.edges().unwrap()[0].weight(), 0.4);
    }

    #[test]
    fn batch_sizes_do_not_change_the_graph() {
        let reference = MemoryGraphStore::new();
        let reporter = ProgressReporter::new();
        let cancel = CancellationToken::new();
        run(&repository(), &reference, &config(), &reporter, &cancel).unwrap();

        let mut small = config();
        small.graph.edge_batch_size = 1;
        small.graph.node_batch_size = 1;
        small.graph.progress_interval = 1;
        let graph = MemoryGraphStore::new();
        run(&repository(), &graph, &small, &reporter, &cancel).unwrap();
        assert_eq!(graph.edges().unwrap(), reference.edges().unwrap());
    }

    #[test]
    fn protein_limit_restricts_the_load() {
        let graph = MemoryGraphStore::new();
        let mut limited = config();
        limited.protein_limit = Some(2);
        let report = run(
            &repository(),
            &graph,
            &limited,
            &ProgressReporter::new(),
            &CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(report.proteins_loaded, 2);
        assert_eq!(report.total_pairs, 1);
    }

    #[test]
    fn empty_repository_fails_the_load_phase() {
        let result = run(
            &MemoryProteinRepository::new(Vec::new()),
            &MemoryGraphStore::new(),
            &config(),
            &ProgressReporter::new(),
            &CancellationToken::new(),
        );
        assert!(matches!(
            result,
            Err(EngineError::PhaseFailed { phase: "load", .. })
        ));
    }

    #[test]
    fn reload_modes_control_an_existing_graph() {
        let graph = MemoryGraphStore::new();
        graph
            .create_nodes(&[protein("OLD", &["IPR777"], &[])])
            .unwrap();
        let reporter = ProgressReporter::new();
        let cancel = CancellationToken::new();

        let mut skip = config();
        skip.reload_mode = ReloadMode::Skip;
        let report = run(&repository(), &graph, &skip, &reporter, &cancel).unwrap();
        assert!(report.skipped);
        assert_eq!(graph.count_nodes().unwrap(), 1);

        let mut keep = config();
        keep.reload_mode = ReloadMode::Continue;
        run(&repository(), &graph, &keep, &reporter, &cancel).unwrap();
        assert_eq!(graph.count_nodes().unwrap(), 5);

        let mut clear = config();
        clear.reload_mode = ReloadMode::Clear;
        run(&repository(), &graph, &clear, &reporter, &cancel).unwrap();
        assert_eq!(graph.count_nodes().unwrap(), 4);
    }

    #[test]
    fn cancellation_stops_after_the_current_block() {
        let graph = MemoryGraphStore::new();
        let mut per_pair = config();
        per_pair.graph.progress_interval = 1;
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        let blocks = AtomicUsize::new(0);
        let reporter = ProgressReporter::with_callback(Box::new(move |event| {
            if let Progress::Comparisons { .. } = event {
                if blocks.fetch_add(1, Ordering::SeqCst) == 1 {
                    trigger.cancel();
                }
            }
        }));

        let report = run(&repository(), &graph, &per_pair, &reporter, &cancel).unwrap();
        assert!(report.cancelled);
        assert!(!report.is_complete());
        assert_eq!(report.comparisons, 2);
        assert_eq!(report.edges_created, report.edges_found);
        assert_eq!(graph.edge_count().unwrap(), report.edges_created);
    }

    #[test]
    fn progress_reports_every_block() {
        let graph = MemoryGraphStore::new();
        let mut config = config();
        config.graph.progress_interval = 4;
        let seen = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            if let Progress::Comparisons {
                processed, total, ..
            } = event
            {
                seen.lock().unwrap().push((processed, total));
            }
        }));
        run(&repository(), &graph, &config, &reporter, &CancellationToken::new()).unwrap();
        drop(reporter);
        assert_eq!(seen.into_inner().unwrap(), vec![(4, 6), (6, 6)]);
    }

    #[derive(Default)]
    struct RecordingNodes {
        inner: MemoryGraphStore,
        node_batches: Mutex<Vec<Vec<String>>>,
    }

    impl GraphStore for RecordingNodes {
        fn create_nodes(&self, proteins: &[ProteinRecord]) -> Result<usize, StoreError> {
            self.node_batches
                .lock()
                .unwrap()
                .push(proteins.iter().map(|p| p.id().to_string()).collect());
            self.inner.create_nodes(proteins)
        }
        fn create_edges(&self, edges: &[SimilarityEdge]) -> Result<usize, StoreError> {
            self.inner.create_edges(edges)
        }
        fn neighbors(&self, id: &str, min_weight: f64) -> Result<Vec<Neighbor>, StoreError> {
            self.inner.neighbors(id, min_weight)
        }
        fn count_nodes(&self) -> Result<usize, StoreError> {
            self.inner.count_nodes()
        }
        fn unlabeled_node_ids(&self) -> Result<Vec<String>, StoreError> {
            self.inner.unlabeled_node_ids()
        }
        fn annotate_predictions(&self, predictions: &[Prediction]) -> Result<usize, StoreError> {
            self.inner.annotate_predictions(predictions)
        }
        fn clear(&self) -> Result<(), StoreError> {
            self.inner.clear()
        }
    }

    #[test]
    fn nodes_are_written_in_batches_of_the_configured_size() {
        let graph = RecordingNodes::default();
        let mut config = config();
        config.graph.node_batch_size = 3;
        let report = run(
            &repository(),
            &graph,
            &config,
            &ProgressReporter::new(),
            &CancellationToken::new(),
        )
        .unwrap();

        let batches = graph.node_batches.into_inner().unwrap();
        let sizes: Vec<_> = batches.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 1]);
        assert_eq!(batches.concat(), vec!["P1", "P2", "P3", "P4"]);
        assert_eq!(report.nodes_created, 4);
    }

    struct Unreachable;

    impl GraphStore for Unreachable {
        fn create_nodes(&self, _: &[ProteinRecord]) -> Result<usize, StoreError> {
            Err(StoreError::Connectivity {
                store: "graph",
                message: "connection refused".to_string(),
            })
        }
        fn create_edges(&self, _: &[SimilarityEdge]) -> Result<usize, StoreError> {
            Ok(0)
        }
        fn neighbors(&self, _: &str, _: f64) -> Result<Vec<Neighbor>, StoreError> {
            Ok(Vec::new())
        }
        fn count_nodes(&self) -> Result<usize, StoreError> {
            Ok(0)
        }
        fn unlabeled_node_ids(&self) -> Result<Vec<String>, StoreError> {
            Ok(Vec::new())
        }
        fn annotate_predictions(&self, _: &[Prediction]) -> Result<usize, StoreError> {
            Ok(0)
        }
        fn clear(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[test]
    fn connectivity_failures_abort_the_build() {
        let result = run(
            &repository(),
            &Unreachable,
            &config(),
            &ProgressReporter::new(),
            &CancellationToken::new(),
        );
        assert!(matches!(result, Err(EngineError::Store { .. })));
    }

    #[test]
    fn absorb_counts_partial_batches() {
        let mut failed = 0;
        let partial = Err(StoreError::PartialBatch {
            store: "graph",
            attempted: 3,
            written: 2,
            message: "unknown endpoint".to_string(),
        });
        assert_eq!(absorb(partial, "edges", &mut failed).unwrap(), 2);
        assert_eq!(failed, 1);
        assert_eq!(absorb(Ok(5), "edges", &mut failed).unwrap(), 5);
        assert_eq!(failed, 1);
    }
}
