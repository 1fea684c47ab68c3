use super::{GraphStore, PredictionStore, ProteinRepository, StoreError};
use crate::core::models::edge::{Neighbor, SimilarityEdge};
use crate::core::models::prediction::Prediction;
use crate::core::models::protein::ProteinRecord;
use crate::engine::config::RetryConfig;
use std::thread;
use tracing::warn;

/// Wraps a store and retries calls that fail with [`StoreError::Connectivity`].
///
/// Each call is attempted at most `max_attempts` times, sleeping
/// [`RetryConfig::delay_for`] between attempts. Partial batch failures are
/// returned as they are: the batch already reached the store.
#[derive(Debug)]
pub struct Retrying<S> {
    inner: S,
    config: RetryConfig,
}

impl<S> Retrying<S> {
    pub fn new(inner: S, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn call<T>(
        &self,
        operation: &'static str,
        f: impl Fn(&S) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut attempt = 1;
        loop {
            match f(&self.inner) {
                Err(e) if e.is_connectivity() && attempt < self.config.max_attempts => {
                    let delay = self.config.delay_for(attempt);
                    warn!(
                        operation,
                        attempt,
                        max_attempts = self.config.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Store call failed, retrying: {}",
                        e
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

impl<S: ProteinRepository> ProteinRepository for Retrying<S> {
    fn list_proteins_with_domains(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<ProteinRecord>, StoreError> {
        self.call("list_proteins_with_domains", |s| {
            s.list_proteins_with_domains(limit)
        })
    }

    fn protein(&self, id: &str) -> Result<Option<ProteinRecord>, StoreError> {
        self.call("protein", |s| s.protein(id))
    }
}

impl<S: GraphStore> GraphStore for Retrying<S> {
    fn create_nodes(&self, proteins: &[ProteinRecord]) -> Result<usize, StoreError> {
        self.call("create_nodes", |s| s.create_nodes(proteins))
    }

    fn create_edges(&self, edges: &[SimilarityEdge]) -> Result<usize, StoreError> {
        self.call("create_edges", |s| s.create_edges(edges))
    }

    fn neighbors(&self, id: &str, min_weight: f64) -> Result<Vec<Neighbor>, StoreError> {
        self.call("neighbors", |s| s.neighbors(id, min_weight))
    }

    fn count_nodes(&self) -> Result<usize, StoreError> {
        self.call("count_nodes", |s| s.count_nodes())
    }

    fn unlabeled_node_ids(&self) -> Result<Vec<String>, StoreError> {
        self.call("unlabeled_node_ids", |s| s.unlabeled_node_ids())
    }

    fn annotate_predictions(&self, predictions: &[Prediction]) -> Result<usize, StoreError> {
        self.call("annotate_predictions", |s| {
            s.annotate_predictions(predictions)
        })
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.call("clear", |s| s.clear())
    }
}

impl<S: PredictionStore> PredictionStore for Retrying<S> {
    fn upsert_predictions(&self, predictions: &[Prediction]) -> Result<usize, StoreError> {
        self.call("upsert_predictions", |s| s.upsert_predictions(predictions))
    }

    fn prediction(&self, protein_id: &str) -> Result<Option<Prediction>, StoreError> {
        self.call("prediction", |s| s.prediction(protein_id))
    }

    fn count(&self) -> Result<usize, StoreError> {
        self.call("count", |s| s.count())
    }
}
