use super::{GraphStore, PredictionStore, ProteinRepository, StoreError};
use crate::core::graph::SimilarityGraph;
use crate::core::models::edge::{Neighbor, SimilarityEdge};
use crate::core::models::prediction::Prediction;
use crate::core::models::protein::{ProteinMetadata, ProteinRecord};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

fn poisoned(store: &'static str) -> StoreError {
    StoreError::Connectivity {
        store,
        message: "lock poisoned by a panicked writer".to_string(),
    }
}

#[derive(Debug, Default)]
pub struct MemoryProteinRepository {
    proteins: BTreeMap<String, ProteinRecord>,
}

impl MemoryProteinRepository {
    /// Builds a repository, keeping the first record for each id.
    pub fn new(proteins: impl IntoIterator<Item = ProteinRecord>) -> Self {
        let mut map = BTreeMap::new();
        for protein in proteins {
            if map.contains_key(protein.id()) {
                warn!(id = protein.id(), "Ignoring duplicate protein record.");
                continue;
            }
            map.insert(protein.id().to_string(), protein);
        }
        Self { proteins: map }
    }

    pub fn len(&self) -> usize {
        self.proteins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proteins.is_empty()
    }
}

impl ProteinRepository for MemoryProteinRepository {
    fn list_proteins_with_domains(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<ProteinRecord>, StoreError> {
        Ok(self
            .proteins
            .values()
            .filter(|p| p.has_domains())
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    fn protein(&self, id: &str) -> Result<Option<ProteinRecord>, StoreError> {
        Ok(self.proteins.get(id).cloned())
    }
}

#[derive(Debug, Clone, Default)]
struct NodeEntry {
    labels: BTreeSet<String>,
    metadata: ProteinMetadata,
    predicted: Option<Prediction>,
}

#[derive(Debug, Default)]
struct GraphState {
    nodes: HashMap<String, NodeEntry>,
    graph: SimilarityGraph,
}

/// A [`GraphStore`] backed by an in-process [`SimilarityGraph`].
#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    state: RwLock<GraphState>,
}

impl MemoryGraphStore {
    const NAME: &'static str = "graph";

    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, GraphState>, StoreError> {
        self.state.read().map_err(|_| poisoned(Self::NAME))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, GraphState>, StoreError> {
        self.state.write().map_err(|_| poisoned(Self::NAME))
    }

    /// All stored edges in canonical order.
    pub fn edges(&self) -> Result<Vec<SimilarityEdge>, StoreError> {
        Ok(self.read()?.graph.edges())
    }

    pub fn edge_count(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.graph.edge_count())
    }

    pub fn average_degree(&self) -> Result<f64, StoreError> {
        Ok(self.read()?.graph.average_degree())
    }

    /// The prediction annotated on node `id`, if any.
    pub fn annotation(&self, id: &str) -> Result<Option<Prediction>, StoreError> {
        Ok(self
            .read()?
            .nodes
            .get(id)
            .and_then(|node| node.predicted.clone()))
    }

    pub fn metadata(&self, id: &str) -> Result<Option<ProteinMetadata>, StoreError> {
        Ok(self.read()?.nodes.get(id).map(|node| node.metadata.clone()))
    }
}

impl GraphStore for MemoryGraphStore {
    fn create_nodes(&self, proteins: &[ProteinRecord]) -> Result<usize, StoreError> {
        let mut state = self.write()?;
        for protein in proteins {
            state.graph.insert_node(protein.id());
            let node = state.nodes.entry(protein.id().to_string()).or_default();
            node.labels = protein.labels().clone();
            node.metadata = protein.metadata().clone();
        }
        Ok(proteins.len())
    }

    fn create_edges(&self, edges: &[SimilarityEdge]) -> Result<usize, StoreError> {
        let mut state = self.write()?;
        let mut written = 0;
        let mut missing = Vec::new();
        for edge in edges {
            let (a, b) = edge.key();
            if !state.nodes.contains_key(a) || !state.nodes.contains_key(b) {
                missing.push(edge.to_string());
                continue;
            }
            state.graph.insert_edge(edge);
            written += 1;
        }
        debug!(attempted = edges.len(), written, "Edge batch applied.");

        if missing.is_empty() {
            Ok(written)
        } else {
            Err(StoreError::PartialBatch {
                store: Self::NAME,
                attempted: edges.len(),
                written,
                message: format!("unknown endpoints for {}", missing.join(", ")),
            })
        }
    }

    fn neighbors(&self, id: &str, min_weight: f64) -> Result<Vec<Neighbor>, StoreError> {
        let state = self.read()?;
        Ok(state
            .graph
            .neighbors(id)
            .filter(|&(_, weight)| weight >= min_weight)
            .map(|(other, weight)| Neighbor {
                id: other.to_string(),
                weight,
                labels: state
                    .nodes
                    .get(other)
                    .map(|node| node.labels.clone())
                    .unwrap_or_default(),
            })
            .collect())
    }

    fn count_nodes(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.nodes.len())
    }

    fn unlabeled_node_ids(&self) -> Result<Vec<String>, StoreError> {
        let mut ids: Vec<String> = self
            .read()?
            .nodes
            .iter()
            .filter(|(_, node)| node.labels.is_empty())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }

    fn annotate_predictions(&self, predictions: &[Prediction]) -> Result<usize, StoreError> {
        let mut state = self.write()?;
        let mut written = 0;
        let mut missing = Vec::new();
        for prediction in predictions {
            match state.nodes.get_mut(prediction.protein_id()) {
                Some(node) => {
                    node.predicted = Some(prediction.clone());
                    written += 1;
                }
                None => missing.push(prediction.protein_id().to_string()),
            }
        }
        if missing.is_empty() {
            Ok(written)
        } else {
            Err(StoreError::PartialBatch {
                store: Self::NAME,
                attempted: predictions.len(),
                written,
                message: format!("unknown nodes {}", missing.join(", ")),
            })
        }
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.nodes.clear();
        state.graph.clear();
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryPredictionStore {
    predictions: RwLock<BTreeMap<String, Prediction>>,
}

impl MemoryPredictionStore {
    const NAME: &'static str = "prediction";

    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored prediction ordered by protein id.
    pub fn all(&self) -> Result<Vec<Prediction>, StoreError> {
        Ok(self
            .predictions
            .read()
            .map_err(|_| poisoned(Self::NAME))?
            .values()
            .cloned()
            .collect())
    }
}

impl PredictionStore for MemoryPredictionStore {
    fn upsert_predictions(&self, predictions: &[Prediction]) -> Result<usize, StoreError> {
        let mut map = self.predictions.write().map_err(|_| poisoned(Self::NAME))?;
        for prediction in predictions {
            map.insert(prediction.protein_id().to_string(), prediction.clone());
        }
        Ok(predictions.len())
    }

    fn prediction(&self, protein_id: &str) -> Result<Option<Prediction>, StoreError> {
        Ok(self
            .predictions
            .read()
            .map_err(|_| poisoned(Self::NAME))?
            .get(protein_id)
            .cloned())
    }

    fn count(&self) -> Result<usize, StoreError> {
        Ok(self
            .predictions
            .read()
            .map_err(|_| poisoned(Self::NAME))?
            .len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::prediction::ScoredLabel;

    fn protein(id: &str, labels: &[&str]) -> ProteinRecord {
        ProteinRecord::new(id, ["IPR000001"], labels.iter().copied())
    }

    fn edge(a: &str, b: &str, w: f64) -> SimilarityEdge {
        SimilarityEdge::new(a, b, w).unwrap()
    }

    fn prediction(id: &str, label: &str, confidence: f64) -> Prediction {
        Prediction::new(id, vec![ScoredLabel::new(label, confidence)]).unwrap()
    }

    #[test]
    fn repository_filters_domainless_records_and_applies_limit() {
        let repository = MemoryProteinRepository::new(vec![
            protein("P3", &[]),
            ProteinRecord::new("P2", Vec::<String>::new(), ["1.1.1.1"]),
            protein("P1", &["1.1.1.1"]),
        ]);
        let all = repository.list_proteins_with_domains(None).unwrap();
        assert_eq!(all.iter().map(|p| p.id()).collect::<Vec<_>>(), vec!["P1", "P3"]);
        assert_eq!(repository.list_proteins_with_domains(Some(1)).unwrap().len(), 1);
        assert!(repository.protein("P2").unwrap().is_some());
        assert!(repository.protein("P9").unwrap().is_none());
    }

    #[test]
    fn neighbors_are_symmetric_and_filtered_by_weight() {
        let store = MemoryGraphStore::new();
        store
            .create_nodes(&[protein("A", &["1.1.1.1"]), protein("B", &[]), protein("C", &[])])
            .unwrap();
        store
            .create_edges(&[edge("A", "B", 0.5), edge("B", "C", 0.05)])
            .unwrap();

        let from_b = store.neighbors("B", 0.1).unwrap();
        assert_eq!(from_b.len(), 1);
        assert_eq!(from_b[0].id, "A");
        assert!(from_b[0].is_labeled());

        let from_a = store.neighbors("A", 0.0).unwrap();
        assert_eq!(from_a[0].id, "B");
        assert_eq!(from_a[0].weight, 0.5);
        assert!(store.neighbors("missing", 0.0).unwrap().is_empty());
    }

    #[test]
    fn edge_upsert_is_idempotent_per_pair() {
        let store = MemoryGraphStore::new();
        store.create_nodes(&[protein("A", &[]), protein("B", &[])]).unwrap();
        store.create_edges(&[edge("A", "B", 0.5)]).unwrap();
        store.create_edges(&[edge("B", "A", 0.7)]).unwrap();
        assert_eq!(store.edge_count().unwrap(), 1);
        assert_eq!(store.edges().unwrap()[0].weight(), 0.5);
    }

    #[test]
    fn edges_to_unknown_nodes_fail_partially() {
        let store = MemoryGraphStore::new();
        store.create_nodes(&[protein("A", &[]), protein("B", &[])]).unwrap();
        let result = store.create_edges(&[edge("A", "B", 0.5), edge("A", "Z", 0.5)]);
        assert!(matches!(
            result,
            Err(StoreError::PartialBatch {
                attempted: 2,
                written: 1,
                ..
            })
        ));
        assert_eq!(store.edge_count().unwrap(), 1);
    }

    #[test]
    fn unlabeled_ids_are_sorted_and_annotations_keep_loaded_labels() {
        let store = MemoryGraphStore::new();
        store
            .create_nodes(&[protein("U2", &[]), protein("L1", &["2.7.1.1"]), protein("U1", &[])])
            .unwrap();
        store.create_edges(&[edge("U1", "L1", 0.9)]).unwrap();
        assert_eq!(store.unlabeled_node_ids().unwrap(), vec!["U1", "U2"]);

        store
            .annotate_predictions(&[prediction("U1", "2.7.1.1", 1.0)])
            .unwrap();
        assert!(store.annotation("U1").unwrap().is_some());
        assert_eq!(store.unlabeled_node_ids().unwrap(), vec!["U1", "U2"]);
        assert!(!store.neighbors("L1", 0.0).unwrap()[0].is_labeled());
    }

    #[test]
    fn clear_empties_the_graph() {
        let store = MemoryGraphStore::new();
        store.create_nodes(&[protein("A", &[]), protein("B", &[])]).unwrap();
        store.create_edges(&[edge("A", "B", 0.5)]).unwrap();
        store.clear().unwrap();
        assert_eq!(store.count_nodes().unwrap(), 0);
        assert_eq!(store.edge_count().unwrap(), 0);
    }

    #[test]
    fn prediction_upsert_replaces_by_protein_id() {
        let store = MemoryPredictionStore::new();
        store
            .upsert_predictions(&[prediction("U1", "1.1.1.1", 0.5)])
            .unwrap();
        store
            .upsert_predictions(&[prediction("U1", "3.2.1.1", 0.9)])
            .unwrap();
        assert_eq!(store.count().unwrap(), 1);
        let stored = store.prediction("U1").unwrap().unwrap();
        assert_eq!(stored.predicted_labels(), vec!["3.2.1.1"]);
        assert!(store.prediction("U2").unwrap().is_none());
    }
}
