//! Collaborator boundaries.
//!
//! The engine never talks to a database directly. Protein records come from a
//! [`ProteinRepository`], the similarity graph lives behind a [`GraphStore`] and
//! results go to a [`PredictionStore`]. All three are queried through `&self`
//! and must be `Send + Sync`, so the voting phase can read the graph from many
//! worker threads at once.
//!
//! [`memory`] provides in-process implementations; [`retry::Retrying`] wraps
//! any of them with bounded retries on connectivity failures.

pub mod memory;
pub mod retry;

use crate::core::models::edge::{Neighbor, SimilarityEdge};
use crate::core::models::prediction::Prediction;
use crate::core::models::protein::ProteinRecord;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{store} store is unreachable: {message}")]
    Connectivity {
        store: &'static str,
        message: String,
    },

    #[error("{store} store wrote {written} of {attempted} records: {message}")]
    PartialBatch {
        store: &'static str,
        attempted: usize,
        written: usize,
        message: String,
    },
}

impl StoreError {
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Connectivity { .. })
    }
}

pub trait ProteinRepository: Send + Sync {
    /// Proteins with at least one domain, up to `limit` records.
    fn list_proteins_with_domains(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<ProteinRecord>, StoreError>;

    fn protein(&self, id: &str) -> Result<Option<ProteinRecord>, StoreError>;
}

pub trait GraphStore: Send + Sync {
    /// Creates or updates one node per protein. Returns the number written.
    fn create_nodes(&self, proteins: &[ProteinRecord]) -> Result<usize, StoreError>;

    /// Creates edges between existing nodes. Returns the number written.
    ///
    /// An edge whose pair is already connected is left as it is.
    fn create_edges(&self, edges: &[SimilarityEdge]) -> Result<usize, StoreError>;

    /// Neighbors of `id` over edges with weight at or above `min_weight`,
    /// carrying the labels each neighbor was loaded with.
    fn neighbors(&self, id: &str, min_weight: f64) -> Result<Vec<Neighbor>, StoreError>;

    fn count_nodes(&self) -> Result<usize, StoreError>;

    /// Ids of nodes without labels, in ascending order.
    fn unlabeled_node_ids(&self) -> Result<Vec<String>, StoreError>;

    /// Records predicted labels on their nodes without touching the loaded labels.
    fn annotate_predictions(&self, predictions: &[Prediction]) -> Result<usize, StoreError>;

    fn clear(&self) -> Result<(), StoreError>;
}

pub trait PredictionStore: Send + Sync {
    /// Inserts or replaces predictions keyed by protein id.
    fn upsert_predictions(&self, predictions: &[Prediction]) -> Result<usize, StoreError>;

    fn prediction(&self, protein_id: &str) -> Result<Option<Prediction>, StoreError>;

    fn count(&self) -> Result<usize, StoreError>;
}
