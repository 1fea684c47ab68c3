//! Single-pass weighted label voting.
//!
//! For an unlabeled protein `u`, every labeled neighbor `v` reached over an
//! edge with weight `w >= min_edge_weight` adds `w` to the accumulator of each
//! label it carries, and adds `w` once to the total. The vote for a label is
//! its accumulator divided by the total. Votes at or above the confidence
//! threshold are kept, ranked by vote (descending, ties by label), and
//! truncated to the configured maximum.
//!
//! Neighbors are folded in ascending id order so the floating-point sums, and
//! therefore the emitted confidences, are identical across runs and thread
//! counts.

use crate::core::models::edge::Neighbor;
use crate::core::models::prediction::{Prediction, ScoredLabel};
use crate::engine::config::PropagationConfig;
use crate::store::{GraphStore, StoreError};
use std::collections::BTreeMap;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Accumulated label weights for one protein.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelVotes {
    accumulated: BTreeMap<String, f64>,
    total_weight: f64,
    voters: usize,
}

impl LabelVotes {
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Number of distinct neighbors that voted.
    pub fn voters(&self) -> usize {
        self.voters
    }

    pub fn is_empty(&self) -> bool {
        self.voters == 0 || self.total_weight <= 0.0
    }

    /// Normalized votes in label order.
    pub fn votes(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.accumulated
            .iter()
            .filter(|_| !self.is_empty())
            .map(|(label, &acc)| (label.as_str(), acc / self.total_weight))
    }
}

/// Folds the qualifying neighbors of `protein_id` into label votes.
///
/// A neighbor qualifies when it carries labels, is not the protein itself and
/// its edge weight is at least `min_edge_weight`. A neighbor listed more than
/// once counts once, with its heaviest edge.
pub fn tally(protein_id: &str, neighbors: &[Neighbor], min_edge_weight: f64) -> LabelVotes {
    let mut qualifying: Vec<&Neighbor> = neighbors
        .iter()
        .filter(|n| n.is_labeled() && n.id != protein_id && n.weight >= min_edge_weight)
        .collect();
    qualifying.sort_by(|a, b| a.id.cmp(&b.id).then(b.weight.total_cmp(&a.weight)));
    qualifying.dedup_by(|a, b| a.id == b.id);

    let mut votes = LabelVotes::default();
    for neighbor in qualifying {
        for label in &neighbor.labels {
            *votes.accumulated.entry(label.clone()).or_insert(0.0) += neighbor.weight;
        }
        votes.total_weight += neighbor.weight;
        votes.voters += 1;
    }
    votes
}

/// Keeps votes at or above `confidence_threshold`, best first, at most `max_labels`.
pub fn rank(votes: &LabelVotes, confidence_threshold: f64, max_labels: usize) -> Vec<ScoredLabel> {
    let mut kept: Vec<ScoredLabel> = votes
        .votes()
        .filter(|&(_, vote)| vote >= confidence_threshold)
        .map(|(label, vote)| ScoredLabel::new(label, vote))
        .collect();
    kept.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then_with(|| a.label.cmp(&b.label))
    });
    kept.truncate(max_labels);
    kept
}

/// Votes for `protein_id`. Returns `None` when no label survives ranking.
pub fn predict(
    protein_id: &str,
    neighbors: &[Neighbor],
    config: &PropagationConfig,
) -> Option<Prediction> {
    let votes = tally(protein_id, neighbors, config.min_edge_weight);
    Prediction::new(
        protein_id,
        rank(
            &votes,
            config.confidence_threshold,
            config.max_labels_per_protein,
        ),
    )
}

/// The outcome of voting over one block of candidates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoteBlock {
    pub predictions: Vec<Prediction>,
    /// Unlabeled nodes evaluated in this block.
    pub evaluated: usize,
    /// Evaluated nodes with at least one qualifying labeled neighbor.
    pub qualified: usize,
    /// Unlabeled nodes evaluated from the start of the run up to this block.
    pub processed: usize,
}

/// A propagation run over the unlabeled nodes of a graph store.
///
/// The candidate list is fixed at construction. Labels are read from the store
/// as loaded, so predictions emitted during the run never feed back into it.
pub struct Propagation<'a, S: GraphStore + ?Sized> {
    store: &'a S,
    config: &'a PropagationConfig,
    candidates: Vec<String>,
    block_size: usize,
}

impl<'a, S: GraphStore + ?Sized> Propagation<'a, S> {
    pub fn new(store: &'a S, config: &'a PropagationConfig) -> Result<Self, StoreError> {
        let mut candidates = store.unlabeled_node_ids()?;
        candidates.sort_unstable();
        candidates.dedup();
        debug!(candidates = candidates.len(), "Collected unlabeled nodes.");
        Ok(Self {
            store,
            config,
            candidates,
            block_size: config.batch_size.max(1),
        })
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Blocks in candidate order. Each call starts a fresh pass.
    pub fn blocks(&self) -> VoteBlocks<'_, 'a, S> {
        VoteBlocks {
            propagation: self,
            next: 0,
        }
    }

    pub fn into_predictions(self) -> impl Iterator<Item = Result<Prediction, StoreError>> + 'a
    where
        S: 'a,
    {
        let mut next = 0;
        std::iter::from_fn(move || {
            (next < self.candidates.len()).then(|| {
                let block = self.block_at(next);
                next = (next + self.block_size).min(self.candidates.len());
                match block {
                    Ok(block) => block.predictions.into_iter().map(Ok).collect::<Vec<_>>(),
                    Err(e) => {
                        next = self.candidates.len();
                        vec![Err(e)]
                    }
                }
            })
        })
        .flatten()
    }

    fn block_at(&self, start: usize) -> Result<VoteBlock, StoreError> {
        let end = (start + self.block_size).min(self.candidates.len());
        let ids = &self.candidates[start..end];

        #[cfg(not(feature = "parallel"))]
        let iterator = ids.iter();

        #[cfg(feature = "parallel")]
        let iterator = ids.par_iter();

        let outcomes: Vec<(bool, Option<Prediction>)> = iterator
            .map(|id| self.evaluate(id))
            .collect::<Result<_, _>>()?;

        let qualified = outcomes.iter().filter(|(q, _)| *q).count();
        Ok(VoteBlock {
            predictions: outcomes.into_iter().filter_map(|(_, p)| p).collect(),
            evaluated: end - start,
            qualified,
            processed: end,
        })
    }

    fn evaluate(&self, id: &str) -> Result<(bool, Option<Prediction>), StoreError> {
        let neighbors = self.store.neighbors(id, self.config.min_edge_weight)?;
        let votes = tally(id, &neighbors, self.config.min_edge_weight);
        if votes.is_empty() {
            return Ok((false, None));
        }
        let ranked = rank(
            &votes,
            self.config.confidence_threshold,
            self.config.max_labels_per_protein,
        );
        Ok((true, Prediction::new(id, ranked)))
    }
}

pub struct VoteBlocks<'p, 'a, S: GraphStore + ?Sized> {
    propagation: &'p Propagation<'a, S>,
    next: usize,
}

impl<S: GraphStore + ?Sized> Iterator for VoteBlocks<'_, '_, S> {
    type Item = Result<VoteBlock, StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        let total = self.propagation.candidates.len();
        if self.next >= total {
            return None;
        }
        let block = self.propagation.block_at(self.next);
        // A failed block ends the pass.
        self.next = match &block {
            Ok(block) => block.processed,
            Err(_) => total,
        };
        Some(block)
    }
}

/// Predictions for every unlabeled node of `store`, in ascending id order.
///
/// A store failure is yielded once and ends the sequence.
pub fn propagate<'a, S: GraphStore + ?Sized>(
    store: &'a S,
    config: &'a PropagationConfig,
) -> impl Iterator<Item = Result<Prediction, StoreError>> + 'a {
    let (propagation, failure) = match Propagation::new(store, config) {
        Ok(propagation) => (Some(propagation), None),
        Err(e) => (None, Some(Err(e))),
    };
    failure
        .into_iter()
        .chain(propagation.into_iter().flat_map(Propagation::into_predictions))
}
