//! All-pairs domain similarity scan.
//!
//! The `n(n-1)/2` unordered pairs of a protein set are laid out in a
//! triangular index space: pair `k` belongs to row `i` (the smaller index)
//! when `offset(i) <= k < offset(i + 1)`, with
//! `offset(i) = i * (2n - i - 1) / 2`. Proteins are sorted by id before
//! indexing, so row `i` always holds the lexicographically smaller endpoint
//! and every pair is visited exactly once.
//!
//! The space is walked in blocks of `block_size` pairs. Each block is split
//! into fixed-size chunks that are scanned in parallel and concatenated in
//! index order, so the emitted edge sequence never depends on the block size
//! or the number of threads.

use crate::core::models::edge::SimilarityEdge;
use crate::core::models::protein::ProteinRecord;
use crate::core::similarity::{DomainInterner, sorted_jaccard};
use crate::engine::config::GraphConfig;
use tracing::debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const CHUNK_PAIRS: u64 = 8_192;

/// The edges found in one block of the pair space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeBlock {
    pub edges: Vec<SimilarityEdge>,
    /// Pairs compared in this block.
    pub pairs: u64,
    /// Pairs compared from the start of the scan up to the end of this block.
    pub processed: u64,
}

#[derive(Debug, Clone)]
pub struct PairwiseScan {
    ids: Vec<String>,
    domains: Vec<Vec<u32>>,
    threshold: f64,
    block_size: u64,
}

impl PairwiseScan {
    /// Prepares a scan over `proteins`.
    ///
    /// Records are ordered by id; when an id occurs more than once only its
    /// first record takes part.
    pub fn new(proteins: &[ProteinRecord], threshold: f64) -> Self {
        let mut sorted: Vec<&ProteinRecord> = proteins.iter().collect();
        sorted.sort_by(|a, b| a.id().cmp(b.id()));
        sorted.dedup_by(|a, b| a.id() == b.id());

        let mut interner = DomainInterner::new();
        let domains = sorted
            .iter()
            .map(|p| interner.intern(p.domains().iter()))
            .collect();
        debug!(
            proteins = sorted.len(),
            distinct_domains = interner.len(),
            "Prepared pairwise scan."
        );

        Self {
            ids: sorted.iter().map(|p| p.id().to_string()).collect(),
            domains,
            threshold,
            block_size: GraphConfig::default().progress_interval,
        }
    }

    pub fn with_block_size(mut self, block_size: u64) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    pub fn node_count(&self) -> usize {
        self.ids.len()
    }

    pub fn total_pairs(&self) -> u64 {
        let n = self.ids.len() as u64;
        n * n.saturating_sub(1) / 2
    }

    /// Position `(i, j)` with `i < j` of pair `k` in the sorted protein order.
    pub fn pair_at(&self, k: u64) -> Option<(usize, usize)> {
        if k >= self.total_pairs() {
            return None;
        }
        let (mut lo, mut hi) = (0u64, self.ids.len() as u64 - 2);
        while lo < hi {
            let mid = (lo + hi).div_ceil(2);
            if self.row_offset(mid) <= k {
                lo = mid;
            } else {
                hi = mid - 1;
            }
        }
        let j = lo + 1 + (k - self.row_offset(lo));
        Some((lo as usize, j as usize))
    }

    /// Blocks in index order. Each call starts a fresh pass over the pair space.
    pub fn blocks(&self) -> Blocks<'_> {
        Blocks {
            scan: self,
            next: 0,
        }
    }

    pub fn edges(&self) -> impl Iterator<Item = SimilarityEdge> + '_ {
        self.blocks().flat_map(|block| block.edges)
    }

    pub fn into_edges(self) -> impl Iterator<Item = SimilarityEdge> {
        let total = self.total_pairs();
        let mut next = 0;
        std::iter::from_fn(move || {
            (next < total).then(|| {
                let block = self.block_at(next);
                next = block.processed;
                block.edges
            })
        })
        .flatten()
    }

    fn row_offset(&self, i: u64) -> u64 {
        let n = self.ids.len() as u64;
        i * (2 * n - i - 1) / 2
    }

    fn block_at(&self, start: u64) -> EdgeBlock {
        let end = start.saturating_add(self.block_size).min(self.total_pairs());
        let chunks: Vec<(u64, u64)> = (start..end)
            .step_by(CHUNK_PAIRS as usize)
            .map(|s| (s, (s + CHUNK_PAIRS).min(end)))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let iterator = chunks.iter();

        #[cfg(feature = "parallel")]
        let iterator = chunks.par_iter();

        let found: Vec<Vec<SimilarityEdge>> = iterator
            .map(|&(s, e)| self.scan_range(s, e))
            .collect();

        EdgeBlock {
            edges: found.into_iter().flatten().collect(),
            pairs: end - start,
            processed: end,
        }
    }

    fn scan_range(&self, start: u64, end: u64) -> Vec<SimilarityEdge> {
        let mut edges = Vec::new();
        let Some((mut i, mut j)) = self.pair_at(start) else {
            return edges;
        };
        let n = self.ids.len();
        for _ in start..end {
            let weight = sorted_jaccard(&self.domains[i], &self.domains[j]);
            if weight > 0.0 && weight >= self.threshold {
                edges.extend(SimilarityEdge::new(&self.ids[i], &self.ids[j], weight));
            }
            j += 1;
            if j == n {
                i += 1;
                j = i + 1;
            }
        }
        edges
    }
}

pub struct Blocks<'a> {
    scan: &'a PairwiseScan,
    next: u64,
}

impl Iterator for Blocks<'_> {
    type Item = EdgeBlock;

    fn next(&mut self) -> Option<EdgeBlock> {
        if self.next >= self.scan.total_pairs() {
            return None;
        }
        let block = self.scan.block_at(self.next);
        self.next = block.processed;
        Some(block)
    }
}

/// Every edge with weight at or above `threshold`, in canonical pair order.
pub fn compare_all(
    proteins: &[ProteinRecord],
    threshold: f64,
) -> impl Iterator<Item = SimilarityEdge> + use<> {
    PairwiseScan::new(proteins, threshold).into_edges()
}
