//! # Core Module
//!
//! Stateless building blocks shared by the engine and the workflows.
//!
//! ## Architecture
//!
//! - **Data Models** ([`models`]) - Protein records, similarity edges, neighbor views and predictions
//! - **Similarity** ([`similarity`]) - The Jaccard coefficient over domain sets and domain interning
//! - **Graph** ([`graph`]) - An in-memory undirected weighted adjacency structure
//! - **File I/O** ([`io`]) - Protein table loading and edge/prediction export
//!
//! Nothing in this module performs network I/O or holds run state; everything here is
//! safe to share across worker threads.

pub mod graph;
pub mod io;
pub mod models;
pub mod similarity;
