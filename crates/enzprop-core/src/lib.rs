//! # enzprop Core Library
//!
//! Infers enzyme function labels (EC numbers) for unannotated proteins from a
//! similarity network built on shared structural domains (InterPro entries).
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`ProteinRecord`,
//!   `SimilarityEdge`, `Prediction`), the Jaccard similarity measure, an
//!   in-memory similarity graph and TSV/CSV I/O.
//!
//! - **[`engine`]: The Logic Core.** Configuration, the block-parallel pairwise
//!   scan and the single-pass weighted voting task, plus progress reporting and
//!   cooperative cancellation.
//!
//! - **[`workflows`]: The Public API.** Complete procedures (building the graph,
//!   propagating labels, or both) that drive the engine against the collaborator
//!   traits in [`store`] and return an immutable report per phase.

pub mod core;
pub mod engine;
pub mod store;
pub mod workflows;
