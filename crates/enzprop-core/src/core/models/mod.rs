//! # Core Models Module
//!
//! Data structures shared by graph construction and label propagation.
//!
//! ## Key Components
//!
//! - [`protein`] - Protein records with their domain and label sets
//! - [`edge`] - Canonically ordered similarity edges and neighbor views
//! - [`prediction`] - Ranked, confidence-scored label predictions
//!
//! All models are plain owned values. Records are never mutated once loaded, edges
//! carry the weight computed at creation time, and predictions are produced once
//! per run and handed to a store.

pub mod edge;
pub mod prediction;
pub mod protein;
