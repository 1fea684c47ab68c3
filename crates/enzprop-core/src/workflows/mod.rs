//! # Workflows Module
//!
//! High-level procedures that drive the engine against the collaborator
//! traits in [`crate::store`]. Each workflow validates its configuration,
//! reports progress through a [`crate::engine::progress::ProgressReporter`],
//! honors a [`crate::engine::cancel::CancellationToken`] between blocks of work
//! and returns an immutable report.
//!
//! - **Graph Build** ([`build_graph`]) - Loads proteins, writes nodes, scans all
//!   pairs and writes the edges that clear the similarity threshold.
//! - **Propagation** ([`propagate`]) - Votes labels onto unlabeled nodes and
//!   stores the resulting predictions.
//! - **Pipeline** ([`pipeline`]) - Both of the above, in order.

pub mod build_graph;
pub mod pipeline;
pub mod propagate;
