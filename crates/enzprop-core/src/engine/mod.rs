//! # Engine Module
//!
//! The computational layer between the data models in [`crate::core`] and the
//! orchestration in [`crate::workflows`].
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Graph, propagation and retry parameters, with validation
//! - **Tasks** ([`tasks`]) - The pairwise similarity scan and the label voting pass
//! - **Batching** ([`batch`]) - Fixed-size grouping of results for bulk store writes
//! - **Progress Monitoring** ([`progress`]) - Progress events and the reporter callback
//! - **Cancellation** ([`cancel`]) - A shared stop flag checked between blocks of work
//! - **Error Handling** ([`error`]) - Engine-level errors wrapping config and store failures
//!
//! Tasks are pure with respect to their inputs: they read proteins or a graph
//! store and return results, leaving persistence and reporting to the
//! workflows.

pub mod batch;
pub mod cancel;
pub mod config;
pub mod error;
pub mod progress;
pub mod tasks;
