//! Computational units of the two pipeline phases.
//!
//! [`pairwise`] turns a protein set into similarity edges and [`voting`]
//! turns the persisted graph into label predictions. Both walk their work in
//! fixed-size blocks, parallelized with rayon under the `parallel` feature,
//! and both yield results in a deterministic order independent of how the
//! work was partitioned.

pub mod pairwise;
pub mod voting;
