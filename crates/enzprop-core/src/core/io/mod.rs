//! Flat-file input and output.
//!
//! [`tsv`] reads UniProt-style protein tables into [`ProteinRecord`]s, skipping and
//! counting rows it cannot use. [`export`] writes and reads the two artefacts a run
//! produces: the similarity edge list and the prediction table, both as CSV.
//!
//! [`ProteinRecord`]: crate::core::models::protein::ProteinRecord

pub mod export;
pub mod tsv;
