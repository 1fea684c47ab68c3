use crate::core::models::protein::{ProteinMetadata, ProteinRecord};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

const LIST_SEPARATOR: char = ';';

/// Errors that abort a load. Problems confined to a single row never do;
/// they are counted in [`LoadReport::skipped`] instead.
#[derive(Debug, Error)]
pub enum TsvError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to read table header: {0}")]
    Header(csv::Error),
    #[error("Failed to read table: {0}")]
    Read(csv::Error),
}

/// Why a single row was left out of the load.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RowError {
    #[error("row has no protein identifier")]
    MissingIdentifier,
    #[error("duplicate protein identifier '{0}'")]
    DuplicateIdentifier(String),
    #[error("malformed row: {0}")]
    Malformed(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub rows_read: usize,
    pub loaded: usize,
    pub with_labels: usize,
    pub with_domains: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Default)]
pub struct LoadOutcome {
    pub proteins: Vec<ProteinRecord>,
    pub report: LoadReport,
}

#[derive(Debug, Deserialize)]
struct TsvRow {
    #[serde(rename = "Entry", default)]
    entry: String,
    #[serde(rename = "Entry Name", default)]
    entry_name: String,
    #[serde(rename = "Protein names", default)]
    protein_names: String,
    #[serde(rename = "Organism", default)]
    organism: String,
    #[serde(rename = "Sequence", default)]
    sequence: String,
    #[serde(rename = "EC number", default)]
    ec_number: String,
    #[serde(rename = "InterPro", default)]
    interpro: String,
}

/// Reads a UniProt-style tab-separated protein table.
///
/// Recognised columns are `Entry`, `Entry Name`, `Protein names`, `Organism`,
/// `Sequence`, `EC number` and `InterPro`; the two list columns are
/// `;`-separated and only trimmed. Rows without an identifier, with a duplicate
/// identifier, or with the wrong number of fields are skipped and counted, and
/// the load carries on.
pub fn read_proteins<R: Read>(reader: R) -> Result<LoadOutcome, TsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .has_headers(true)
        .from_reader(reader);
    let headers = reader.headers().map_err(TsvError::Header)?.clone();

    let mut outcome = LoadOutcome::default();
    let mut seen = HashSet::new();

    for result in reader.records() {
        outcome.report.rows_read += 1;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                if let csv::ErrorKind::Io(_) = e.kind() {
                    return Err(TsvError::Read(e));
                }
                let line = e.position().map_or(0, |p| p.line());
                skip(&mut outcome.report, line, &RowError::Malformed(e.to_string()));
                continue;
            }
        };
        let line = record.position().map_or(0, |p| p.line());

        let parsed = record
            .deserialize::<TsvRow>(Some(&headers))
            .map_err(|e| RowError::Malformed(e.to_string()))
            .and_then(|row| protein_from_row(row, &seen));

        match parsed {
            Ok(protein) => {
                seen.insert(protein.id().to_string());
                if protein.is_labeled() {
                    outcome.report.with_labels += 1;
                }
                if protein.has_domains() {
                    outcome.report.with_domains += 1;
                }
                outcome.report.loaded += 1;
                outcome.proteins.push(protein);
            }
            Err(e) => skip(&mut outcome.report, line, &e),
        }
    }

    info!(
        rows = outcome.report.rows_read,
        loaded = outcome.report.loaded,
        labeled = outcome.report.with_labels,
        with_domains = outcome.report.with_domains,
        skipped = outcome.report.skipped,
        "Protein table loaded."
    );
    Ok(outcome)
}

pub fn read_proteins_from_path<P: AsRef<Path>>(path: P) -> Result<LoadOutcome, TsvError> {
    debug!("Reading protein table from {:?}", path.as_ref());
    let file = File::open(path)?;
    read_proteins(io::BufReader::new(file))
}

fn skip(report: &mut LoadReport, line: u64, error: &RowError) {
    report.skipped += 1;
    warn!(line, "Skipping protein row: {}", error);
}

fn protein_from_row(row: TsvRow, seen: &HashSet<String>) -> Result<ProteinRecord, RowError> {
    let id = row.entry.trim();
    if id.is_empty() {
        return Err(RowError::MissingIdentifier);
    }
    if seen.contains(id) {
        return Err(RowError::DuplicateIdentifier(id.to_string()));
    }

    let domains = split_list(&row.interpro);
    let labels = split_list(&row.ec_number);
    let sequence = row.sequence.trim();

    let metadata = ProteinMetadata {
        entry_name: non_empty(&row.entry_name),
        name: non_empty(&row.protein_names),
        organism: non_empty(&row.organism),
        sequence_length: sequence.len(),
    };

    Ok(ProteinRecord::new(id, domains, labels).with_metadata(metadata))
}

/// Splits a `;`-separated list, trimming items and dropping empty ones.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
