use crate::core::io::tsv::split_list;
use crate::core::models::edge::SimilarityEdge;
use crate::core::models::prediction::{Prediction, ScoredLabel};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Invalid record on line {line}: {message}")]
    InvalidRecord { line: u64, message: String },
}

#[derive(Debug, Serialize, Deserialize)]
struct EdgeRow {
    source: String,
    target: String,
    weight: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct PredictionRow {
    protein_id: String,
    predicted_labels: String,
    confidences: String,
    mean_confidence: f64,
}

pub fn write_edges<'a, W, I>(writer: W, edges: I) -> Result<usize, ExportError>
where
    W: Write,
    I: IntoIterator<Item = &'a SimilarityEdge>,
{
    let mut writer = csv::Writer::from_writer(writer);
    let mut count = 0;
    for edge in edges {
        writer.serialize(EdgeRow {
            source: edge.source().to_string(),
            target: edge.target().to_string(),
            weight: edge.weight(),
        })?;
        count += 1;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(count)
}

pub fn read_edges<R: Read>(reader: R) -> Result<Vec<SimilarityEdge>, ExportError> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut edges = Vec::new();
    for result in reader.deserialize::<EdgeRow>() {
        let row = result?;
        let line = edges.len() as u64 + 2;
        if !(0.0..=1.0).contains(&row.weight) {
            return Err(ExportError::InvalidRecord {
                line,
                message: format!("weight {} is outside [0, 1]", row.weight),
            });
        }
        let edge = SimilarityEdge::new(row.source, row.target, row.weight).ok_or_else(|| {
            ExportError::InvalidRecord {
                line,
                message: "self-edge".to_string(),
            }
        })?;
        edges.push(edge);
    }
    Ok(edges)
}

pub fn read_edges_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<SimilarityEdge>, ExportError> {
    let file = std::fs::File::open(path).map_err(csv::Error::from)?;
    read_edges(std::io::BufReader::new(file))
}

pub fn write_predictions<'a, W, I>(writer: W, predictions: I) -> Result<usize, ExportError>
where
    W: Write,
    I: IntoIterator<Item = &'a Prediction>,
{
    let mut writer = csv::Writer::from_writer(writer);
    let mut count = 0;
    for prediction in predictions {
        writer.serialize(PredictionRow {
            protein_id: prediction.protein_id().to_string(),
            predicted_labels: prediction.predicted_labels().join(";"),
            confidences: prediction
                .labels()
                .iter()
                .map(|l| l.confidence.to_string())
                .collect::<Vec<_>>()
                .join(";"),
            mean_confidence: prediction.mean_confidence(),
        })?;
        count += 1;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(count)
}

pub fn read_predictions<R: Read>(reader: R) -> Result<Vec<Prediction>, ExportError> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut predictions = Vec::new();
    for result in reader.deserialize::<PredictionRow>() {
        let row = result?;
        let line = predictions.len() as u64 + 2;
        let labels = split_list(&row.predicted_labels);
        let confidences = split_list(&row.confidences)
            .iter()
            .map(|c| c.parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ExportError::InvalidRecord {
                line,
                message: format!("invalid confidence: {}", e),
            })?;
        if labels.len() != confidences.len() {
            return Err(ExportError::InvalidRecord {
                line,
                message: format!(
                    "{} labels but {} confidences",
                    labels.len(),
                    confidences.len()
                ),
            });
        }
        let scored = labels
            .into_iter()
            .zip(confidences)
            .map(|(label, confidence)| ScoredLabel::new(label, confidence))
            .collect();
        let prediction =
            Prediction::new(row.protein_id, scored).ok_or_else(|| ExportError::InvalidRecord {
                line,
                message: "prediction without labels".to_string(),
            })?;
        predictions.push(prediction);
    }
    Ok(predictions)
}

pub fn read_predictions_from_path<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<Prediction>, ExportError> {
    let file = std::fs::File::open(path).map_err(csv::Error::from)?;
    read_predictions(std::io::BufReader::new(file))
}
