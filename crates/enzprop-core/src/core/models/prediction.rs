use std::collections::BTreeMap;

/// A single predicted label and its normalized vote.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredLabel {
    pub label: String,
    pub confidence: f64,
}

impl ScoredLabel {
    pub fn new(label: impl Into<String>, confidence: f64) -> Self {
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// The labels inferred for one unlabeled protein during a propagation run.
///
/// Labels are ordered by confidence (descending), ties by label (ascending).
/// A prediction always holds at least one label.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    protein_id: String,
    labels: Vec<ScoredLabel>,
    mean_confidence: f64,
}

impl Prediction {
    /// Creates a prediction from already ranked labels.
    ///
    /// Returns `None` when `labels` is empty; an empty prediction is never emitted.
    pub fn new(protein_id: impl Into<String>, labels: Vec<ScoredLabel>) -> Option<Self> {
        if labels.is_empty() {
            return None;
        }
        let mean_confidence =
            labels.iter().map(|l| l.confidence).sum::<f64>() / labels.len() as f64;
        Some(Self {
            protein_id: protein_id.into(),
            labels,
            mean_confidence,
        })
    }

    #[inline]
    pub fn protein_id(&self) -> &str {
        &self.protein_id
    }

    #[inline]
    pub fn labels(&self) -> &[ScoredLabel] {
        &self.labels
    }

    #[inline]
    pub fn mean_confidence(&self) -> f64 {
        self.mean_confidence
    }

    /// The predicted labels in rank order.
    pub fn predicted_labels(&self) -> Vec<&str> {
        self.labels.iter().map(|l| l.label.as_str()).collect()
    }

    /// Confidence keyed by label, the shape the prediction store persists.
    pub fn confidence_by_label(&self) -> BTreeMap<&str, f64> {
        self.labels
            .iter()
            .map(|l| (l.label.as_str(), l.confidence))
            .collect()
    }
}
