use std::collections::BTreeSet;

/// Descriptive fields carried from the source table onto graph nodes.
///
/// None of these take part in similarity or propagation; they are kept so
/// that node creation can store the same attributes the loader saw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProteinMetadata {
    pub entry_name: Option<String>,
    pub name: Option<String>,
    pub organism: Option<String>,
    pub sequence_length: usize,
}

/// A protein as seen by graph construction and label propagation.
///
/// `domains` holds InterPro-style signature identifiers and `labels` holds
/// EC numbers. A record is immutable for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProteinRecord {
    id: String,
    domains: BTreeSet<String>,
    labels: BTreeSet<String>,
    metadata: ProteinMetadata,
}

impl ProteinRecord {
    pub fn new<I, D, L>(id: I, domains: D, labels: L) -> Self
    where
        I: Into<String>,
        D: IntoIterator,
        D::Item: Into<String>,
        L: IntoIterator,
        L::Item: Into<String>,
    {
        Self {
            id: id.into(),
            domains: domains.into_iter().map(Into::into).collect(),
            labels: labels.into_iter().map(Into::into).collect(),
            metadata: ProteinMetadata::default(),
        }
    }

    pub fn with_metadata(mut self, metadata: ProteinMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn domains(&self) -> &BTreeSet<String> {
        &self.domains
    }

    #[inline]
    pub fn labels(&self) -> &BTreeSet<String> {
        &self.labels
    }

    #[inline]
    pub fn metadata(&self) -> &ProteinMetadata {
        &self.metadata
    }

    #[inline]
    pub fn is_labeled(&self) -> bool {
        !self.labels.is_empty()
    }

    #[inline]
    pub fn has_domains(&self) -> bool {
        !self.domains.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_deduplicates_domains_and_labels() {
        let record = ProteinRecord::new(
            "P12345",
            ["IPR001", "IPR002", "IPR001"],
            ["1.1.1.1", "1.1.1.1"],
        );
        assert_eq!(record.domains().len(), 2);
        assert_eq!(record.labels().len(), 1);
    }

    #[test]
    fn is_labeled_reflects_label_set() {
        let labeled = ProteinRecord::new("A", ["IPR001"], ["2.7.11.1"]);
        let unlabeled = ProteinRecord::new("B", ["IPR001"], Vec::<String>::new());
        assert!(labeled.is_labeled());
        assert!(!unlabeled.is_labeled());
    }

    #[test]
    fn has_domains_is_false_for_empty_domain_set() {
        let record = ProteinRecord::new("A", Vec::<String>::new(), ["2.7.11.1"]);
        assert!(!record.has_domains());
    }

    #[test]
    fn with_metadata_attaches_descriptive_fields() {
        let record = ProteinRecord::new("A", ["IPR001"], Vec::<String>::new()).with_metadata(
            ProteinMetadata {
                entry_name: Some("CP2D7_HUMAN".to_string()),
                organism: Some("Homo sapiens".to_string()),
                sequence_length: 515,
                ..Default::default()
            },
        );
        assert_eq!(record.metadata().entry_name.as_deref(), Some("CP2D7_HUMAN"));
        assert_eq!(record.metadata().sequence_length, 515);
        assert_eq!(record.metadata().name, None);
    }
}
