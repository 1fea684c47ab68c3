use enzprop::engine::config::{GraphConfig, PropagationConfig, ReloadMode, RetryConfig};

pub struct DefaultsConfig {
    pub similarity_threshold: f64,
    pub edge_batch_size: usize,
    pub node_batch_size: usize,
    pub progress_interval: u64,
    pub min_edge_weight: f64,
    pub confidence_threshold: f64,
    pub max_labels_per_protein: usize,
    pub prediction_batch_size: usize,
    pub reload_mode: ReloadMode,
    pub retry: RetryConfig,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        let graph = GraphConfig::default();
        let propagation = PropagationConfig::default();
        Self {
            similarity_threshold: graph.similarity_threshold,
            edge_batch_size: graph.edge_batch_size,
            node_batch_size: graph.node_batch_size,
            progress_interval: graph.progress_interval,
            min_edge_weight: propagation.min_edge_weight,
            confidence_threshold: propagation.confidence_threshold,
            max_labels_per_protein: propagation.max_labels_per_protein,
            prediction_batch_size: propagation.batch_size,
            reload_mode: ReloadMode::default(),
            retry: RetryConfig::default(),
        }
    }
}
