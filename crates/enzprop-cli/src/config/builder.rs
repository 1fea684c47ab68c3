use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::cli::ConfigArgs;
use crate::error::Result;
use enzprop::engine::config::{PipelineConfigBuilder, RetryConfig};
use std::time::Duration;
use tracing::debug;

pub fn build_config(args: &ConfigArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let mut file_config = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    file_config.apply_set_values(&args.set_values)?;

    let graph = file_config.graph.take().unwrap_or_default();
    let propagation = file_config.propagation.take().unwrap_or_default();
    let input = file_config.input.take().unwrap_or_default();
    let retry = file_config.retry.take().unwrap_or_default();

    let retry = RetryConfig {
        max_attempts: retry.max_attempts.unwrap_or(defaults.retry.max_attempts),
        base_delay: retry
            .base_delay_ms
            .map_or(defaults.retry.base_delay, Duration::from_millis),
        max_delay: retry
            .max_delay_ms
            .map_or(defaults.retry.max_delay, Duration::from_millis),
    };

    let pipeline = PipelineConfigBuilder::new()
        .similarity_threshold(
            args.similarity_threshold
                .or(graph.similarity_threshold)
                .unwrap_or(defaults.similarity_threshold),
        )
        .edge_batch_size(graph.edge_batch_size.unwrap_or(defaults.edge_batch_size))
        .node_batch_size(graph.node_batch_size.unwrap_or(defaults.node_batch_size))
        .progress_interval(
            graph
                .progress_interval
                .unwrap_or(defaults.progress_interval),
        )
        .min_edge_weight(
            args.min_edge_weight
                .or(propagation.min_edge_weight)
                .unwrap_or(defaults.min_edge_weight),
        )
        .confidence_threshold(
            args.confidence_threshold
                .or(propagation.confidence_threshold)
                .unwrap_or(defaults.confidence_threshold),
        )
        .max_labels_per_protein(
            args.max_labels_per_protein
                .or(propagation.max_labels_per_protein)
                .unwrap_or(defaults.max_labels_per_protein),
        )
        .prediction_batch_size(
            propagation
                .batch_size
                .unwrap_or(defaults.prediction_batch_size),
        )
        .protein_limit(args.protein_limit.or(input.protein_limit))
        .reload_mode(
            args.mode
                .or(input.reload_mode)
                .unwrap_or(defaults.reload_mode),
        )
        .retry(retry)
        .build()?;

    debug!("Resolved pipeline configuration: {:?}", pipeline);
    Ok(AppConfig { pipeline })
}
