use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Parameter '{name}' is out of range: {value} (expected {expected})")]
    OutOfRange {
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("Unknown reload mode '{0}'. Expected 'clear', 'skip' or 'continue'.")]
    UnknownReloadMode(String),
}

/// What to do when the graph store already holds nodes before a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReloadMode {
    /// Remove everything from the store, then build.
    Clear,
    /// Leave the store as it is and do not build.
    Skip,
    /// Build on top of the existing contents.
    #[default]
    Continue,
}

impl FromStr for ReloadMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clear" | "1" => Ok(Self::Clear),
            "skip" | "2" => Ok(Self::Skip),
            "continue" | "3" => Ok(Self::Continue),
            other => Err(ConfigError::UnknownReloadMode(other.to_string())),
        }
    }
}

impl fmt::Display for ReloadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Clear => "clear",
            Self::Skip => "skip",
            Self::Continue => "continue",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphConfig {
    /// Minimum Jaccard coefficient for an edge (inclusive).
    pub similarity_threshold: f64,
    pub edge_batch_size: usize,
    pub node_batch_size: usize,
    /// Number of pair comparisons between progress reports and cancellation checks.
    pub progress_interval: u64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.1,
            edge_batch_size: 1000,
            node_batch_size: 500,
            progress_interval: 100_000,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropagationConfig {
    /// Minimum edge weight for a neighbor to vote (inclusive).
    pub min_edge_weight: f64,
    /// Minimum normalized vote for a label to be kept (inclusive).
    pub confidence_threshold: f64,
    pub max_labels_per_protein: usize,
    pub batch_size: usize,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            min_edge_weight: 0.1,
            confidence_threshold: 0.3,
            max_labels_per_protein: 5,
            batch_size: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (1-based): exponential, capped at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineConfig {
    pub graph: GraphConfig,
    pub propagation: PropagationConfig,
    pub retry: RetryConfig,
    pub protein_limit: Option<usize>,
    pub reload_mode: ReloadMode,
}

#[derive(Default)]
pub struct PipelineConfigBuilder {
    similarity_threshold: Option<f64>,
    edge_batch_size: Option<usize>,
    node_batch_size: Option<usize>,
    progress_interval: Option<u64>,
    min_edge_weight: Option<f64>,
    confidence_threshold: Option<f64>,
    max_labels_per_protein: Option<usize>,
    prediction_batch_size: Option<usize>,
    retry: Option<RetryConfig>,
    protein_limit: Option<usize>,
    reload_mode: Option<ReloadMode>,
}

impl PipelineConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = Some(threshold);
        self
    }
    pub fn edge_batch_size(mut self, size: usize) -> Self {
        self.edge_batch_size = Some(size);
        self
    }
    pub fn node_batch_size(mut self, size: usize) -> Self {
        self.node_batch_size = Some(size);
        self
    }
    pub fn progress_interval(mut self, comparisons: u64) -> Self {
        self.progress_interval = Some(comparisons);
        self
    }
    pub fn min_edge_weight(mut self, weight: f64) -> Self {
        self.min_edge_weight = Some(weight);
        self
    }
    pub fn confidence_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = Some(threshold);
        self
    }
    pub fn max_labels_per_protein(mut self, n: usize) -> Self {
        self.max_labels_per_protein = Some(n);
        self
    }
    pub fn prediction_batch_size(mut self, size: usize) -> Self {
        self.prediction_batch_size = Some(size);
        self
    }
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.retry = Some(retry);
        self
    }
    pub fn protein_limit(mut self, limit: Option<usize>) -> Self {
        self.protein_limit = limit;
        self
    }
    pub fn reload_mode(mut self, mode: ReloadMode) -> Self {
        self.reload_mode = Some(mode);
        self
    }

    /// Builds the configuration.
    ///
    /// The five algorithm parameters are required; batching, progress, retry and
    /// reload settings fall back to their defaults.
    pub fn build(self) -> Result<PipelineConfig, ConfigError> {
        let graph_defaults = GraphConfig::default();
        let propagation_defaults = PropagationConfig::default();

        let graph = GraphConfig {
            similarity_threshold: self
                .similarity_threshold
                .ok_or(ConfigError::MissingParameter("similarity_threshold"))?,
            edge_batch_size: self
                .edge_batch_size
                .ok_or(ConfigError::MissingParameter("edge_batch_size"))?,
            node_batch_size: self
                .node_batch_size
                .unwrap_or(graph_defaults.node_batch_size),
            progress_interval: self
                .progress_interval
                .unwrap_or(graph_defaults.progress_interval),
        };
        let propagation = PropagationConfig {
            min_edge_weight: self
                .min_edge_weight
                .ok_or(ConfigError::MissingParameter("min_edge_weight"))?,
            confidence_threshold: self
                .confidence_threshold
                .ok_or(ConfigError::MissingParameter("confidence_threshold"))?,
            max_labels_per_protein: self
                .max_labels_per_protein
                .ok_or(ConfigError::MissingParameter("max_labels_per_protein"))?,
            batch_size: self
                .prediction_batch_size
                .unwrap_or(propagation_defaults.batch_size),
        };

        let config = PipelineConfig {
            graph,
            propagation,
            retry: self.retry.unwrap_or_default(),
            protein_limit: self.protein_limit,
            reload_mode: self.reload_mode.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}

impl GraphConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        // A zero threshold would admit zero-weight edges.
        check_fraction("similarity_threshold", self.similarity_threshold, false)?;
        check_positive("edge_batch_size", self.edge_batch_size as u64)?;
        check_positive("node_batch_size", self.node_batch_size as u64)?;
        check_positive("progress_interval", self.progress_interval)
    }
}

impl PropagationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_fraction("min_edge_weight", self.min_edge_weight, true)?;
        check_fraction("confidence_threshold", self.confidence_threshold, true)?;
        check_positive(
            "max_labels_per_protein",
            self.max_labels_per_protein as u64,
        )?;
        check_positive("prediction_batch_size", self.batch_size as u64)
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.graph.validate()?;
        self.propagation.validate()?;
        check_positive("retry.max_attempts", self.retry.max_attempts as u64)?;
        if let Some(limit) = self.protein_limit {
            check_positive("protein_limit", limit as u64)?;
        }
        Ok(())
    }
}

fn check_fraction(name: &'static str, value: f64, allow_zero: bool) -> Result<(), ConfigError> {
    let lower_ok = if allow_zero { value >= 0.0 } else { value > 0.0 };
    if lower_ok && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value: value.to_string(),
            expected: if allow_zero { "[0, 1]" } else { "(0, 1]" },
        })
    }
}

fn check_positive(name: &'static str, value: u64) -> Result<(), ConfigError> {
    if value > 0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value: value.to_string(),
            expected: "a positive integer",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
            .similarity_threshold(0.1)
            .edge_batch_size(1000)
            .min_edge_weight(0.1)
            .confidence_threshold(0.3)
            .max_labels_per_protein(5)
    }

    #[test]
    fn builder_with_required_parameters_matches_defaults() {
        let config = complete_builder().build().unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn builder_reports_first_missing_parameter() {
        let result = PipelineConfigBuilder::new().similarity_threshold(0.2).build();
        assert_eq!(
            result,
            Err(ConfigError::MissingParameter("edge_batch_size"))
        );
    }

    #[test]
    fn builder_rejects_zero_similarity_threshold() {
        let result = complete_builder().similarity_threshold(0.0).build();
        assert!(matches!(
            result,
            Err(ConfigError::OutOfRange {
                name: "similarity_threshold",
                ..
            })
        ));
    }

    #[test]
    fn builder_rejects_threshold_above_one() {
        let result = complete_builder().confidence_threshold(1.5).build();
        assert!(matches!(
            result,
            Err(ConfigError::OutOfRange {
                name: "confidence_threshold",
                ..
            })
        ));
    }

    #[test]
    fn builder_rejects_zero_batch_size_and_zero_limit() {
        assert!(complete_builder().edge_batch_size(0).build().is_err());
        assert!(complete_builder().max_labels_per_protein(0).build().is_err());
        assert!(complete_builder().protein_limit(Some(0)).build().is_err());
    }

    #[test]
    fn builder_keeps_optional_settings() {
        let config = complete_builder()
            .protein_limit(Some(250))
            .reload_mode(ReloadMode::Clear)
            .progress_interval(10)
            .build()
            .unwrap();
        assert_eq!(config.protein_limit, Some(250));
        assert_eq!(config.reload_mode, ReloadMode::Clear);
        assert_eq!(config.graph.progress_interval, 10);
    }

    #[test]
    fn reload_mode_parses_names_and_menu_numbers() {
        assert_eq!("clear".parse::<ReloadMode>(), Ok(ReloadMode::Clear));
        assert_eq!(" Skip ".parse::<ReloadMode>(), Ok(ReloadMode::Skip));
        assert_eq!("3".parse::<ReloadMode>(), Ok(ReloadMode::Continue));
        assert!("wipe".parse::<ReloadMode>().is_err());
    }

    #[test]
    fn retry_delay_grows_exponentially_up_to_cap() {
        let retry = RetryConfig {
            max_attempts: 10,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(500),
        };
        assert_eq!(retry.delay_for(1), Duration::from_millis(100));
        assert_eq!(retry.delay_for(2), Duration::from_millis(200));
        assert_eq!(retry.delay_for(3), Duration::from_millis(400));
        assert_eq!(retry.delay_for(4), Duration::from_millis(500));
        assert_eq!(retry.delay_for(40), Duration::from_millis(500));
    }
}
