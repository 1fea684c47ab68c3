use crate::error::{CliError, Result};
use enzprop::engine::config::ReloadMode;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileGraphConfig {
    pub similarity_threshold: Option<f64>,
    pub edge_batch_size: Option<usize>,
    pub node_batch_size: Option<usize>,
    pub progress_interval: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FilePropagationConfig {
    pub min_edge_weight: Option<f64>,
    pub confidence_threshold: Option<f64>,
    pub max_labels_per_protein: Option<usize>,
    pub batch_size: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileInputConfig {
    pub protein_limit: Option<usize>,
    #[serde(default, deserialize_with = "deserialize_reload_mode")]
    pub reload_mode: Option<ReloadMode>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileRetryConfig {
    pub max_attempts: Option<u32>,
    pub base_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub graph: Option<FileGraphConfig>,
    pub propagation: Option<FilePropagationConfig>,
    pub input: Option<FileInputConfig>,
    pub retry: Option<FileRetryConfig>,
}

fn deserialize_reload_mode<'de, D>(deserializer: D) -> std::result::Result<Option<ReloadMode>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    value
        .map(|v| v.parse().map_err(serde::de::Error::custom))
        .transpose()
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Reading configuration file {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::parsing(path, e))
    }

    pub fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let (key, value) = (key.trim(), value.trim());

            match key {
                "graph.similarity-threshold" => {
                    self.graph().similarity_threshold = Some(parse_value(key, value)?);
                }
                "graph.edge-batch-size" => {
                    self.graph().edge_batch_size = Some(parse_value(key, value)?);
                }
                "graph.node-batch-size" => {
                    self.graph().node_batch_size = Some(parse_value(key, value)?);
                }
                "graph.progress-interval" => {
                    self.graph().progress_interval = Some(parse_value(key, value)?);
                }
                "propagation.min-edge-weight" => {
                    self.propagation().min_edge_weight = Some(parse_value(key, value)?);
                }
                "propagation.confidence-threshold" => {
                    self.propagation().confidence_threshold = Some(parse_value(key, value)?);
                }
                "propagation.max-labels-per-protein" => {
                    self.propagation().max_labels_per_protein = Some(parse_value(key, value)?);
                }
                "propagation.batch-size" => {
                    self.propagation().batch_size = Some(parse_value(key, value)?);
                }
                "input.protein-limit" => {
                    self.input().protein_limit = Some(parse_value(key, value)?);
                }
                "input.reload-mode" => {
                    self.input().reload_mode = Some(parse_value(key, value)?);
                }
                "retry.max-attempts" => {
                    self.retry().max_attempts = Some(parse_value(key, value)?);
                }
                "retry.base-delay-ms" => {
                    self.retry().base_delay_ms = Some(parse_value(key, value)?);
                }
                "retry.max-delay-ms" => {
                    self.retry().max_delay_ms = Some(parse_value(key, value)?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }

    fn graph(&mut self) -> &mut FileGraphConfig {
        self.graph.get_or_insert_with(Default::default)
    }

    fn propagation(&mut self) -> &mut FilePropagationConfig {
        self.propagation.get_or_insert_with(Default::default)
    }

    fn input(&mut self) -> &mut FileInputConfig {
        self.input.get_or_insert_with(Default::default)
    }

    fn retry(&mut self) -> &mut FileRetryConfig {
        self.retry.get_or_insert_with(Default::default)
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
{
    value.parse().map_err(|_| {
        CliError::Config(format!(
            "Invalid value for {}: '{}' ({})",
            key,
            value,
            std::any::type_name::<T>()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parses_all_sections() {
        let content = r#"
            [graph]
            similarity-threshold = 0.2
            edge-batch-size = 2000

            [propagation]
            confidence-threshold = 0.4
            max-labels-per-protein = 3

            [input]
            protein-limit = 100
            reload-mode = "skip"

            [retry]
            max-attempts = 5
        "#;
        let config: FileConfig = toml::from_str(content).unwrap();
        let graph = config.graph.unwrap();
        assert_eq!(graph.similarity_threshold, Some(0.2));
        assert_eq!(graph.edge_batch_size, Some(2000));
        assert_eq!(graph.node_batch_size, None);
        let input = config.input.unwrap();
        assert_eq!(input.protein_limit, Some(100));
        assert_eq!(input.reload_mode, Some(ReloadMode::Skip));
        assert_eq!(config.retry.unwrap().max_attempts, Some(5));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[graph]\nthreshold = 0.2\n").unwrap();
        assert!(matches!(
            FileConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));
    }

    #[test]
    fn invalid_reload_mode_is_rejected() {
        let result = toml::from_str::<FileConfig>("[input]\nreload-mode = \"wipe\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn set_values_create_missing_sections() {
        let mut config = FileConfig::default();
        config
            .apply_set_values(&[
                "graph.progress-interval=500".to_string(),
                "input.reload-mode=clear".to_string(),
                "retry.base-delay-ms = 10".to_string(),
            ])
            .unwrap();
        assert_eq!(config.graph.unwrap().progress_interval, Some(500));
        assert_eq!(config.input.unwrap().reload_mode, Some(ReloadMode::Clear));
        assert_eq!(config.retry.unwrap().base_delay_ms, Some(10));
    }

    #[test]
    fn set_values_reject_bad_input() {
        let mut config = FileConfig::default();
        assert!(config.apply_set_values(&["graph.edge-batch-size".to_string()]).is_err());
        assert!(config.apply_set_values(&["graph.colour=red".to_string()]).is_err());
        assert!(
            config
                .apply_set_values(&["graph.edge-batch-size=many".to_string()])
                .is_err()
        );
    }
}
