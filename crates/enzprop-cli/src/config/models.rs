use enzprop::engine::config::PipelineConfig;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
}
