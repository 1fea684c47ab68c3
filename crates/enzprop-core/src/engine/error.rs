use super::config::ConfigError;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Store operation failed: {source}")]
    Store {
        #[from]
        source: StoreError,
    },

    #[error("Protein not found: {id}")]
    ProteinNotFound { id: String },

    #[error("Phase '{phase}' failed: {reason}")]
    PhaseFailed { phase: &'static str, reason: String },
}
