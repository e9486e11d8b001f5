use thiserror::Error;

use super::config::ConfigError;
use crate::core::align::AlignError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("No chains to cluster")]
    EmptyInput,

    #[error("Alignment of '{query}' against '{candidate}' failed: {source}")]
    Alignment {
        query: String,
        candidate: String,
        #[source]
        source: AlignError,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
