//! Error types for the node registry and config store.

use thiserror::Error;

/// Result type alias for registry and config store operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors that can occur while loading, extending, or validating the
/// monitored node set.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("config file line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("config file io: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialize record: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("invalid node spec: {0}")]
    InvalidSpec(String),
}
