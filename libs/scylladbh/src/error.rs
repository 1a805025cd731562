use scylla::errors::{ExecutionError, NewSessionError, UseKeyspaceError};

/// Error type for session construction and query helpers
#[derive(Debug, thiserror::Error)]
pub enum ScyllaError {
    #[error("no nodes configured")]
    NoNodes,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[cfg(feature = "config")]
    #[error(transparent)]
    Config(#[from] core_config::ConfigError),

    #[error("failed to resolve container '{container}': {details}")]
    ContainerResolution { container: String, details: String },

    #[error("Session error: {0}")]
    Session(#[from] NewSessionError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("Keyspace error: {0}")]
    Keyspace(#[from] UseKeyspaceError),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Result error: {0}")]
    Rows(String),
}

impl ScyllaError {
    pub(crate) fn container(container: impl Into<String>, details: impl ToString) -> Self {
        Self::ContainerResolution {
            container: container.into(),
            details: details.to_string(),
        }
    }
}

/// Result type alias for this crate
pub type ScyllaResult<T> = Result<T, ScyllaError>;
