//! Error types for Chessmind

use thiserror::Error;

/// Error thrown when a side name cannot be parsed
#[derive(Debug, Clone, Error)]
#[error("Unknown side '{input}'. Expected 'white' or 'black'")]
pub struct UnknownSideError {
    pub input: String,
}

/// Error thrown when a configuration file is structurally valid but unusable
#[derive(Debug, Clone, Error)]
#[error("Invalid configuration for {field}: {reason}")]
pub struct InvalidConfigError {
    pub field: String,
    pub reason: String,
}

/// General Chessmind error type
#[derive(Debug, Error)]
pub enum ChessmindError {
    #[error(transparent)]
    UnknownSide(#[from] UnknownSideError),

    #[error(transparent)]
    InvalidConfig(#[from] InvalidConfigError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ChessmindError>;
