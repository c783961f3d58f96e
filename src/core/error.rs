//! Error types for the sparring core

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SparringError {
    #[error("Sample buffer is empty")]
    EmptyBuffer,

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Task failed: {0}")]
    TaskFailed(String),
}

pub type Result<T> = std::result::Result<T, SparringError>;
