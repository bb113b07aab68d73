//! CLI error types

use std::time::Duration;

use thiserror::Error;

/// CLI error type
#[derive(Debug, Error)]
pub enum CliError {
    /// Config file missing or malformed
    #[error("Config error: {0}")]
    Config(String),

    /// Config file could not be parsed
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Node or artifact error
    #[error(transparent)]
    Sdk(#[from] qa_sdk::SdkError),

    /// Suite setup, plan or deployment error
    #[error(transparent)]
    Suite(#[from] qa_e2e::E2EError),

    /// Operation exceeded its time bound
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
