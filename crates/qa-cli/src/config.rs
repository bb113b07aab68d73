//! CLI configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use qa_e2e::SuiteSettings;
use qa_primitives::NetworkId;

use crate::error::CliError;

/// CLI configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Node connection
    #[serde(default)]
    pub rsk: RskConfig,
    /// Suite settings
    #[serde(default)]
    pub suite: SuiteConfig,
}

/// Node connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RskConfig {
    /// JSON-RPC endpoint
    #[serde(rename = "hostUrl", default = "default_host_url")]
    pub host_url: String,
}

/// Suite settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Bound on each scenario, in milliseconds
    pub timeout_ms: u64,
    /// Network id whose deployment the suite targets
    pub network_id: NetworkId,
    /// Confirmations required, counting the inclusion block
    pub confirmations: u64,
    /// Directory holding the contract artifacts
    pub artifacts_dir: PathBuf,
    /// Substring the node's client version must contain
    pub expected_client: String,
}

fn default_host_url() -> String {
    "http://localhost:4444".to_string()
}

impl Default for RskConfig {
    fn default() -> Self {
        Self {
            host_url: default_host_url(),
        }
    }
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            network_id: 33,
            confirmations: 1,
            artifacts_dir: PathBuf::from("build/contracts"),
            expected_client: "RskJ".to_string(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".erc677-qa"))
    }

    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Load config.
    ///
    /// An explicit `path` must exist. Without one, the default path is read
    /// when present and defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    CliError::Config(format!("cannot read {}: {}", path.display(), e))
                })?;
                Self::parse(&content)
            }
            None => match Self::config_path() {
                Some(path) if path.exists() => Self::parse(&std::fs::read_to_string(path)?),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Parse TOML config
    pub fn parse(content: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(content)?)
    }

    /// Replace the host URL when an override is given
    pub fn with_host_override(mut self, host_url: Option<String>) -> Self {
        if let Some(url) = host_url {
            self.rsk.host_url = url;
        }
        self
    }

    /// Per-scenario time bound
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.suite.timeout_ms)
    }

    /// Settings handed to the suite
    pub fn settings(&self) -> SuiteSettings {
        SuiteSettings {
            network_id: self.suite.network_id,
            expected_client: self.suite.expected_client.clone(),
            timeout: self.timeout(),
        }
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, CliError> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(e.to_string()))
    }
}
