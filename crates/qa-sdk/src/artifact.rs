//! Compiled contract artifacts (truffle JSON layout)
//!
//! Only the fields the suite reads are typed. Everything else in the file is
//! kept verbatim so that writing a deployment back does not lose compiler
//! metadata.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use qa_primitives::{Address, NetworkId, H256};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::abi::AbiEntry;
use crate::contract::Contract;
use crate::SdkError;

/// Deployment record under `networks`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkEntry {
    /// Deployed address
    pub address: Address,
    /// Creating transaction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<H256>,
    /// `events`, `links` and whatever else the toolchain recorded
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NetworkEntry {
    /// Fresh record for a deployment made by this crate
    pub fn new(address: Address, transaction_hash: H256) -> Self {
        let mut extra = Map::new();
        extra.insert("events".to_string(), Value::Object(Map::new()));
        extra.insert("links".to_string(), Value::Object(Map::new()));
        Self {
            address,
            transaction_hash: Some(transaction_hash),
            extra,
        }
    }
}

/// A compiled contract artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    /// Contract name
    pub contract_name: String,
    /// ABI array, kept as raw JSON
    #[serde(default)]
    pub abi: Vec<Value>,
    /// Creation bytecode, `0x`-prefixed hex
    #[serde(default)]
    pub bytecode: String,
    /// Deployments keyed by network id
    #[serde(default)]
    pub networks: BTreeMap<String, NetworkEntry>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Path of `<name>.json` in an artifacts directory
pub fn artifact_path(dir: impl AsRef<Path>, contract_name: &str) -> PathBuf {
    dir.as_ref().join(format!("{}.json", contract_name))
}

impl Artifact {
    /// Parse an artifact from JSON text
    pub fn from_json(json: &str) -> Result<Self, SdkError> {
        serde_json::from_str(json).map_err(|e| SdkError::Artifact(e.to_string()))
    }

    /// Read an artifact file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SdkError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let artifact: Self = serde_json::from_str(&json)
            .map_err(|e| SdkError::Artifact(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), contract = %artifact.contract_name, "loaded artifact");
        Ok(artifact)
    }

    /// Write the artifact back, pretty-printed like the compiler does
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SdkError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json + "\n")?;
        Ok(())
    }

    /// Parsed ABI entries
    pub fn abi_entries(&self) -> Result<Vec<AbiEntry>, SdkError> {
        AbiEntry::parse_all(&Value::Array(self.abi.clone()))
    }

    /// Creation bytecode as bytes
    pub fn bytecode_bytes(&self) -> Result<Vec<u8>, SdkError> {
        let code = self.bytecode.strip_prefix("0x").unwrap_or(&self.bytecode);
        if code.is_empty() {
            return Err(SdkError::Artifact(format!(
                "{} has no bytecode (abstract contract or interface?)",
                self.contract_name
            )));
        }
        // Unlinked libraries leave `__Name____` placeholders in the hex
        if code.contains("__") {
            return Err(SdkError::Artifact(format!(
                "{} bytecode has unlinked library references",
                self.contract_name
            )));
        }
        Ok(hex::decode(code)?)
    }

    /// Deployment recorded for a network
    pub fn deployment(&self, network_id: NetworkId) -> Option<&NetworkEntry> {
        self.networks.get(&network_id.to_string())
    }

    /// Address recorded for a network, an error when there is none
    pub fn address_for(&self, network_id: NetworkId) -> Result<Address, SdkError> {
        self.deployment(network_id)
            .map(|entry| entry.address)
            .ok_or_else(|| SdkError::MissingDeployment {
                contract: self.contract_name.clone(),
                network_id,
            })
    }

    /// Record a deployment, replacing any previous one on that network
    pub fn set_deployment(&mut self, network_id: NetworkId, entry: NetworkEntry) {
        self.networks.insert(network_id.to_string(), entry);
    }

    /// Contract handle at the deployed address for `network_id`
    pub fn contract_at(&self, network_id: NetworkId) -> Result<Contract, SdkError> {
        let address = self.address_for(network_id)?;
        Contract::from_abi(address, &self.abi_entries()?)
    }
}
