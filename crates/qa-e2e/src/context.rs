//! Suite context: the connection, token handle and accounts every scenario
//! works with

use std::time::Duration;

use qa_primitives::{Address, NetworkId};
use qa_sdk::{Artifact, Erc677, NodeClient};

use crate::{E2EError, E2EResult};

/// Accounts the built-in scenarios address by index (0..=5)
pub const MIN_ACCOUNTS: usize = 6;

/// Knobs for one suite run
#[derive(Debug, Clone)]
pub struct SuiteSettings {
    /// Network id whose deployment is read from the artifact
    pub network_id: NetworkId,
    /// Substring the node's client version must contain
    pub expected_client: String,
    /// Bound on each scenario
    pub timeout: Duration,
}

impl Default for SuiteSettings {
    fn default() -> Self {
        Self {
            network_id: 33,
            expected_client: "RskJ".to_string(),
            timeout: Duration::from_millis(10_000),
        }
    }
}

/// Everything a scenario needs, built once during setup.
///
/// Holds no ledger state; balances are always queried fresh.
pub struct SuiteContext {
    client: NodeClient,
    token: Erc677,
    artifact_address: Address,
    accounts: Vec<Address>,
    client_version: String,
    settings: SuiteSettings,
}

impl SuiteContext {
    /// Connect-time checks and handle resolution.
    ///
    /// Fetches the client version and account list and binds the token
    /// handle to the artifact's deployment on the configured network. Any
    /// error here is a setup error.
    pub async fn setup(
        client: NodeClient,
        artifact: &Artifact,
        settings: SuiteSettings,
    ) -> E2EResult<Self> {
        tracing::info!(network = settings.network_id, "connecting");

        let client_version = client
            .client_version()
            .await
            .map_err(|e| E2EError::Setup(format!("node info: {}", e)))?;

        let accounts = client
            .accounts()
            .await
            .map_err(|e| E2EError::Setup(format!("account list: {}", e)))?;
        if accounts.len() < MIN_ACCOUNTS {
            return Err(E2EError::Setup(format!(
                "node exposes {} accounts, at least {} are needed",
                accounts.len(),
                MIN_ACCOUNTS
            )));
        }

        let artifact_address = artifact
            .address_for(settings.network_id)
            .map_err(|e| E2EError::Setup(e.to_string()))?;
        let token = artifact
            .contract_at(settings.network_id)
            .and_then(Erc677::new)
            .map_err(|e| E2EError::Setup(format!("{}: {}", artifact.contract_name, e)))?;

        tracing::info!(
            client = %client_version,
            accounts = accounts.len(),
            token = %token.address(),
            "ready"
        );

        Ok(Self {
            client,
            token,
            artifact_address,
            accounts,
            client_version,
            settings,
        })
    }

    /// Node connection
    pub fn client(&self) -> &NodeClient {
        &self.client
    }

    /// Token handle
    pub fn token(&self) -> &Erc677 {
        &self.token
    }

    /// Address recorded in the artifact for the configured network
    pub fn artifact_address(&self) -> Address {
        self.artifact_address
    }

    /// Node accounts in the order the node lists them
    pub fn accounts(&self) -> &[Address] {
        &self.accounts
    }

    /// Account by index; setup guarantees indices below [`MIN_ACCOUNTS`]
    pub fn account(&self, index: usize) -> E2EResult<Address> {
        self.accounts
            .get(index)
            .copied()
            .ok_or_else(|| E2EError::Setup(format!("no account at index {}", index)))
    }

    /// The account that received the initial supply
    pub fn funder(&self) -> Address {
        self.accounts[0]
    }

    /// Client version seen during setup
    pub fn client_version(&self) -> &str {
        &self.client_version
    }

    /// Settings for this run
    pub fn settings(&self) -> &SuiteSettings {
        &self.settings
    }
}
