//! Deployment manifest and its execution
//!
//! A manifest lists artifacts and constructor arguments. Deploying sends
//! each creation transaction from a node account, verifies code landed at
//! the receipt's contract address, and records the address back into the
//! artifact file under the node's network id.

use std::path::Path;

use qa_primitives::{Address, NetworkId, H256, U256};
use qa_sdk::abi::Token;
use qa_sdk::contract::{self, Contract};
use qa_sdk::types::{BlockId, TransactionRequest};
use qa_sdk::{artifact_path, Artifact, NetworkEntry, NodeClient};
use serde::Serialize;

use crate::{E2EError, E2EResult};

/// Owner of the QA token supply
pub const QA_TOKEN_OWNER: Address = Address::from_bytes([
    0xcd, 0x2a, 0x3d, 0x9f, 0x93, 0x8e, 0x13, 0xcd, 0x94, 0x7e, 0xc0, 0x5a, 0xbc, 0x7f, 0xe7,
    0x34, 0xdf, 0x8d, 0xd8, 0x26,
]);

/// Name of the bookkeeping contract
pub const MIGRATIONS: &str = "Migrations";

/// Default gas limit for creation transactions
pub const DEPLOY_GAS_LIMIT: u64 = 6_800_000;

/// One artifact to deploy
#[derive(Debug, Clone)]
pub struct DeployStep {
    /// Artifact (and contract) name
    pub contract: String,
    /// Constructor arguments
    pub args: Vec<Token>,
}

/// Ordered list of deployments
#[derive(Debug, Clone)]
pub struct DeploymentManifest {
    /// Steps, deployed in order
    pub steps: Vec<DeployStep>,
    /// Gas limit for each creation transaction
    pub gas_limit: u64,
    /// Migration number recorded in `Migrations` once all steps succeed
    pub migration_id: u64,
}

impl DeploymentManifest {
    /// Empty manifest
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            gas_limit: DEPLOY_GAS_LIMIT,
            migration_id: 1,
        }
    }

    /// Append a step
    pub fn step(mut self, contract: &str, args: Vec<Token>) -> Self {
        self.steps.push(DeployStep {
            contract: contract.to_string(),
            args,
        });
        self
    }

    /// `Migrations` plus the QA token: 100,000,000 QAT owned by
    /// [`QA_TOKEN_OWNER`]
    pub fn qa_token() -> Self {
        Self::new().step(MIGRATIONS, vec![]).step(
            "ERC677",
            vec![
                Token::Address(QA_TOKEN_OWNER),
                Token::Uint(U256::from(100_000_000u64)),
                Token::String("QAToken".to_string()),
                Token::String("QAT".to_string()),
            ],
        )
    }
}

impl Default for DeploymentManifest {
    fn default() -> Self {
        Self::new()
    }
}

/// A contract deployed by [`deploy`]
#[derive(Debug, Clone, Serialize)]
pub struct Deployment {
    /// Contract name
    pub contract: String,
    /// Deployed address
    pub address: Address,
    /// Creation transaction
    pub transaction_hash: H256,
}

/// Deploy every step of `manifest` from `from`, writing addresses back to
/// the artifacts in `artifacts_dir`.
///
/// Steps run in order; the first failure stops the deployment. Artifacts of
/// steps already deployed keep their new addresses.
pub async fn deploy(
    client: &NodeClient,
    manifest: &DeploymentManifest,
    artifacts_dir: &Path,
    from: Address,
    network_id: NetworkId,
) -> E2EResult<Vec<Deployment>> {
    let mut deployed = Vec::with_capacity(manifest.steps.len());

    for step in &manifest.steps {
        let path = artifact_path(artifacts_dir, &step.contract);
        let mut artifact = Artifact::load(&path)?;
        let deployment = deploy_one(client, &artifact, step, from, manifest.gas_limit).await?;

        artifact.set_deployment(
            network_id,
            NetworkEntry::new(deployment.address, deployment.transaction_hash),
        );
        artifact.save(&path)?;
        tracing::info!(
            contract = %step.contract,
            address = %deployment.address,
            network = network_id,
            "deployed"
        );
        deployed.push(deployment);
    }

    if let Some(migrations) = deployed.iter().find(|d| d.contract == MIGRATIONS) {
        let artifact = Artifact::load(artifact_path(artifacts_dir, MIGRATIONS))?;
        let handle = match Contract::from_abi(migrations.address, &artifact.abi_entries()?) {
            Ok(handle) if handle.function("setCompleted").is_some() => handle,
            _ => contract::migrations(migrations.address),
        };
        handle
            .send(
                client,
                from,
                "setCompleted",
                &[Token::Uint(U256::from(manifest.migration_id))],
            )
            .await?;
        tracing::info!(migration = manifest.migration_id, "recorded migration");
    }

    Ok(deployed)
}

async fn deploy_one(
    client: &NodeClient,
    artifact: &Artifact,
    step: &DeployStep,
    from: Address,
    gas_limit: u64,
) -> E2EResult<Deployment> {
    let interface = Contract::from_abi(Address::ZERO, &artifact.abi_entries()?)?;
    let init_code = interface.encode_deploy(&artifact.bytecode_bytes()?, &step.args)?;

    let tx = TransactionRequest::create(from, init_code).gas(gas_limit);
    let receipt = client.send_and_confirm(&tx).await?;
    let address = receipt.contract_address.ok_or_else(|| {
        E2EError::Transaction(format!(
            "{}: receipt {} has no contract address",
            step.contract, receipt.transaction_hash
        ))
    })?;

    let code = client.get_code(&address, BlockId::Latest).await?;
    if code.is_empty() {
        return Err(E2EError::Transaction(format!(
            "{}: no code at {} after deployment",
            step.contract, address
        )));
    }

    Ok(Deployment {
        contract: step.contract.clone(),
        address,
        transaction_hash: receipt.transaction_hash,
    })
}
