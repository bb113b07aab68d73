//! `deploy`: deploy the QA token and record it in the artifacts

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use qa_e2e::{deploy, DeploymentManifest};

use crate::config::Config;
use crate::error::CliError;
use crate::output::Output;

/// Deploy `Migrations` and the QA token
#[derive(Debug, Args)]
pub struct DeployCommand {
    /// Bound on the whole deployment, in milliseconds
    #[arg(long, default_value_t = 120_000)]
    timeout_ms: u64,

    /// Artifacts directory [default: from config]
    #[arg(long)]
    artifacts_dir: Option<PathBuf>,
}

impl DeployCommand {
    pub async fn execute(&self, config: &Config, json: bool) -> Result<(), CliError> {
        let dir = self
            .artifacts_dir
            .clone()
            .unwrap_or_else(|| config.suite.artifacts_dir.clone());
        let timeout = Duration::from_millis(self.timeout_ms);
        let manifest = DeploymentManifest::qa_token();

        let work = async {
            let client = super::connect(config).await?;
            let from = client
                .accounts()
                .await?
                .first()
                .copied()
                .ok_or_else(|| CliError::Config("node exposes no accounts".to_string()))?;
            let network = client.net_version().await?;
            if network != config.suite.network_id {
                tracing::warn!(
                    network,
                    configured = config.suite.network_id,
                    "deploying to a network the suite is not configured for"
                );
            }
            let deployed = deploy(&client, &manifest, &dir, from, network).await?;
            Ok::<_, CliError>((network, deployed))
        };
        let (network, deployed) = tokio::time::timeout(timeout, work)
            .await
            .map_err(|_| CliError::Timeout(timeout))??;

        let mut output = Output::new(json)
            .field_u64("network_id", network)
            .field_serialized("deployments", &deployed)?;
        for d in &deployed {
            output = output.line(format!("{} deployed at {} (tx {})", d.contract, d.address, d.transaction_hash));
        }
        output
            .line(format!("Artifacts in {} updated for network {}", dir.display(), network))
            .print();
        Ok(())
    }
}
