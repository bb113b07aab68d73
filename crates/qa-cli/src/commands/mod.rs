//! Subcommands

pub mod deploy;
pub mod run;

use qa_sdk::NodeClient;

use crate::config::Config;
use crate::error::CliError;

/// Connect to the configured node with the configured confirmation depth
async fn connect(config: &Config) -> Result<NodeClient, CliError> {
    let client = NodeClient::connect(&config.rsk.host_url).await?;
    Ok(client.with_confirmations(config.suite.confirmations))
}
