//! `run`: execute the built-in suite against the configured node

use clap::Args;
use qa_e2e::{SuiteContext, SuiteReport, SuiteRunner};
use qa_sdk::{artifact_path, Artifact};

use crate::config::Config;
use crate::error::CliError;
use crate::output::Output;

/// Artifact the suite reads the token deployment from
const TOKEN_ARTIFACT: &str = "ERC677";

/// Run the suite
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Print the scenario order and exit without contacting the node
    #[arg(long)]
    plan: bool,
}

impl RunCommand {
    /// Returns whether every scenario passed
    pub async fn execute(&self, config: &Config, json: bool) -> Result<bool, CliError> {
        let runner = SuiteRunner::builtin(config.timeout());
        let plan = runner.plan()?;

        if self.plan {
            let mut output = Output::new(json).field_serialized("plan", &plan)?;
            for (i, name) in plan.iter().enumerate() {
                output = output.line(format!("{}. {}", i + 1, name));
            }
            output.print();
            return Ok(true);
        }

        let artifact = Artifact::load(artifact_path(&config.suite.artifacts_dir, TOKEN_ARTIFACT))?;
        let setup = async {
            let client = super::connect(config).await?;
            Ok::<_, CliError>(SuiteContext::setup(client, &artifact, config.settings()).await?)
        };
        let ctx = tokio::time::timeout(config.timeout(), setup)
            .await
            .map_err(|_| CliError::Timeout(config.timeout()))??;

        let report = runner.run(&ctx).await?;
        print_report(&report, json)?;
        Ok(report.is_success())
    }
}

fn print_report(report: &SuiteReport, json: bool) -> Result<(), CliError> {
    let mut output = Output::new(json)
        .field("client_version", &report.client_version)
        .field_serialized("scenarios", &report.scenarios)?
        .field_serialized("success", &report.is_success())?
        .line(format!("Node: {}", report.client_version));

    for scenario in &report.scenarios {
        let mark = if scenario.outcome.is_passed() { "ok" } else { "FAIL" };
        output = output.line(format!(
            "  [{}] {} ({}ms): {}",
            mark, scenario.name, scenario.elapsed_ms, scenario.outcome
        ));
    }
    output.line(report.summary()).print();
    Ok(())
}
