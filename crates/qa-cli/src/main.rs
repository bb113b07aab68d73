//! # qa-cli
//!
//! Command-line runner for the ERC677 QA suite.
//!
//! ## Usage
//!
//! ```bash
//! # Deploy Migrations and the QA token, recording addresses in the artifacts
//! erc677-qa deploy
//!
//! # Run the suite against the recorded deployment
//! erc677-qa run
//! erc677-qa --json run
//! erc677-qa run --plan
//!
//! # Show the effective configuration
//! erc677-qa --host-url http://localhost:4444 config --show
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod error;
mod output;

pub use config::Config;
pub use error::CliError;
pub use output::Output;

/// ERC677 QA suite
#[derive(Parser, Debug)]
#[command(name = "erc677-qa")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Config file [default: ~/.erc677-qa/config.toml]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Node JSON-RPC endpoint, overriding the config file
    #[arg(long, global = true, env = "RSK_HOST_URL")]
    host_url: Option<String>,

    /// Log level used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// CLI commands
#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the built-in scenarios
    Run(commands::run::RunCommand),
    /// Deploy the QA token
    Deploy(commands::deploy::DeployCommand),
    /// Show configuration
    Config {
        /// Show the effective configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    let json = cli.json;

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "error": format!("{:#}", e),
                        "success": false
                    })
                );
            } else {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = Config::load(cli.config.as_deref())
        .context("loading configuration")?
        .with_host_override(cli.host_url);

    match cli.command {
        Commands::Run(cmd) => {
            let passed = cmd
                .execute(&config, cli.json)
                .await
                .with_context(|| format!("suite against {}", config.rsk.host_url))?;
            Ok(if passed { ExitCode::SUCCESS } else { ExitCode::FAILURE })
        }
        Commands::Deploy(cmd) => {
            cmd.execute(&config, cli.json)
                .await
                .with_context(|| format!("deployment to {}", config.rsk.host_url))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config { show } => {
            handle_config(&config, show, cli.json)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn handle_config(config: &Config, show: bool, json: bool) -> Result<(), CliError> {
    if show {
        Output::new(json)
            .field("host_url", &config.rsk.host_url)
            .field_serialized("suite", &config.suite)?
            .line(config.to_toml()?.trim_end())
            .print();
    } else {
        Output::new(json)
            .line("Use --show to display the effective configuration")
            .print();
    }
    Ok(())
}
