//! # qa-e2e
//!
//! End-to-end suite for an ERC677 token deployed on an RSK node.
//!
//! ## Design Philosophy
//!
//! 1. **Explicit order**: scenarios declare the chain state they need and
//!    the state they leave behind; the runner derives the order
//! 2. **Isolated failures**: a failed or timed-out scenario never stops the
//!    ones after it
//! 3. **No cached state**: every balance is asked of the node when needed
//!
//! ## Usage
//!
//! ```ignore
//! let runner = SuiteRunner::builtin(settings.timeout);
//! runner.plan()?;
//! let ctx = SuiteContext::setup(client, &artifact, settings).await?;
//! let report = runner.run(&ctx).await?;
//! ```
//!
//! [`FakeNode`] stands in for a real node in tests.

mod context;
pub mod deploy;
pub mod fake_node;
mod harness;
pub mod scenarios;

pub use context::{SuiteContext, SuiteSettings, MIN_ACCOUNTS};
pub use deploy::{deploy, Deployment, DeploymentManifest, DeployStep};
pub use fake_node::{FakeNode, RSK_REGTEST_ACCOUNTS};
pub use harness::{
    ensure, ensure_eq, Milestone, Outcome, Scenario, ScenarioReport, SuiteReport, SuiteRunner,
};

/// Test result
pub type E2EResult<T> = Result<T, E2EError>;

/// E2E suite errors
#[derive(Debug, thiserror::Error)]
pub enum E2EError {
    /// Setup failed; aborts the whole suite
    #[error("setup failed: {0}")]
    Setup(String),

    /// Scenario ordering could not be derived
    #[error("invalid scenario plan: {0}")]
    Plan(String),

    /// Observed value differs from the expected one
    #[error("assertion failed: {0}")]
    Assertion(String),

    /// Deployment transaction did not produce the expected result
    #[error("transaction failed: {0}")]
    Transaction(String),

    /// Node or ABI error
    #[error(transparent)]
    Sdk(#[from] qa_sdk::SdkError),
}
