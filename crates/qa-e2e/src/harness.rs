//! Scenario runner
//!
//! Scenarios declare the chain state they rely on ([`Milestone`]s they
//! require) and the state they leave behind (milestones they establish).
//! The runner turns those declarations into an execution order, then runs
//! each scenario under its own timeout.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::time::Instant;

use crate::context::SuiteContext;
use crate::{E2EError, E2EResult};

/// Chain state a scenario can depend on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    /// The node answered and identified itself as the expected client
    NodeVerified,
    /// The token handle points at the recorded deployment
    ContractResolved,
    /// Supply sits entirely with the funding account
    InitialBalancesVerified,
    /// Every non-funding account holds part of the supply
    TokensDistributed,
}

/// One named unit of the suite
#[async_trait]
pub trait Scenario: Send + Sync {
    /// Name shown in reports
    fn name(&self) -> &str;

    /// Milestones that must be established by earlier scenarios
    fn requires(&self) -> &[Milestone] {
        &[]
    }

    /// Milestones this scenario establishes
    fn establishes(&self) -> &[Milestone] {
        &[]
    }

    /// Execute against the node
    async fn run(&self, ctx: &SuiteContext) -> E2EResult<()>;
}

/// Fail with `message` unless `condition` holds
pub fn ensure(condition: bool, message: impl Into<String>) -> E2EResult<()> {
    if condition {
        Ok(())
    } else {
        Err(E2EError::Assertion(message.into()))
    }
}

/// Fail unless `actual == expected`, naming both in the message
pub fn ensure_eq<T>(what: &str, actual: T, expected: T) -> E2EResult<()>
where
    T: PartialEq + fmt::Display,
{
    ensure(
        actual == expected,
        format!("{} is {} but it should be {}", what, actual, expected),
    )
}

/// How one scenario ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// All assertions held
    Passed,
    /// An assertion or call failed
    Failed {
        /// Error text
        message: String,
    },
    /// The scenario exceeded its time bound
    TimedOut {
        /// The bound, in milliseconds
        after_ms: u64,
    },
}

impl Outcome {
    /// Whether the scenario passed
    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Passed => write!(f, "passed"),
            Outcome::Failed { message } => write!(f, "failed: {}", message),
            Outcome::TimedOut { after_ms } => write!(f, "timed out after {}ms", after_ms),
        }
    }
}

/// Result of one scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// Scenario name
    pub name: String,
    /// How it ended
    #[serde(flatten)]
    pub outcome: Outcome,
    /// Wall-clock time spent
    pub elapsed_ms: u64,
}

/// Result of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    /// Node client version seen during setup
    pub client_version: String,
    /// Per-scenario results in execution order
    pub scenarios: Vec<ScenarioReport>,
}

impl SuiteReport {
    /// Number of passed scenarios
    pub fn passed(&self) -> usize {
        self.scenarios.iter().filter(|s| s.outcome.is_passed()).count()
    }

    /// Number of scenarios that failed an assertion or call
    pub fn failed(&self) -> usize {
        self.scenarios
            .iter()
            .filter(|s| matches!(s.outcome, Outcome::Failed { .. }))
            .count()
    }

    /// Number of scenarios that ran out of time
    pub fn timed_out(&self) -> usize {
        self.scenarios
            .iter()
            .filter(|s| matches!(s.outcome, Outcome::TimedOut { .. }))
            .count()
    }

    /// True only if every scenario passed
    pub fn is_success(&self) -> bool {
        self.scenarios.iter().all(|s| s.outcome.is_passed())
    }

    /// One-line tally
    pub fn summary(&self) -> String {
        format!(
            "{} passed, {} failed, {} timed out",
            self.passed(),
            self.failed(),
            self.timed_out()
        )
    }
}

/// Runs scenarios in milestone order
pub struct SuiteRunner {
    scenarios: Vec<Box<dyn Scenario>>,
    timeout: Duration,
}

impl SuiteRunner {
    /// Empty runner with a per-scenario time bound
    pub fn new(timeout: Duration) -> Self {
        Self {
            scenarios: Vec::new(),
            timeout,
        }
    }

    /// Runner loaded with the built-in token scenarios
    pub fn builtin(timeout: Duration) -> Self {
        Self {
            scenarios: crate::scenarios::builtin(),
            timeout,
        }
    }

    /// Append a scenario; declaration order breaks ordering ties
    pub fn with_scenario(mut self, scenario: impl Scenario + 'static) -> Self {
        self.scenarios.push(Box::new(scenario));
        self
    }

    /// Per-scenario time bound
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Scenario names in execution order.
    ///
    /// Fails when a required milestone is established by no scenario or
    /// when the declarations form a cycle.
    pub fn plan(&self) -> E2EResult<Vec<&str>> {
        Ok(self
            .order()?
            .into_iter()
            .map(|i| self.scenarios[i].name())
            .collect())
    }

    // Stable topological sort: among the scenarios whose prerequisites are
    // done, always take the one declared first.
    fn order(&self) -> E2EResult<Vec<usize>> {
        let mut establishers: HashMap<Milestone, Vec<usize>> = HashMap::new();
        for (i, scenario) in self.scenarios.iter().enumerate() {
            for milestone in scenario.establishes() {
                establishers.entry(*milestone).or_default().push(i);
            }
        }

        let mut deps: Vec<Vec<usize>> = Vec::with_capacity(self.scenarios.len());
        for scenario in &self.scenarios {
            let mut needs = Vec::new();
            for milestone in scenario.requires() {
                let sources = establishers.get(milestone).ok_or_else(|| {
                    E2EError::Plan(format!(
                        "'{}' requires {:?}, which no scenario establishes",
                        scenario.name(),
                        milestone
                    ))
                })?;
                needs.extend(sources.iter().copied());
            }
            deps.push(needs);
        }

        let mut done = vec![false; self.scenarios.len()];
        let mut order = Vec::with_capacity(self.scenarios.len());
        while order.len() < self.scenarios.len() {
            let next = (0..self.scenarios.len())
                .find(|&i| !done[i] && deps[i].iter().all(|&d| done[d]));
            match next {
                Some(i) => {
                    done[i] = true;
                    order.push(i);
                }
                None => {
                    let stuck: Vec<&str> = (0..self.scenarios.len())
                        .filter(|&i| !done[i])
                        .map(|i| self.scenarios[i].name())
                        .collect();
                    return Err(E2EError::Plan(format!(
                        "milestone cycle between: {}",
                        stuck.join(", ")
                    )));
                }
            }
        }
        Ok(order)
    }

    /// Run every scenario once, in plan order.
    ///
    /// A scenario that fails or times out is recorded and the run moves on.
    /// Only a plan error stops the run.
    pub async fn run(&self, ctx: &SuiteContext) -> E2EResult<SuiteReport> {
        let order = self.order()?;
        let mut reports = Vec::with_capacity(order.len());

        for i in order {
            let scenario = &self.scenarios[i];
            let name = scenario.name();
            tracing::info!(scenario = name, "running");

            let started = Instant::now();
            let outcome = match tokio::time::timeout(self.timeout, scenario.run(ctx)).await {
                Ok(Ok(())) => Outcome::Passed,
                Ok(Err(e)) => Outcome::Failed {
                    message: e.to_string(),
                },
                Err(_) => Outcome::TimedOut {
                    after_ms: self.timeout.as_millis() as u64,
                },
            };
            let elapsed = started.elapsed();

            match &outcome {
                Outcome::Passed => tracing::info!(scenario = name, ?elapsed, "passed"),
                other => tracing::warn!(scenario = name, ?elapsed, "{}", other),
            }

            reports.push(ScenarioReport {
                name: name.to_string(),
                outcome,
                elapsed_ms: elapsed.as_millis() as u64,
            });
        }

        let report = SuiteReport {
            client_version: ctx.client_version().to_string(),
            scenarios: reports,
        };
        tracing::info!("suite complete: {}", report.summary());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FakeNode;
    use qa_sdk::NodeClient;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Probe {
        name: &'static str,
        requires: Vec<Milestone>,
        establishes: Vec<Milestone>,
        behaviour: Behaviour,
        runs: Arc<AtomicUsize>,
    }

    enum Behaviour {
        Pass,
        Fail,
        Hang,
    }

    impl Probe {
        fn new(name: &'static str) -> Self {
            Self {
                name,
                requires: vec![],
                establishes: vec![],
                behaviour: Behaviour::Pass,
                runs: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn needs(mut self, m: Milestone) -> Self {
            self.requires.push(m);
            self
        }

        fn gives(mut self, m: Milestone) -> Self {
            self.establishes.push(m);
            self
        }

        fn behaving(mut self, behaviour: Behaviour) -> Self {
            self.behaviour = behaviour;
            self
        }
    }

    #[async_trait]
    impl Scenario for Probe {
        fn name(&self) -> &str {
            self.name
        }

        fn requires(&self) -> &[Milestone] {
            &self.requires
        }

        fn establishes(&self) -> &[Milestone] {
            &self.establishes
        }

        async fn run(&self, _ctx: &SuiteContext) -> E2EResult<()> {
            self.runs.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Behaviour::Pass => Ok(()),
                Behaviour::Fail => ensure_eq("balance", 1, 2),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(())
                }
            }
        }
    }

    async fn context() -> SuiteContext {
        let node = FakeNode::with_token();
        let artifact = node.token_artifact().unwrap();
        SuiteContext::setup(
            NodeClient::with_transport(node),
            &artifact,
            crate::SuiteSettings::default(),
        )
        .await
        .unwrap()
    }

    #[test]
    fn test_plan_keeps_declaration_order_without_constraints() {
        let runner = SuiteRunner::new(Duration::from_secs(1))
            .with_scenario(Probe::new("a"))
            .with_scenario(Probe::new("b"))
            .with_scenario(Probe::new("c"));
        assert_eq!(runner.plan().unwrap(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_plan_moves_dependent_after_establisher() {
        let runner = SuiteRunner::new(Duration::from_secs(1))
            .with_scenario(Probe::new("transfer").needs(Milestone::InitialBalancesVerified))
            .with_scenario(Probe::new("native"))
            .with_scenario(Probe::new("initial").gives(Milestone::InitialBalancesVerified));
        assert_eq!(runner.plan().unwrap(), vec!["native", "initial", "transfer"]);
    }

    #[test]
    fn test_plan_missing_establisher() {
        let runner = SuiteRunner::new(Duration::from_secs(1))
            .with_scenario(Probe::new("transfer").needs(Milestone::TokensDistributed));
        let err = runner.plan().unwrap_err();
        assert!(matches!(err, E2EError::Plan(msg) if msg.contains("transfer")));
    }

    #[test]
    fn test_plan_cycle() {
        let runner = SuiteRunner::new(Duration::from_secs(1))
            .with_scenario(
                Probe::new("a")
                    .needs(Milestone::NodeVerified)
                    .gives(Milestone::ContractResolved),
            )
            .with_scenario(
                Probe::new("b")
                    .needs(Milestone::ContractResolved)
                    .gives(Milestone::NodeVerified),
            );
        assert!(matches!(runner.plan(), Err(E2EError::Plan(msg)) if msg.contains("cycle")));
    }

    #[test]
    fn test_builtin_plan() {
        let runner = SuiteRunner::builtin(Duration::from_secs(10));
        assert_eq!(
            runner.plan().unwrap(),
            vec![
                "Network should be RSK",
                "Check Contract address",
                "Check Initial Token Balance",
                "Transfer Token",
                "Transfer tRBTC",
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_later_scenarios() {
        let last = Probe::new("last");
        let runs = last.runs.clone();
        let runner = SuiteRunner::new(Duration::from_secs(1))
            .with_scenario(Probe::new("first").behaving(Behaviour::Fail))
            .with_scenario(last);

        let report = runner.run(&context().await).await.unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());
        assert_eq!(
            report.scenarios[0].outcome,
            Outcome::Failed {
                message: "assertion failed: balance is 1 but it should be 2".to_string()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_distinct_from_failure() {
        let runner = SuiteRunner::new(Duration::from_millis(500))
            .with_scenario(Probe::new("slow").behaving(Behaviour::Hang))
            .with_scenario(Probe::new("fast"));

        let report = runner.run(&context().await).await.unwrap();
        assert_eq!(report.scenarios[0].outcome, Outcome::TimedOut { after_ms: 500 });
        assert!(report.scenarios[1].outcome.is_passed());
        assert_eq!(report.summary(), "1 passed, 0 failed, 1 timed out");
    }

    #[test]
    fn test_report_json_shape() {
        let report = SuiteReport {
            client_version: "RskJ/6.1.0".to_string(),
            scenarios: vec![ScenarioReport {
                name: "x".to_string(),
                outcome: Outcome::TimedOut { after_ms: 10 },
                elapsed_ms: 10,
            }],
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["scenarios"][0]["status"], "timed_out");
        assert_eq!(json["scenarios"][0]["after_ms"], 10);
    }
}
