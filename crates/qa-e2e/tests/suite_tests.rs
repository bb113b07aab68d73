//! Whole-suite runs against the in-memory node

use std::time::Duration;

use qa_e2e::fake_node::{erc677_artifact_json, migrations_artifact_json};
use qa_e2e::{
    deploy, DeploymentManifest, E2EError, FakeNode, Outcome, SuiteContext, SuiteRunner,
    SuiteSettings,
};
use qa_sdk::{Artifact, NodeClient, U256};

async fn context(node: &FakeNode) -> SuiteContext {
    let artifact = node.token_artifact().unwrap();
    SuiteContext::setup(
        NodeClient::with_transport(node.clone()),
        &artifact,
        SuiteSettings::default(),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_builtin_suite_passes_on_fresh_token() {
    let node = FakeNode::with_token();
    let ctx = context(&node).await;

    let report = SuiteRunner::builtin(Duration::from_secs(10))
        .run(&ctx)
        .await
        .unwrap();

    assert!(report.is_success(), "{:?}", report);
    assert_eq!(report.passed(), 5);
    assert!(report.client_version.starts_with("RskJ"));
}

#[tokio::test]
async fn test_builtin_suite_passes_with_fees() {
    let node = FakeNode::with_token().with_gas_price(U256::from(60_000_000u64));
    let ctx = context(&node).await;

    let report = SuiteRunner::builtin(Duration::from_secs(10))
        .run(&ctx)
        .await
        .unwrap();
    assert!(report.is_success(), "{:?}", report);
}

#[tokio::test]
async fn test_second_run_fails_balance_checks() {
    let node = FakeNode::with_token();
    let ctx = context(&node).await;
    let runner = SuiteRunner::builtin(Duration::from_secs(10));

    assert!(runner.run(&ctx).await.unwrap().is_success());

    // the ledger was left distributed by the first run
    let report = runner.run(&ctx).await.unwrap();
    let by_name = |name: &str| {
        report
            .scenarios
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.outcome.clone())
            .unwrap()
    };
    assert!(by_name("Network should be RSK").is_passed());
    assert!(matches!(by_name("Check Initial Token Balance"), Outcome::Failed { .. }));
    assert!(matches!(by_name("Transfer Token"), Outcome::Failed { .. }));
    // genesis balance already spent from
    assert!(matches!(by_name("Transfer tRBTC"), Outcome::Failed { .. }));
}

#[tokio::test]
async fn test_wrong_client_fails_only_first_scenario() {
    let node = FakeNode::with_token().with_client_version("Geth/v1.13.0-stable");
    let ctx = context(&node).await;

    let report = SuiteRunner::builtin(Duration::from_secs(10))
        .run(&ctx)
        .await
        .unwrap();
    assert_eq!(report.failed(), 1);
    assert_eq!(report.passed(), 4);
    assert!(!report.is_success());
}

#[tokio::test(start_paused = true)]
async fn test_stalled_mining_times_out_transfer() {
    let node = FakeNode::with_token();
    let ctx = context(&node).await;
    node.stall("evm_mine");

    let report = SuiteRunner::builtin(Duration::from_secs(10))
        .run(&ctx)
        .await
        .unwrap();

    let transfer = report
        .scenarios
        .iter()
        .find(|s| s.name == "Transfer Token")
        .unwrap();
    assert_eq!(transfer.outcome, Outcome::TimedOut { after_ms: 10_000 });
    // the scenario after it still ran
    assert!(report.scenarios[4].outcome.is_passed());
    assert_eq!(report.timed_out(), 1);
}

#[tokio::test]
async fn test_deploy_then_run() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("ERC677.json"), erc677_artifact_json().to_string()).unwrap();
    std::fs::write(
        dir.path().join("Migrations.json"),
        migrations_artifact_json().to_string(),
    )
    .unwrap();

    let node = FakeNode::new();
    let client = NodeClient::with_transport(node.clone());
    let from = client.accounts().await.unwrap()[0];
    deploy(&client, &DeploymentManifest::qa_token(), dir.path(), from, 33)
        .await
        .unwrap();

    let artifact = Artifact::load(dir.path().join("ERC677.json")).unwrap();
    let ctx = SuiteContext::setup(client, &artifact, SuiteSettings::default())
        .await
        .unwrap();
    let report = SuiteRunner::builtin(Duration::from_secs(10))
        .run(&ctx)
        .await
        .unwrap();

    assert!(report.is_success(), "{:?}", report);
}

#[tokio::test]
async fn test_setup_error_is_fatal() {
    let node = FakeNode::with_token();
    let artifact = node.token_artifact().unwrap();
    node.fail("eth_accounts", -32603, "internal error");

    let result = SuiteContext::setup(
        NodeClient::with_transport(node),
        &artifact,
        SuiteSettings::default(),
    )
    .await;
    assert!(matches!(result, Err(E2EError::Setup(_))));
}
