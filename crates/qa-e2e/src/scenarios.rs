//! Built-in token scenarios
//!
//! Together they walk a freshly deployed QA token from its initial state
//! through a round of transfers, and check a native-coin transfer on the
//! side.

use async_trait::async_trait;
use qa_primitives::{Address, H256, U256};
use qa_sdk::types::{BlockId, TransactionRequest};
use qa_sdk::LocalAccount;

use crate::context::SuiteContext;
use crate::harness::{ensure, ensure_eq, Milestone, Scenario};
use crate::{E2EError, E2EResult};

/// Supply minted by the deployment manifest
pub const TOTAL_SUPPLY: u64 = 100_000_000;

/// Amount the funder sends to every other account
pub const DISTRIBUTION_AMOUNT: u64 = 1_000;

/// Amount account 1 sends to each of accounts 2 and 3
pub const PEER_TRANSFER_AMOUNT: u64 = 500;

/// Wei sent in the native-coin scenario
pub const NATIVE_TRANSFER_WEI: u64 = 1_000;

/// Genesis balance of regtest account 5, in wei
pub const EXPECTED_GENESIS_BALANCE: u128 = 999_999_999_999_999_999_999_999_999_000;

/// The built-in scenarios in declaration order
pub fn builtin() -> Vec<Box<dyn Scenario>> {
    vec![
        Box::new(NetworkIsRsk),
        Box::new(ContractAddress),
        Box::new(InitialTokenBalance),
        Box::new(TransferToken),
        Box::new(TransferNativeCoin::default()),
    ]
}

/// Send `amount` tokens from the funding account to every other account,
/// one transfer at a time.
///
/// Each transfer must yield a transaction hash; a rejected or reverted
/// transfer is an assertion failure.
pub async fn distribute_tokens(ctx: &SuiteContext, amount: U256) -> E2EResult<Vec<H256>> {
    let funder = ctx.funder();
    let mut hashes = Vec::with_capacity(ctx.accounts().len().saturating_sub(1));
    for account in ctx.accounts().iter().filter(|a| **a != funder) {
        hashes.push(transfer(ctx, funder, *account, amount).await?);
    }
    tracing::debug!(recipients = hashes.len(), %amount, "distributed tokens");
    Ok(hashes)
}

/// Sum of the token balances of every node account equals the total supply
pub async fn check_conservation(ctx: &SuiteContext) -> E2EResult<()> {
    let token = ctx.token();
    let supply = token.total_supply(ctx.client()).await?;
    let mut sum = U256::zero();
    for account in ctx.accounts() {
        sum = sum
            .checked_add(token.balance_of(ctx.client(), account).await?)
            .ok_or_else(|| E2EError::Assertion("balance sum overflows uint256".to_string()))?;
    }
    ensure_eq("Sum of account balances", sum, supply)
}

async fn transfer(ctx: &SuiteContext, from: Address, to: Address, amount: U256) -> E2EResult<H256> {
    ctx.token()
        .transfer(ctx.client(), from, to, amount)
        .await
        .map_err(|e| E2EError::Assertion(format!("Transfer Failed! {} -> {}: {}", from, to, e)))
}

async fn token_balance(ctx: &SuiteContext, account: &Address) -> E2EResult<U256> {
    Ok(ctx.token().balance_of(ctx.client(), account).await?)
}

/// The node identifies itself as RskJ
pub struct NetworkIsRsk;

#[async_trait]
impl Scenario for NetworkIsRsk {
    fn name(&self) -> &str {
        "Network should be RSK"
    }

    fn establishes(&self) -> &[Milestone] {
        &[Milestone::NodeVerified]
    }

    async fn run(&self, ctx: &SuiteContext) -> E2EResult<()> {
        let version = ctx.client().client_version().await?;
        let expected = &ctx.settings().expected_client;
        ensure(
            version.contains(expected.as_str()),
            format!("Network should be {} but is: {}", expected, version),
        )
    }
}

/// The token handle is bound to the address recorded in the artifact
pub struct ContractAddress;

#[async_trait]
impl Scenario for ContractAddress {
    fn name(&self) -> &str {
        "Check Contract address"
    }

    fn requires(&self) -> &[Milestone] {
        &[Milestone::NodeVerified]
    }

    fn establishes(&self) -> &[Milestone] {
        &[Milestone::ContractResolved]
    }

    async fn run(&self, ctx: &SuiteContext) -> E2EResult<()> {
        ensure_eq(
            "ERC677 address",
            *ctx.token().address(),
            ctx.artifact_address(),
        )?;
        let code = ctx
            .client()
            .get_code(ctx.token().address(), BlockId::Latest)
            .await?;
        ensure(
            !code.is_empty(),
            format!("No contract code at {}", ctx.artifact_address()),
        )
    }
}

/// Whole supply with the funder, nothing anywhere else
pub struct InitialTokenBalance;

#[async_trait]
impl Scenario for InitialTokenBalance {
    fn name(&self) -> &str {
        "Check Initial Token Balance"
    }

    fn requires(&self) -> &[Milestone] {
        &[Milestone::ContractResolved]
    }

    fn establishes(&self) -> &[Milestone] {
        &[Milestone::InitialBalancesVerified]
    }

    async fn run(&self, ctx: &SuiteContext) -> E2EResult<()> {
        let supply = ctx.token().total_supply(ctx.client()).await?;
        ensure_eq("Total supply", supply, U256::from(TOTAL_SUPPLY))?;

        let funder = ctx.funder();
        let owner_balance = token_balance(ctx, &funder).await?;
        ensure_eq(&format!("Owner {} balance", funder), owner_balance, supply)?;

        for account in ctx.accounts().iter().filter(|a| **a != funder) {
            let balance = token_balance(ctx, account).await?;
            ensure_eq(&format!("Account {} balance", account), balance, U256::zero())?;
        }
        Ok(())
    }
}

/// Distribute, mine, then move tokens between two peers
pub struct TransferToken;

#[async_trait]
impl Scenario for TransferToken {
    fn name(&self) -> &str {
        "Transfer Token"
    }

    fn requires(&self) -> &[Milestone] {
        &[Milestone::InitialBalancesVerified]
    }

    fn establishes(&self) -> &[Milestone] {
        &[Milestone::TokensDistributed]
    }

    async fn run(&self, ctx: &SuiteContext) -> E2EResult<()> {
        let amount = U256::from(DISTRIBUTION_AMOUNT);
        let recipients = U256::from(ctx.accounts().len().saturating_sub(1));
        let funder_expected = amount
            .checked_mul(recipients)
            .and_then(|total| U256::from(TOTAL_SUPPLY).checked_sub(total))
            .ok_or_else(|| {
                E2EError::Assertion(format!(
                    "Cannot distribute {} to {} accounts out of a supply of {}",
                    amount, recipients, TOTAL_SUPPLY
                ))
            })?;

        distribute_tokens(ctx, amount).await?;
        ctx.client().advance_time_and_mine().await?;

        let funder = ctx.funder();
        for account in ctx.accounts() {
            let balance = token_balance(ctx, account).await?;
            let expected = if *account == funder { funder_expected } else { amount };
            ensure_eq(&format!("Account {} balance", account), balance, expected)?;
        }
        check_conservation(ctx).await?;

        let sender = ctx.account(1)?;
        let peers = [ctx.account(2)?, ctx.account(3)?];
        let half = U256::from(PEER_TRANSFER_AMOUNT);
        for peer in peers {
            transfer(ctx, sender, peer, half).await?;
        }

        let after = " after second set of transfers";
        ensure_eq(
            &format!("Account {} balance{}", funder, after),
            token_balance(ctx, &funder).await?,
            funder_expected,
        )?;
        ensure_eq(
            &format!("Account {} balance{}", sender, after),
            token_balance(ctx, &sender).await?,
            amount - half * 2u64,
        )?;
        for peer in peers {
            ensure_eq(
                &format!("Account {} balance{}", peer, after),
                token_balance(ctx, &peer).await?,
                amount + half,
            )?;
        }
        check_conservation(ctx).await
    }
}

/// Move native coin from account 5 to a brand new account
pub struct TransferNativeCoin {
    expected_genesis: U256,
    value: U256,
}

impl TransferNativeCoin {
    /// Expect `expected_genesis` wei in account 5 before sending `value`
    pub fn new(expected_genesis: U256, value: U256) -> Self {
        Self {
            expected_genesis,
            value,
        }
    }
}

impl Default for TransferNativeCoin {
    fn default() -> Self {
        Self::new(
            U256::from(EXPECTED_GENESIS_BALANCE),
            U256::from(NATIVE_TRANSFER_WEI),
        )
    }
}

#[async_trait]
impl Scenario for TransferNativeCoin {
    fn name(&self) -> &str {
        "Transfer tRBTC"
    }

    fn requires(&self) -> &[Milestone] {
        &[Milestone::NodeVerified]
    }

    async fn run(&self, ctx: &SuiteContext) -> E2EResult<()> {
        let client = ctx.client();
        let fresh = LocalAccount::random();
        let sender = ctx.account(5)?;

        let sender_before = client.get_balance(&sender, BlockId::Latest).await?;
        let fresh_before = fresh.balance(client).await?;
        ensure_eq(
            &format!("New account {} tRBTC balance", fresh.address()),
            fresh_before,
            U256::zero(),
        )?;
        ensure_eq(
            &format!("Account {} tRBTC balance", sender),
            sender_before,
            self.expected_genesis,
        )?;

        let tx = TransactionRequest::transfer(sender, fresh.address(), self.value);
        let receipt = client
            .send_and_confirm(&tx)
            .await
            .map_err(|e| E2EError::Assertion(format!("tRBTC transfer failed! {}", e)))?;
        let fee = client.transaction_fee(&receipt).await?;
        tracing::debug!(hash = %receipt.transaction_hash, %fee, "native transfer mined");

        let expected_sender = self
            .value
            .checked_add(fee)
            .and_then(|spent| sender_before.checked_sub(spent))
            .ok_or_else(|| {
                E2EError::Assertion(format!(
                    "Value {} plus fee {} exceeds the sender balance {}",
                    self.value, fee, sender_before
                ))
            })?;
        ensure_eq(
            &format!("Account {} tRBTC balance after transfer", sender),
            client.get_balance(&sender, BlockId::Latest).await?,
            expected_sender,
        )?;
        ensure_eq(
            &format!("New account {} tRBTC balance after transfer", fresh.address()),
            fresh.balance(client).await?,
            self.value,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FakeNode, SuiteSettings};
    use qa_primitives::to_quantity;
    use qa_sdk::{MockTransport, NodeClient};
    use serde_json::json;

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
    async fn test_network_is_rsk() {
        let node = FakeNode::with_token();
        assert!(NetworkIsRsk.run(&context(&node).await).await.is_ok());
    }

    #[tokio::test]
    async fn test_network_is_not_rsk() {
        let node = FakeNode::with_token().with_client_version("Geth/v1.13.0-stable/linux-amd64");
        let err = NetworkIsRsk.run(&context(&node).await).await.unwrap_err();
        assert!(err.to_string().contains("Geth/v1.13.0"));
    }

    #[tokio::test]
    async fn test_initial_balance_detects_leak() {
        let node = FakeNode::with_token();
        let ctx = context(&node).await;
        assert!(InitialTokenBalance.run(&ctx).await.is_ok());

        node.set_token_balance(node.accounts()[4], U256::from(7));
        let err = InitialTokenBalance.run(&ctx).await.unwrap_err();
        assert!(err.to_string().contains("balance is 7 but it should be 0"));
    }

    #[tokio::test]
    async fn test_distribute_tokens() {
        let node = FakeNode::with_token();
        let ctx = context(&node).await;

        let hashes = distribute_tokens(&ctx, U256::from(1_000)).await.unwrap();
        assert_eq!(hashes.len(), 9);
        assert_eq!(
            token_balance(&ctx, &ctx.funder()).await.unwrap(),
            U256::from(99_991_000u64)
        );
        check_conservation(&ctx).await.unwrap();
    }

    #[tokio::test]
    async fn test_distribute_rejection_is_assertion() {
        let node = FakeNode::with_token();
        let ctx = context(&node).await;
        node.fail("eth_sendTransaction", -32010, "insufficient funds");

        let err = distribute_tokens(&ctx, U256::one()).await.unwrap_err();
        assert!(matches!(err, E2EError::Assertion(msg) if msg.starts_with("Transfer Failed!")));
    }

    #[tokio::test]
    async fn test_transfer_token_end_to_end() {
        let node = FakeNode::with_token();
        let ctx = context(&node).await;
        let accounts = node.accounts();

        TransferToken.run(&ctx).await.unwrap();

        assert_eq!(token_balance(&ctx, &accounts[0]).await.unwrap(), U256::from(99_991_000u64));
        assert!(token_balance(&ctx, &accounts[1]).await.unwrap().is_zero());
        assert_eq!(token_balance(&ctx, &accounts[2]).await.unwrap(), U256::from(1_500));
        assert_eq!(token_balance(&ctx, &accounts[3]).await.unwrap(), U256::from(1_500));
        assert_eq!(node.time_offset(), 1);
    }

    #[tokio::test]
    async fn test_conservation_catches_minting() {
        let node = FakeNode::with_token();
        let ctx = context(&node).await;
        node.set_token_balance(node.accounts()[9], U256::from(1));

        let err = check_conservation(&ctx).await.unwrap_err();
        assert!(err.to_string().contains("100000001"));
    }

    #[tokio::test]
    async fn test_native_transfer_zero_fee() {
        let node = FakeNode::with_token();
        let ctx = context(&node).await;
        TransferNativeCoin::default().run(&ctx).await.unwrap();
    }

    #[tokio::test]
    async fn test_native_transfer_accounts_for_fee() {
        let node = FakeNode::with_token().with_gas_price(U256::from(60_000_000u64));
        let ctx = context(&node).await;
        TransferNativeCoin::default().run(&ctx).await.unwrap();
    }

    #[tokio::test]
    async fn test_native_transfer_fee_overflow_is_assertion() {
        let artifact = FakeNode::with_token().token_artifact().unwrap();
        let transport = MockTransport::new();
        transport.set_response(
            "eth_accounts",
            json!(crate::RSK_REGTEST_ACCOUNTS[..6].to_vec()),
        );
        // sender balance, then the fresh account's
        transport.push_response("eth_getBalance", json!(to_quantity(&U256::MAX)));
        transport.push_response("eth_getBalance", json!("0x0"));
        transport.set_response(
            "eth_getTransactionReceipt",
            json!({
                "transactionHash": format!("0x{}", "ab".repeat(32)),
                "blockNumber": "0x100",
                "status": "0x1",
                "gasUsed": "0x5208",
                "effectiveGasPrice": "0x1",
                "contractAddress": null,
                "logs": []
            }),
        );
        let ctx = SuiteContext::setup(
            NodeClient::with_transport(transport),
            &artifact,
            SuiteSettings::default(),
        )
        .await
        .unwrap();

        let err = TransferNativeCoin::new(U256::MAX, U256::MAX)
            .run(&ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, E2EError::Assertion(msg) if msg.contains("exceeds the sender balance")));
    }

    #[tokio::test]
    async fn test_native_transfer_wrong_genesis() {
        let node = FakeNode::with_token();
        node.set_native_balance(node.accounts()[5], U256::from(5));
        let ctx = context(&node).await;

        let err = TransferNativeCoin::default().run(&ctx).await.unwrap_err();
        assert!(err.to_string().contains("tRBTC balance is 5"));
    }
}
