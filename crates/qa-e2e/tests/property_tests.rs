//! Token accounting properties checked against the in-memory node

use proptest::prelude::*;
use qa_e2e::scenarios::{check_conservation, distribute_tokens};
use qa_e2e::{FakeNode, SuiteContext, SuiteSettings};
use qa_sdk::{NodeClient, U256};

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

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

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn distribution_moves_exact_amounts(accounts in 6usize..=10, amount in 0u64..=1_000_000) {
        runtime().block_on(async {
            let node = FakeNode::with_token().with_account_count(accounts);
            let ctx = context(&node).await;
            let token = ctx.token();

            let before = token.balance_of(ctx.client(), &ctx.funder()).await.unwrap();
            distribute_tokens(&ctx, U256::from(amount)).await.unwrap();

            let after = token.balance_of(ctx.client(), &ctx.funder()).await.unwrap();
            prop_assert_eq!(before - after, U256::from(amount) * U256::from(accounts - 1));
            for account in &ctx.accounts()[1..] {
                prop_assert_eq!(
                    token.balance_of(ctx.client(), account).await.unwrap(),
                    U256::from(amount)
                );
            }
            prop_assert!(check_conservation(&ctx).await.is_ok());
            Ok(())
        })?;
    }

    #[test]
    fn chained_transfers_conserve_supply(b in 1u64..=10_000, c_frac in 0u64..=100) {
        let c = b * c_frac / 100;
        runtime().block_on(async {
            let node = FakeNode::with_token();
            let ctx = context(&node).await;
            let token = ctx.token();
            let client = ctx.client();
            let (x, r, t) = (ctx.funder(), ctx.accounts()[1], ctx.accounts()[2]);
            let start = token.balance_of(client, &x).await.unwrap();

            token.transfer(client, x, r, U256::from(b)).await.unwrap();
            prop_assert_eq!(token.balance_of(client, &x).await.unwrap(), start - U256::from(b));
            prop_assert_eq!(token.balance_of(client, &r).await.unwrap(), U256::from(b));

            token.transfer(client, r, t, U256::from(c)).await.unwrap();
            prop_assert_eq!(token.balance_of(client, &r).await.unwrap(), U256::from(b - c));
            prop_assert_eq!(token.balance_of(client, &t).await.unwrap(), U256::from(c));
            prop_assert!(check_conservation(&ctx).await.is_ok());
            Ok(())
        })?;
    }

    #[test]
    fn repeated_reads_are_stable(index in 0usize..10) {
        runtime().block_on(async {
            let node = FakeNode::with_token();
            let ctx = context(&node).await;
            let account = ctx.accounts()[index];
            let first = ctx.token().balance_of(ctx.client(), &account).await.unwrap();
            let second = ctx.token().balance_of(ctx.client(), &account).await.unwrap();
            prop_assert_eq!(first, second);
            Ok(())
        })?;
    }
}
